//! Input validation functions
//!
//! Range and choice checks for sign-up and tracker input. Every function
//! returns a user-facing message on failure.

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }
    if password.len() > 128 {
        return Err("Password too long".to_string());
    }
    Ok(())
}

fn validate_range(value: f64, min: f64, max: f64, message: &str) -> Result<(), String> {
    if value.is_nan() || value.is_infinite() || value < min || value > max {
        return Err(message.to_string());
    }
    Ok(())
}

/// Validate weight value (in kg)
pub fn validate_weight(weight_kg: f64) -> Result<(), String> {
    validate_range(weight_kg, 30.0, 300.0, "Weight must be between 30 and 300 kg")
}

/// Validate height value (in cm)
pub fn validate_height_cm(height_cm: f64) -> Result<(), String> {
    validate_range(height_cm, 100.0, 250.0, "Height must be between 100 and 250 cm")
}

/// Validate age in years
pub fn validate_age(age: u32) -> Result<(), String> {
    if !(13..=120).contains(&age) {
        return Err("Age must be between 13 and 120".to_string());
    }
    Ok(())
}

/// Validate hours of sleep per night
pub fn validate_sleep_hours(hours: f64) -> Result<(), String> {
    validate_range(hours, 0.0, 24.0, "Sleep hours must be between 0 and 24")
}

/// Validate the 1-10 stress score
pub fn validate_stress_score(score: u8) -> Result<(), String> {
    if !(1..=10).contains(&score) {
        return Err("Stress level must be between 1 and 10".to_string());
    }
    Ok(())
}

/// Validate daily screen time
pub fn validate_screen_time_hours(hours: f64) -> Result<(), String> {
    validate_range(hours, 0.0, 24.0, "Screen time must be between 0 and 24 hours")
}

/// Validate a run: both duration and calories must be positive
pub fn validate_run(duration_minutes: f64, calories_burned: u32) -> Result<(), String> {
    if duration_minutes.is_nan() || duration_minutes.is_infinite() || duration_minutes <= 0.0 {
        return Err("Duration must be greater than 0".to_string());
    }
    if duration_minutes > 1440.0 {
        return Err("Duration cannot exceed 24 hours".to_string());
    }
    if calories_burned == 0 {
        return Err("Calories burned must be greater than 0".to_string());
    }
    Ok(())
}

/// Validate a meal entry
pub fn validate_meal(meal_name: &str, calories: u32) -> Result<(), String> {
    if meal_name.trim().is_empty() {
        return Err("Meal name is required".to_string());
    }
    if calories == 0 {
        return Err("Calories must be greater than 0".to_string());
    }
    if calories > 10_000 {
        return Err("Calorie value unreasonably high".to_string());
    }
    Ok(())
}

// ============================================================================
// Choice Fields
// ============================================================================

pub const VALID_GENDERS: &[&str] = &["Male", "Female"];
pub const VALID_ACTIVITY_LEVELS: &[&str] = &["Low", "Medium", "High"];
pub const VALID_SMOKING_STATUSES: &[&str] = &["Never", "Former", "Current"];
pub const VALID_ALCOHOL_USE: &[&str] = &["No", "Yes"];
pub const VALID_HEALTH_CONDITIONS: &[&str] =
    &["None", "Obesity", "Hypertension", "Asthma", "Diabetes"];
pub const VALID_MEAL_TYPES: &[&str] = &["Breakfast", "Lunch", "Dinner", "Snack"];
pub const VALID_MEAL_GOALS: &[&str] = &["Weight Loss", "Maintenance", "Muscle Gain"];

/// Check `value` against a fixed set of labels (exact match)
pub fn validate_choice(field: &str, value: &str, allowed: &[&str]) -> Result<(), String> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(format!(
            "Invalid {}. Must be one of: {}",
            get_field_display_label(field).to_lowercase(),
            allowed.join(", ")
        ))
    }
}

// ============================================================================
// User-Friendly Field Labels
// ============================================================================

/// Map technical field names to user-friendly display labels
pub fn get_field_display_label(field_name: &str) -> &str {
    match field_name {
        "age" => "Age",
        "gender" => "Gender",
        "weight" | "current_weight" => "Current Weight",
        "height" => "Height",
        "activity_level" => "Activity Level",
        "bmi" => "BMI",
        "bmi_status" => "BMI Status",
        "health_condition" | "health_conditions" => "Health Condition",
        "calories_burned" => "Calories Burned",
        "sleep_hours" => "Sleep Hours",
        "water_intake_liters" => "Water Intake",
        "stress_level" => "Stress Level",
        "screen_time_hours" => "Screen Time",
        "smoking_status" => "Smoking Status",
        "alcohol_use" => "Alcohol Use",
        "goal" => "Meal Goal",
        "meal_type" => "Meal Type",
        _ => field_name,
    }
}

/// Convert a list of technical field names to user-friendly labels
pub fn get_missing_fields_labels(fields: &[String]) -> Vec<String> {
    fields
        .iter()
        .map(|f| get_field_display_label(f).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"a".repeat(129)).is_err());
    }

    #[rstest]
    #[case(30.0, true)]
    #[case(300.0, true)]
    #[case(29.9, false)]
    #[case(300.1, false)]
    #[case(f64::NAN, false)]
    fn test_validate_weight(#[case] weight: f64, #[case] ok: bool) {
        assert_eq!(validate_weight(weight).is_ok(), ok);
    }

    #[rstest]
    #[case(100.0, true)]
    #[case(250.0, true)]
    #[case(99.0, false)]
    #[case(251.0, false)]
    fn test_validate_height(#[case] height: f64, #[case] ok: bool) {
        assert_eq!(validate_height_cm(height).is_ok(), ok);
    }

    #[test]
    fn test_validate_age_and_stress() {
        assert!(validate_age(13).is_ok());
        assert!(validate_age(120).is_ok());
        assert!(validate_age(12).is_err());
        assert!(validate_stress_score(1).is_ok());
        assert!(validate_stress_score(10).is_ok());
        assert!(validate_stress_score(0).is_err());
        assert!(validate_stress_score(11).is_err());
    }

    #[test]
    fn test_validate_screen_time_accepts_zero() {
        assert!(validate_screen_time_hours(0.0).is_ok());
        assert!(validate_screen_time_hours(-0.5).is_err());
        assert!(validate_screen_time_hours(25.0).is_err());
    }

    #[test]
    fn test_validate_run() {
        assert!(validate_run(30.0, 300).is_ok());
        assert_eq!(
            validate_run(0.0, 300).unwrap_err(),
            "Duration must be greater than 0"
        );
        assert!(validate_run(30.0, 0).is_err());
        assert!(validate_run(f64::NAN, 100).is_err());
    }

    #[test]
    fn test_validate_meal() {
        assert!(validate_meal("Oatmeal", 350).is_ok());
        assert!(validate_meal("   ", 350).is_err());
        assert!(validate_meal("Oatmeal", 0).is_err());
    }

    #[test]
    fn test_validate_choice() {
        assert!(validate_choice("meal_type", "Snack", VALID_MEAL_TYPES).is_ok());
        assert!(validate_choice("gender", "female", VALID_GENDERS).is_err());
        assert_eq!(
            validate_choice("activity_level", "Extreme", VALID_ACTIVITY_LEVELS).unwrap_err(),
            "Invalid activity level. Must be one of: Low, Medium, High"
        );
    }

    #[test]
    fn test_missing_field_labels() {
        let labels = get_missing_fields_labels(&[
            "water_intake_liters".to_string(),
            "unknown_field".to_string(),
        ]);
        assert_eq!(labels, vec!["Water Intake", "unknown_field"]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_valid_weight_range(weight in 30.0f64..=300.0) {
            prop_assert!(validate_weight(weight).is_ok());
        }

        #[test]
        fn prop_invalid_weight_above_max(weight in 300.1f64..1000.0) {
            prop_assert!(validate_weight(weight).is_err());
        }

        #[test]
        fn prop_valid_sleep_range(hours in 0.0f64..=24.0) {
            prop_assert!(validate_sleep_hours(hours).is_ok());
        }

        #[test]
        fn prop_password_length_valid(len in 8usize..=128) {
            let password: String = (0..len).map(|_| 'a').collect();
            prop_assert!(validate_password(&password).is_ok());
        }
    }
}
