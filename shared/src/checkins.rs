//! Check-in reminders
//!
//! A weight check-in is due once a day and a lifestyle check-in once a week,
//! counted from the last recorded update. A profile that never recorded one
//! is due immediately. Only one reminder is shown at a time and weight wins.

use crate::models::UserProfile;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Age of the last weight update after which a new one is due
pub fn weight_checkin_interval() -> Duration {
    Duration::hours(24)
}

/// Age of the last lifestyle update after which a new one is due
pub fn lifestyle_checkin_interval() -> Duration {
    Duration::days(7)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckIn {
    Weight,
    Lifestyle,
}

/// Which check-ins are due and the one to prompt for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueCheckIns {
    pub weight_due: bool,
    pub lifestyle_due: bool,
    pub next: Option<CheckIn>,
}

fn is_due(last: Option<DateTime<Utc>>, now: DateTime<Utc>, interval: Duration) -> bool {
    last.map_or(true, |last| now - last > interval)
}

pub fn due_updates(profile: &UserProfile, now: DateTime<Utc>) -> DueCheckIns {
    let weight_due = is_due(profile.last_weight_update, now, weight_checkin_interval());
    let lifestyle_due = is_due(profile.last_lifestyle_update, now, lifestyle_checkin_interval());

    let next = if weight_due {
        Some(CheckIn::Weight)
    } else if lifestyle_due {
        Some(CheckIn::Lifestyle)
    } else {
        None
    };

    DueCheckIns {
        weight_due,
        lifestyle_due,
        next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 10, 12, 0, 0).unwrap()
    }

    fn profile(weight_age: Option<Duration>, lifestyle_age: Option<Duration>) -> UserProfile {
        UserProfile {
            last_weight_update: weight_age.map(|age| now() - age),
            last_lifestyle_update: lifestyle_age.map(|age| now() - age),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_profile_prompts_for_weight_first() {
        let due = due_updates(&UserProfile::default(), now());
        assert!(due.weight_due);
        assert!(due.lifestyle_due);
        assert_eq!(due.next, Some(CheckIn::Weight));
    }

    #[rstest]
    #[case::fresh(Duration::hours(1), false)]
    #[case::exactly_a_day(Duration::hours(24), false)]
    #[case::just_over_a_day(Duration::hours(24) + Duration::seconds(1), true)]
    #[case::two_days(Duration::days(2), true)]
    fn test_weight_boundary(#[case] age: Duration, #[case] expected: bool) {
        let due = due_updates(&profile(Some(age), Some(Duration::zero())), now());
        assert_eq!(due.weight_due, expected);
        assert!(!due.lifestyle_due);
    }

    #[rstest]
    #[case::six_days(Duration::days(6), false)]
    #[case::exactly_a_week(Duration::days(7), false)]
    #[case::just_over_a_week(Duration::days(7) + Duration::seconds(1), true)]
    #[case::a_month(Duration::days(30), true)]
    fn test_lifestyle_boundary(#[case] age: Duration, #[case] expected: bool) {
        let due = due_updates(&profile(Some(Duration::zero()), Some(age)), now());
        assert_eq!(due.lifestyle_due, expected);
        assert_eq!(due.next, expected.then_some(CheckIn::Lifestyle));
    }

    #[test]
    fn test_weight_takes_precedence_over_lifestyle() {
        let due = due_updates(&profile(Some(Duration::days(2)), None), now());
        assert!(due.lifestyle_due);
        assert_eq!(due.next, Some(CheckIn::Weight));
    }

    #[test]
    fn test_nothing_due() {
        let due = due_updates(&profile(Some(Duration::hours(3)), Some(Duration::days(3))), now());
        assert_eq!(due.next, None);
    }

    #[test]
    fn test_serialized_shape() {
        let due = due_updates(&profile(None, Some(Duration::zero())), now());
        let json = serde_json::to_value(&due).unwrap();
        assert_eq!(json["next"], "weight");
        assert_eq!(json["weight_due"], true);
        assert_eq!(json["lifestyle_due"], false);
    }
}
