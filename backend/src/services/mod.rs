//! Business logic services
//!
//! Services validate input, shape profile updates and hand them to the
//! profile store. They take their collaborators as arguments.

pub mod exercise;
pub mod hydration;
pub mod nutrition;
pub mod profile;
pub mod recommendations;
pub mod screen_time;
pub mod user;
pub mod weight;

pub use exercise::ExerciseService;
pub use hydration::HydrationService;
pub use nutrition::NutritionService;
pub use profile::ProfileService;
pub use recommendations::{RecommendationContext, RecommendationService};
pub use screen_time::ScreenTimeService;
pub use user::UserService;
pub use weight::WeightService;
