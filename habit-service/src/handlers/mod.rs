pub mod habits;
pub mod health;

pub use habits::{complete_habit, create_habit, habit_report, list_habits};
pub use health::{health_check, metrics_endpoint, readiness_check};
