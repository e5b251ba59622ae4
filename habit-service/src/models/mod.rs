pub mod habit;

pub use habit::{parse_completion_date, today_string, Habit, COMPLETION_DATE_FORMAT};
