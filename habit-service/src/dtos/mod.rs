pub mod habits;

pub use habits::{
    CompleteHabitRequest, CreateHabitRequest, HabitEnvelope, HabitResponse, ReportEntry,
};
