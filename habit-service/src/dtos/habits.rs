use crate::models::Habit;
use serde::{Deserialize, Serialize};
use serde_json::Number;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHabitRequest {
    pub name: Option<String>,
    pub daily_goal: Option<Number>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompleteHabitRequest {
    pub date: Option<String>,
}

impl CompleteHabitRequest {
    /// The explicit date, unless it is missing or empty.
    pub fn explicit_date(&self) -> Option<&str> {
        self.date.as_deref().filter(|d| !d.is_empty())
    }
}

/// Wire shape of a habit: `{id, name, dailyGoal, completionDates}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HabitResponse {
    pub id: String,
    pub name: Option<String>,
    pub daily_goal: Option<Number>,
    pub completion_dates: Vec<String>,
}

impl From<Habit> for HabitResponse {
    fn from(habit: Habit) -> Self {
        Self {
            id: habit.id.to_hex(),
            name: habit.name,
            daily_goal: habit.daily_goal,
            completion_dates: habit.completion_dates,
        }
    }
}

/// `{message, habit}` body returned by the create and complete operations.
#[derive(Debug, Serialize, Deserialize)]
pub struct HabitEnvelope {
    pub message: String,
    pub habit: HabitResponse,
}

impl HabitEnvelope {
    pub fn new(message: &str, habit: Habit) -> Self {
        Self {
            message: message.to_string(),
            habit: habit.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    pub name: Option<String>,
    pub daily_goal: Option<Number>,
    pub completed_days: usize,
}
