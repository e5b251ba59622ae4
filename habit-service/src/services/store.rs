use crate::models::Habit;
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Persistence for habits.
///
/// Ids are the hex form of the habit's ObjectId; an id that doesn't parse
/// simply matches nothing.
#[async_trait]
pub trait HabitStore: Send + Sync {
    async fn insert(&self, habit: &Habit) -> Result<(), AppError>;
    /// Append `date` to the habit's completions in one atomic step and return
    /// the updated habit, or `None` when no habit has this id.
    async fn append_completion(&self, id: &str, date: &str) -> Result<Option<Habit>, AppError>;
    /// Every habit, in insertion order.
    async fn list(&self) -> Result<Vec<Habit>, AppError>;
    async fn health_check(&self) -> Result<(), AppError>;
}

/// Process-local store. Nothing survives a restart.
#[derive(Clone, Default)]
pub struct MemoryHabitStore {
    habits: Arc<RwLock<Vec<Habit>>>,
}

impl MemoryHabitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HabitStore for MemoryHabitStore {
    async fn insert(&self, habit: &Habit) -> Result<(), AppError> {
        let mut habits = self.habits.write().await;
        if habits.iter().any(|h| h.id == habit.id) {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "duplicate key: _id {}",
                habit.id
            )));
        }
        habits.push(habit.clone());
        Ok(())
    }

    async fn append_completion(&self, id: &str, date: &str) -> Result<Option<Habit>, AppError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        let mut habits = self.habits.write().await;
        Ok(habits.iter_mut().find(|h| h.id == oid).map(|habit| {
            habit.completion_dates.push(date.to_string());
            habit.clone()
        }))
    }

    async fn list(&self) -> Result<Vec<Habit>, AppError> {
        Ok(self.habits.read().await.clone())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
