use crate::models::Habit;
use crate::services::store::HabitStore;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    options::{FindOneAndUpdateOptions, ReturnDocument},
    Client as MongoClient, Collection, Database,
};
use service_core::error::AppError;

#[derive(Clone)]
pub struct HabitDb {
    client: MongoClient,
    db: Database,
}

impl HabitDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(uri = %uri, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB at {}: {}", uri, e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub fn habits(&self) -> Collection<Habit> {
        self.db.collection("habits")
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }
}

#[async_trait]
impl HabitStore for HabitDb {
    async fn insert(&self, habit: &Habit) -> Result<(), AppError> {
        self.habits().insert_one(habit, None).await.map_err(|e| {
            tracing::error!(habit_id = %habit.id, "Failed to insert habit: {}", e);
            AppError::from(e)
        })?;
        Ok(())
    }

    async fn append_completion(&self, id: &str, date: &str) -> Result<Option<Habit>, AppError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.habits()
            .find_one_and_update(
                doc! { "_id": oid },
                doc! { "$push": { "completionDates": date } },
                options,
            )
            .await
            .map_err(|e| {
                tracing::error!(habit_id = %id, "Failed to append completion date: {}", e);
                AppError::from(e)
            })
    }

    async fn list(&self) -> Result<Vec<Habit>, AppError> {
        let cursor = self.habits().find(None, None).await.map_err(AppError::from)?;
        cursor.try_collect().await.map_err(AppError::from)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }
}
