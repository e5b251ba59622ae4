//! Daily reminders for habits that haven't been completed yet today.
//!
//! Delivery is delegated: a [`ReminderSender`] receives the batch and decides
//! what "sending" means. The default just logs; the webhook sender hands the
//! batch to an external notification endpoint.

use crate::models::{Habit, COMPLETION_DATE_FORMAT};
use crate::services::store::HabitStore;
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use serde_json::Number;
use service_core::observability::TracedClientExt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ReminderError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Send error: {0}")]
    SendFailed(String),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub habit_id: String,
    pub name: Option<String>,
    pub daily_goal: Option<Number>,
}

/// Batch handed to a sender for one scheduled run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderBatch {
    pub run_id: String,
    pub date: String,
    pub reminders: Vec<Reminder>,
}

#[async_trait]
pub trait ReminderSender: Send + Sync {
    async fn send(&self, batch: &ReminderBatch) -> Result<(), ReminderError>;
    fn name(&self) -> &'static str;
}

/// Writes one log line per reminder.
#[derive(Debug, Clone, Default)]
pub struct LogReminderSender;

#[async_trait]
impl ReminderSender for LogReminderSender {
    async fn send(&self, batch: &ReminderBatch) -> Result<(), ReminderError> {
        for reminder in &batch.reminders {
            tracing::info!(
                run_id = %batch.run_id,
                habit_id = %reminder.habit_id,
                name = reminder.name.as_deref().unwrap_or(""),
                daily_goal = ?reminder.daily_goal,
                "Reminder: habit not completed today"
            );
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// POSTs the batch as JSON to an external notification endpoint.
pub struct WebhookReminderSender {
    client: reqwest::Client,
    url: String,
}

impl WebhookReminderSender {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, ReminderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReminderError::Configuration(format!("Failed to build client: {}", e)))?;

        tracing::info!(url = %url, "Webhook reminder sender configured");

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl ReminderSender for WebhookReminderSender {
    async fn send(&self, batch: &ReminderBatch) -> Result<(), ReminderError> {
        let response = self
            .client
            .traced_post(&self.url)
            .json(batch)
            .send_with_request_id(&batch.run_id)
            .await
            .map_err(|e| ReminderError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReminderError::SendFailed(format!(
                "webhook responded {}: {}",
                status, body
            )));
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}

/// Habits with no completion dated `today`, as reminders.
pub fn due_reminders(habits: &[Habit], today: NaiveDate) -> Vec<Reminder> {
    habits
        .iter()
        .filter(|habit| habit.completions_on(today) == 0)
        .map(|habit| Reminder {
            habit_id: habit.id.to_hex(),
            name: habit.name.clone(),
            daily_goal: habit.daily_goal.clone(),
        })
        .collect()
}

/// Reads the current habits and hands the due reminders to the sender.
#[derive(Clone)]
pub struct ReminderJob {
    store: Arc<dyn HabitStore>,
    sender: Arc<dyn ReminderSender>,
}

impl ReminderJob {
    pub fn new(store: Arc<dyn HabitStore>, sender: Arc<dyn ReminderSender>) -> Self {
        Self { store, sender }
    }

    pub async fn run(&self) -> Result<usize, ReminderError> {
        self.run_for(Local::now().date_naive()).await
    }

    /// Run as if it were `today`. Returns how many reminders were dispatched.
    pub async fn run_for(&self, today: NaiveDate) -> Result<usize, ReminderError> {
        let result = self.dispatch(today).await;

        match &result {
            Ok(count) => {
                metrics::counter!("reminder_runs_total", "status" => "success").increment(1);
                metrics::counter!("reminders_dispatched_total", "sender" => self.sender.name())
                    .increment(*count as u64);
            }
            Err(e) => {
                metrics::counter!("reminder_runs_total", "status" => "failure").increment(1);
                tracing::error!(sender = self.sender.name(), error = %e, "Reminder run failed");
            }
        }

        result
    }

    async fn dispatch(&self, today: NaiveDate) -> Result<usize, ReminderError> {
        let habits = self
            .store
            .list()
            .await
            .map_err(|e| ReminderError::Store(e.to_string()))?;

        let batch = ReminderBatch {
            run_id: Uuid::new_v4().to_string(),
            date: today.format(COMPLETION_DATE_FORMAT).to_string(),
            reminders: due_reminders(&habits, today),
        };

        if batch.reminders.is_empty() {
            tracing::info!(run_id = %batch.run_id, "No reminders due");
            return Ok(0);
        }

        self.sender.send(&batch).await?;

        tracing::info!(
            run_id = %batch.run_id,
            sender = self.sender.name(),
            count = batch.reminders.len(),
            "Reminders dispatched"
        );

        Ok(batch.reminders.len())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::services::store::MemoryHabitStore;
    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use tokio::sync::Mutex;

    /// Sender that keeps every batch it receives.
    #[derive(Default)]
    pub(crate) struct RecordingSender {
        pub batches: Mutex<Vec<ReminderBatch>>,
    }

    #[async_trait]
    impl ReminderSender for RecordingSender {
        async fn send(&self, batch: &ReminderBatch) -> Result<(), ReminderError> {
            self.batches.lock().await.push(batch.clone());
            Ok(())
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    struct FailingSender;

    #[async_trait]
    impl ReminderSender for FailingSender {
        async fn send(&self, _batch: &ReminderBatch) -> Result<(), ReminderError> {
            Err(ReminderError::SendFailed("provider down".to_string()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn only_habits_without_a_completion_today_are_due() {
        let mut done = Habit::new(Some("Done".to_string()), Some(1.into()));
        done.completion_dates.push("2026-10-18".to_string());
        let mut pending = Habit::new(Some("Pending".to_string()), Some(3.into()));
        pending.completion_dates.push("2026-10-17".to_string());

        let due = due_reminders(&[done, pending.clone()], day(2026, 10, 18));

        assert_eq!(
            due,
            vec![Reminder {
                habit_id: pending.id.to_hex(),
                name: Some("Pending".to_string()),
                daily_goal: Some(3.into()),
            }]
        );
    }

    #[tokio::test]
    async fn job_sends_due_reminders() {
        let store = Arc::new(MemoryHabitStore::new());
        store
            .insert(&Habit::new(Some("Walk".to_string()), Some(1.into())))
            .await
            .unwrap();
        let sender = Arc::new(RecordingSender::default());
        let job = ReminderJob::new(store, sender.clone());

        let sent = job.run_for(day(2026, 10, 18)).await.unwrap();

        assert_eq!(sent, 1);
        let batches = sender.batches.lock().await;
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].date, "2026-10-18");
        assert_eq!(batches[0].reminders[0].name.as_deref(), Some("Walk"));
    }

    #[tokio::test]
    async fn job_skips_sender_when_nothing_is_due() {
        let store = Arc::new(MemoryHabitStore::new());
        let sender = Arc::new(RecordingSender::default());
        let job = ReminderJob::new(store, sender.clone());

        assert_eq!(job.run_for(day(2026, 10, 18)).await.unwrap(), 0);
        assert!(sender.batches.lock().await.is_empty());
    }

    #[tokio::test]
    async fn sender_failure_surfaces_as_error() {
        let store = Arc::new(MemoryHabitStore::new());
        store.insert(&Habit::new(None, None)).await.unwrap();
        let job = ReminderJob::new(store, Arc::new(FailingSender));

        let err = job.run_for(day(2026, 10, 18)).await.unwrap_err();
        assert!(matches!(err, ReminderError::SendFailed(_)));
    }

    type Received = Arc<Mutex<Vec<(Option<String>, serde_json::Value)>>>;

    async fn spawn_webhook(status: StatusCode) -> (String, Received) {
        let received: Received = Arc::default();
        let app = Router::new()
            .route(
                "/reminders",
                post(
                    move |State(received): State<Received>,
                          headers: axum::http::HeaderMap,
                          Json(body): Json<serde_json::Value>| async move {
                        let request_id = headers
                            .get("x-request-id")
                            .and_then(|v| v.to_str().ok())
                            .map(|s| s.to_string());
                        received.lock().await.push((request_id, body));
                        status
                    },
                ),
            )
            .with_state(received.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (format!("http://127.0.0.1:{}/reminders", port), received)
    }

    #[tokio::test]
    async fn webhook_sender_posts_batch_with_run_id() {
        let (url, received) = spawn_webhook(StatusCode::ACCEPTED).await;
        let sender = WebhookReminderSender::new(&url, Duration::from_secs(5)).unwrap();
        let batch = ReminderBatch {
            run_id: "run-42".to_string(),
            date: "2026-10-18".to_string(),
            reminders: vec![Reminder {
                habit_id: "abc".to_string(),
                name: Some("Floss".to_string()),
                daily_goal: Some(1.into()),
            }],
        };

        sender.send(&batch).await.unwrap();

        let received = received.lock().await;
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].0.as_deref(), Some("run-42"));
        assert_eq!(received[0].1["date"], "2026-10-18");
        assert_eq!(received[0].1["reminders"][0]["habitId"], "abc");
        assert_eq!(received[0].1["reminders"][0]["dailyGoal"], 1);
    }

    #[tokio::test]
    async fn webhook_sender_rejects_error_status() {
        let (url, _received) = spawn_webhook(StatusCode::BAD_GATEWAY).await;
        let sender = WebhookReminderSender::new(&url, Duration::from_secs(5)).unwrap();
        let batch = ReminderBatch {
            run_id: "run-43".to_string(),
            date: "2026-10-18".to_string(),
            reminders: Vec::new(),
        };

        let err = sender.send(&batch).await.unwrap_err();
        assert!(matches!(err, ReminderError::SendFailed(_)));
    }
}
