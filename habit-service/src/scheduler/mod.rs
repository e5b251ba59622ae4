//! Fires the reminder job once a day at a fixed local wall-clock time.
//!
//! Runs missed while the process was down are not caught up, and a failed run
//! is not retried; the next attempt is the next day's slot.

use crate::services::{ReminderError, ReminderJob};
use chrono::{DateTime, Duration as ChronoDuration, Local, LocalResult, NaiveTime, TimeZone};
use std::sync::{Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct ReminderScheduler {
    job: ReminderJob,
    at: NaiveTime,
    running: Mutex<Option<RunningTask>>,
}

struct RunningTask {
    shutdown_token: CancellationToken,
    handle: JoinHandle<()>,
}

impl ReminderScheduler {
    pub fn new(job: ReminderJob, at: NaiveTime) -> Self {
        Self {
            job,
            at,
            running: Mutex::new(None),
        }
    }

    fn running(&self) -> MutexGuard<'_, Option<RunningTask>> {
        match self.running.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Spawn the timer task. Calling it again while running does nothing; a
    /// stopped scheduler can be started again.
    pub fn start(&self) {
        let mut running = self.running();
        if running.as_ref().is_some_and(|task| !task.handle.is_finished()) {
            return;
        }

        let job = self.job.clone();
        let at = self.at;
        let shutdown_token = CancellationToken::new();
        let shutdown = shutdown_token.clone();

        tracing::info!(at = %at, "Starting reminder scheduler");

        let handle = tokio::spawn(async move {
            loop {
                let now = Local::now();
                let next = next_run_after(&now, at);
                let wait = (next.clone() - now).to_std().unwrap_or_default();

                tracing::info!(next_run = %next, "Next reminder run scheduled");

                tokio::select! {
                    _ = shutdown.cancelled() => {
                        tracing::info!("Reminder scheduler shutting down");
                        break;
                    }
                    _ = tokio::time::sleep(wait) => {
                        // Outcome is logged and counted by the job.
                        let _ = job.run().await;
                    }
                }
            }
        });

        *running = Some(RunningTask {
            shutdown_token,
            handle,
        });
    }

    /// Cancel the timer task and wait for it to finish.
    pub async fn stop(&self) {
        let task = self.running().take();
        if let Some(task) = task {
            task.shutdown_token.cancel();
            let _ = task.handle.await;
        }
    }

    /// Run the job once right now, outside the schedule.
    pub async fn trigger_now(&self) -> Result<usize, ReminderError> {
        self.job.run().await
    }

    pub fn is_running(&self) -> bool {
        self.running()
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
    }
}

/// First instant strictly after `now` whose local time is `at`.
///
/// When `at` falls in a DST gap that day, the run moves to the first valid
/// instant after the gap; when it is ambiguous, the earlier instant is used.
pub fn next_run_after<Tz: TimeZone>(now: &DateTime<Tz>, at: NaiveTime) -> DateTime<Tz> {
    let tz = now.timezone();
    let mut date = now.date_naive();

    loop {
        let candidate = match tz.from_local_datetime(&date.and_time(at)) {
            LocalResult::Single(dt) => Some(dt),
            LocalResult::Ambiguous(earliest, _) => Some(earliest),
            LocalResult::None => {
                // Skip forward through the gap an hour at a time.
                (1..=3).find_map(|h| {
                    tz.from_local_datetime(&(date.and_time(at) + ChronoDuration::hours(h)))
                        .earliest()
                })
            }
        };

        if let Some(candidate) = candidate.filter(|c| c > now) {
            return candidate;
        }

        date = match date.succ_opt() {
            Some(next) => next,
            None => return now.clone() + ChronoDuration::days(1),
        };
    }
}
