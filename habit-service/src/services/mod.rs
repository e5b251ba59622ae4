pub mod database;
pub mod metrics;
pub mod reminders;
pub mod report;
pub mod store;

pub use self::database::HabitDb;
pub use self::metrics::{get_metrics, init_metrics};
pub use reminders::{
    LogReminderSender, Reminder, ReminderBatch, ReminderError, ReminderJob, ReminderSender,
    WebhookReminderSender,
};
pub use report::weekly_report;
pub use store::{HabitStore, MemoryHabitStore};
