use chrono::NaiveTime;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct HabitConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub store: StoreBackend,
    pub reminders: ReminderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Mongo,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReminderConfig {
    pub enabled: bool,
    /// Server-local wall-clock time of the daily run.
    pub time: NaiveTime,
    /// When set, reminders are POSTed here instead of being logged.
    pub webhook_url: Option<String>,
    pub webhook_timeout_secs: u64,
}

impl ReminderConfig {
    pub fn webhook_timeout(&self) -> Duration {
        Duration::from_secs(self.webhook_timeout_secs)
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            time: default_reminder_time(),
            webhook_url: None,
            webhook_timeout_secs: 10,
        }
    }
}

fn default_reminder_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}

impl HabitConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(HabitConfig {
            common: common_config,
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", Some("mongodb://127.0.0.1:27017"), is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("habitTracker"), is_prod)?,
            },
            store: get_env("STORE_BACKEND", Some("mongo"), false)?
                .parse()
                .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
            reminders: ReminderConfig {
                enabled: env::var("REMINDERS_ENABLED")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()
                    .unwrap_or(true),
                time: parse_reminder_time(&get_env("REMINDER_TIME", Some("09:00"), false)?)?,
                webhook_url: env::var("REMINDER_WEBHOOK_URL")
                    .ok()
                    .filter(|url| !url.is_empty()),
                webhook_timeout_secs: env::var("REMINDER_WEBHOOK_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
            },
        })
    }

    /// In-memory store, random port, scheduler off. Used by tests.
    pub fn for_tests() -> Self {
        HabitConfig {
            common: core_config::Config::ephemeral(),
            mongodb: MongoConfig {
                uri: "mongodb://127.0.0.1:27017".to_string(),
                database: "habitTracker".to_string(),
            },
            store: StoreBackend::Memory,
            reminders: ReminderConfig {
                enabled: false,
                ..ReminderConfig::default()
            },
        }
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(format!("Invalid store backend: {}", s)),
        }
    }
}

fn parse_reminder_time(value: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "REMINDER_TIME must be HH:MM, got '{}': {}",
                value,
                e
            ))
        })
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
