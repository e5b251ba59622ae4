//! Application wiring: store, reminder sender, scheduler and HTTP router.

use crate::config::{HabitConfig, StoreBackend};
use crate::handlers;
use crate::scheduler::ReminderScheduler;
use crate::services::{
    HabitDb, HabitStore, LogReminderSender, MemoryHabitStore, ReminderJob, ReminderSender,
    WebhookReminderSender,
};
use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: HabitConfig,
    pub store: Arc<dyn HabitStore>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route(
            "/habits",
            get(handlers::list_habits).post(handlers::create_habit),
        )
        .route("/habits/report", get(handlers::habit_report))
        .route("/habits/:id", put(handlers::complete_habit))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

async fn connect_store(config: &HabitConfig) -> Result<Arc<dyn HabitStore>, AppError> {
    match config.store {
        StoreBackend::Mongo => {
            let db = HabitDb::connect(&config.mongodb.uri, &config.mongodb.database)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to connect to MongoDB: {}", e);
                    e
                })?;
            Ok(Arc::new(db))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory habit store; data is lost on restart");
            Ok(Arc::new(MemoryHabitStore::new()))
        }
    }
}

fn reminder_sender(config: &HabitConfig) -> Result<Arc<dyn ReminderSender>, AppError> {
    match &config.reminders.webhook_url {
        Some(url) => {
            let sender = WebhookReminderSender::new(url, config.reminders.webhook_timeout())
                .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;
            Ok(Arc::new(sender))
        }
        None => {
            tracing::info!("No reminder webhook configured, logging reminders");
            Ok(Arc::new(LogReminderSender))
        }
    }
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
    state: AppState,
    scheduler: Arc<ReminderScheduler>,
}

impl Application {
    pub async fn build(config: HabitConfig) -> Result<Self, AppError> {
        let store = connect_store(&config).await?;
        let sender = reminder_sender(&config)?;

        let scheduler = Arc::new(ReminderScheduler::new(
            ReminderJob::new(store.clone(), sender),
            config.reminders.time,
        ));

        let state = AppState {
            config: config.clone(),
            store,
        };
        let router = build_router(state.clone());

        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Habit service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
            state,
            scheduler,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn store(&self) -> Arc<dyn HabitStore> {
        self.state.store.clone()
    }

    pub fn scheduler(&self) -> Arc<ReminderScheduler> {
        self.scheduler.clone()
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Serve requests and, if enabled, run the reminder scheduler until
    /// `shutdown` resolves.
    pub async fn run_until<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.state.config.reminders.enabled {
            self.scheduler.start();
        } else {
            tracing::info!("Reminder scheduler disabled by configuration");
        }

        let result = axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await;

        self.scheduler.stop().await;

        if let Err(e) = &result {
            tracing::error!("HTTP server error: {}", e);
        }
        result
    }
}
