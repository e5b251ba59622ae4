//! Prometheus export for the `metrics` facade.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Later calls are no-ops, so tests can call
/// this freely. If another global recorder is already installed, the handle
/// still renders but records nothing.
pub fn init_metrics() {
    METRICS_HANDLE.get_or_init(|| {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        if metrics::set_global_recorder(recorder).is_err() {
            tracing::warn!("A metrics recorder is already installed; Prometheus export is empty");
        }

        metrics::describe_counter!("habits_created_total", "Habits created");
        metrics::describe_counter!("habit_completions_total", "Completion dates appended");
        metrics::describe_counter!("reminder_runs_total", "Scheduled reminder runs by outcome");
        metrics::describe_counter!("reminders_dispatched_total", "Reminders handed to a sender");

        handle
    });
}

/// Current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}
