// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "tradelog=info,tradelog_persistence=info,tradelog_writer=info,tradelog_cli=info";

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize telemetry (logs + metrics). Safe to call more than once.
pub fn init_telemetry() {
    init_tracing();
    init_metrics();
}

/// Install the fmt subscriber on stderr, filtered by `RUST_LOG`.
/// Does nothing if a global subscriber is already set.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Install an in-process Prometheus recorder and describe the log metrics.
pub fn init_metrics() {
    if PROM_HANDLE.get().is_some() {
        return;
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if PROM_HANDLE.set(handle).is_err() {
                tracing::warn!("Prometheus handle already set");
            }
        }
        Err(e) => {
            tracing::warn!(%e, "Metrics recorder not installed");
            return;
        }
    }

    metrics::describe_counter!("tradelog_events_written_total", "Events accepted by a writer session");
    metrics::describe_counter!("tradelog_records_appended_total", "Frames made durable");
    metrics::describe_counter!("tradelog_flush_failures_total", "Flushes rolled back after an I/O error");
    metrics::describe_counter!("tradelog_segments_opened_total", "Segment files opened for append");
    metrics::describe_histogram!("tradelog_flush_duration_seconds", "Time spent writing and syncing one flush");
}

/// Prometheus text exposition of everything recorded so far.
pub fn render_metrics() -> String {
    match PROM_HANDLE.get() {
        Some(handle) => handle.render(),
        None => "# metrics not initialized".to_string(),
    }
}
