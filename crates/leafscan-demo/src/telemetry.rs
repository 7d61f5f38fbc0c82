//! Logging and metrics initialization

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("leafscan_demo=debug,leafscan_classifiers=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("leafscan_demo=info,leafscan_classifiers=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Install the Prometheus recorder and return handle for rendering
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "leafscan_analyses_total",
        "Total number of completed analyses by outcome"
    );
    metrics::describe_counter!(
        "leafscan_errors_total",
        "Total number of failed acquisitions and analyses by kind"
    );
    metrics::describe_histogram!(
        "leafscan_inference_latency_us",
        metrics::Unit::Microseconds,
        "Persist and inference latency in microseconds"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
