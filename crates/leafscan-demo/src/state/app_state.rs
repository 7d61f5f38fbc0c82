use crate::config::AppConfig;
use crate::transient::{TransientMode, TransientStore};
use leafscan_classifiers::{ModelLoader, SharedClassifier};
use leafscan_core::LoadError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tracing::warn;

/// Whether the model is available for analysis
#[derive(Clone)]
pub enum ModelStatus {
    /// Loaded and shared by every request
    Ready(SharedClassifier),

    /// Startup load failed; analysis is never offered
    Unavailable(Arc<LoadError>),
}

impl ModelStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Demo configuration
    pub config: Arc<AppConfig>,

    /// Model loaded at startup
    pub model: ModelStatus,

    /// Transient file policy for analyses
    pub transient: Arc<TransientStore>,

    /// Prometheus handle, when the recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: AppConfig, model: ModelStatus, metrics: Option<PrometheusHandle>) -> Self {
        let transient = TransientStore::from_config(&config.transient);
        Self {
            config: Arc::new(config),
            model,
            transient: Arc::new(transient),
            metrics,
        }
    }

    /// Load the model once and build the state around the result.
    ///
    /// A load failure is kept in the state rather than returned, so the page
    /// can still be served with the error shown.
    pub fn initialize(
        config: AppConfig,
        loader: &ModelLoader,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        let model = match loader.load() {
            Ok(classifier) => ModelStatus::Ready(classifier),
            Err(e) => {
                metrics::counter!("leafscan_errors_total", "kind" => e.kind()).increment(1);
                ModelStatus::Unavailable(Arc::new(e))
            }
        };

        if config.transient.mode == TransientMode::Shared {
            warn!(
                "Shared transient mode enabled: concurrent analyses overwrite the same file \
                 and may read each other's images"
            );
        }

        Self::new(config, model, metrics)
    }
}
