//! Once-per-process model loading

use crate::candle_classifier::CandleImageClassifier;
use crate::classifier::SharedClassifier;
use crate::config::ModelConfig;
use leafscan_core::LoadError;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

type LoadFn = dyn Fn(&ModelConfig) -> Result<SharedClassifier, LoadError> + Send + Sync;

/// Loads the configured model once and hands out the same instance after.
///
/// The first successful [`load`](Self::load) performs the expensive read;
/// every later call returns a clone of the same `Arc` without touching the
/// artifact again. A failed load is not remembered, so a later call retries.
pub struct ModelLoader {
    config: ModelConfig,
    factory: Box<LoadFn>,
    cell: OnceCell<SharedClassifier>,
}

impl ModelLoader {
    /// Create a loader backed by the candle classifier
    pub fn new(config: ModelConfig) -> Self {
        Self::with_factory(config, |config| {
            let classifier = CandleImageClassifier::load(config)?;
            Ok(Arc::new(classifier) as SharedClassifier)
        })
    }

    /// Create a loader with a custom load function
    pub fn with_factory<F>(config: ModelConfig, factory: F) -> Self
    where
        F: Fn(&ModelConfig) -> Result<SharedClassifier, LoadError> + Send + Sync + 'static,
    {
        Self {
            config,
            factory: Box::new(factory),
            cell: OnceCell::new(),
        }
    }

    /// Get the cached classifier, loading it on first use
    pub fn load(&self) -> Result<SharedClassifier, LoadError> {
        self.cell
            .get_or_try_init(|| {
                let start = Instant::now();
                info!("Loading model '{}'", self.config.display_name());

                match (self.factory)(&self.config) {
                    Ok(classifier) => {
                        info!(
                            "✓ Loaded model '{}' ({} classes) in {}ms",
                            classifier.name(),
                            classifier.labels().len(),
                            start.elapsed().as_millis()
                        );
                        Ok(classifier)
                    }
                    Err(e) => {
                        error!("✗ Failed to load model '{}': {}", self.config.display_name(), e);
                        Err(e)
                    }
                }
            })
            .map(Arc::clone)
    }

    /// Get the classifier if it has already been loaded
    pub fn get(&self) -> Option<SharedClassifier> {
        self.cell.get().cloned()
    }

    /// Check if the model is loaded
    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Get the model configuration
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }
}
