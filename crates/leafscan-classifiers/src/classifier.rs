//! Classifier trait and shared handle

use leafscan_core::{ClassProbabilities, InferenceError};
use std::path::Path;
use std::sync::Arc;

/// Trait for all image classifiers.
///
/// Implementations are read-only after construction, so one instance can serve
/// every analysis in the process.
pub trait ImageClassifier: Send + Sync {
    /// Classify the image stored at `path`.
    ///
    /// Blocking: callers on an async runtime should run this on a blocking
    /// thread.
    fn classify_file(&self, path: &Path) -> Result<ClassProbabilities, InferenceError>;

    /// Get the classifier name
    fn name(&self) -> &str;

    /// Get the label table, indexed by class
    fn labels(&self) -> &[String];
}

/// Process-wide handle to a loaded classifier
pub type SharedClassifier = Arc<dyn ImageClassifier>;
