//! Persist, infer, and interpret one leaf image

use crate::acquire::{CaptureSource, LeafImage};
use crate::transient::TransientStore;
use chrono::{DateTime, Utc};
use leafscan_classifiers::{ImageClassifier, SharedClassifier};
use leafscan_core::{Analysis, InferenceError, Prediction};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

/// Number of ranked classes kept alongside the top-1 analysis
const RANKED_CLASSES: usize = 3;

/// Outcome of one analysis run
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Per-run identifier
    pub id: Uuid,

    pub analysis: Analysis,

    /// Most probable classes, highest first
    pub ranked: Vec<Prediction>,

    /// Measured wall time of persist + infer, in milliseconds
    pub latency_ms: f64,

    /// Name of the model that produced the result
    pub model: String,

    pub source: CaptureSource,

    pub analyzed_at: DateTime<Utc>,
}

/// Run the persist → infer → interpret step on the calling thread.
///
/// The transient file lives until this function returns.
pub fn run_analysis(
    classifier: &dyn ImageClassifier,
    leaf: &LeafImage,
    store: &TransientStore,
) -> Result<AnalysisReport, InferenceError> {
    let id = Uuid::new_v4();
    let span = info_span!("analysis", %id, source = %leaf.source());
    let _enter = span.enter();

    let start = Instant::now();
    let result = infer(classifier, leaf, store);
    let elapsed = start.elapsed();

    metrics::histogram!("leafscan_inference_latency_us").record(elapsed.as_micros() as f64);

    let (analysis, ranked) = match result {
        Ok(result) => result,
        Err(e) => {
            metrics::counter!("leafscan_errors_total", "kind" => e.kind()).increment(1);
            warn!("Analysis failed: {}", e);
            return Err(e);
        }
    };

    metrics::counter!("leafscan_analyses_total", "outcome" => analysis.outcome.as_str())
        .increment(1);
    info!(
        "{} ({}) via {} in {}ms",
        analysis.display_label,
        analysis.confidence,
        classifier.name(),
        elapsed.as_millis()
    );

    Ok(AnalysisReport {
        id,
        analysis,
        ranked,
        latency_ms: elapsed.as_secs_f64() * 1000.0,
        model: classifier.name().to_string(),
        source: leaf.source(),
        analyzed_at: Utc::now(),
    })
}

fn infer(
    classifier: &dyn ImageClassifier,
    leaf: &LeafImage,
    store: &TransientStore,
) -> Result<(Analysis, Vec<Prediction>), InferenceError> {
    let file = store.persist(leaf)?;
    debug!("Persisted image to {}", file.path().display());

    let distribution = classifier.classify_file(file.path())?;
    let top = distribution.top1()?;
    let ranked = distribution.top_k(RANKED_CLASSES)?;

    Ok((Analysis::from(top), ranked))
}

/// Run the analysis on the blocking pool
pub async fn analyze(
    classifier: SharedClassifier,
    leaf: LeafImage,
    store: Arc<TransientStore>,
) -> Result<AnalysisReport, InferenceError> {
    tokio::task::spawn_blocking(move || run_analysis(classifier.as_ref(), &leaf, &store))
        .await
        .map_err(|e| InferenceError::runtime(format!("analysis task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transient::TransientMode;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use leafscan_core::{ClassProbabilities, Outcome};
    use std::path::Path;

    struct StubClassifier {
        labels: Vec<String>,
        probabilities: Vec<f32>,
    }

    impl StubClassifier {
        fn potato(probabilities: Vec<f32>) -> Self {
            Self {
                labels: vec![
                    "Potato_Early_blight".to_string(),
                    "Potato_healthy".to_string(),
                    "Potato_Late_blight".to_string(),
                ],
                probabilities,
            }
        }
    }

    impl ImageClassifier for StubClassifier {
        fn classify_file(&self, path: &Path) -> Result<ClassProbabilities, InferenceError> {
            assert!(path.exists(), "transient file must exist during inference");
            Ok(ClassProbabilities::new(
                self.probabilities.clone(),
                self.labels.clone().into(),
            ))
        }

        fn name(&self) -> &str {
            "stub"
        }

        fn labels(&self) -> &[String] {
            &self.labels
        }
    }

    fn leaf() -> LeafImage {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(20, 20, Rgb([50, 150, 70])));
        LeafImage::new(image, ImageFormat::Jpeg, CaptureSource::Upload)
    }

    #[test]
    fn test_healthy_potato() {
        let dir = tempfile::tempdir().unwrap();
        let store = TransientStore::new(TransientMode::Unique, dir.path());
        let classifier = StubClassifier::potato(vec![0.03, 0.95, 0.02]);

        let report = run_analysis(&classifier, &leaf(), &store).unwrap();

        assert_eq!(report.analysis.outcome, Outcome::Healthy);
        assert_eq!(report.analysis.display_label, "POTATO HEALTHY");
        assert_eq!(report.analysis.confidence, "95.0%");
        assert_eq!(report.model, "stub");
        assert_eq!(report.ranked.len(), 3);
        assert_eq!(report.ranked[1].label, "Potato_Early_blight");

        // Unique transient files are gone once the step ends
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_disease_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let store = TransientStore::new(TransientMode::Unique, dir.path());
        let classifier = StubClassifier::potato(vec![0.1, 0.2, 0.7]);

        let report = run_analysis(&classifier, &leaf(), &store).unwrap();
        assert_eq!(report.analysis.outcome, Outcome::Diseased);
        assert_eq!(report.analysis.display_label, "POTATO LATE BLIGHT");
    }

    #[test]
    fn test_shared_mode_leaves_fixed_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = TransientStore::new(TransientMode::Shared, dir.path());
        let classifier = StubClassifier::potato(vec![0.03, 0.95, 0.02]);

        run_analysis(&classifier, &leaf(), &store).unwrap();
        assert!(dir.path().join(crate::transient::SHARED_FILE_NAME).exists());
    }

    #[test]
    fn test_malformed_distributions_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = TransientStore::new(TransientMode::Unique, dir.path());

        for probabilities in [vec![], vec![0.5, 0.5], vec![0.1, f32::NAN, 0.2]] {
            let classifier = StubClassifier::potato(probabilities);
            let err = run_analysis(&classifier, &leaf(), &store).unwrap_err();
            assert!(matches!(err, InferenceError::MalformedResult(_)), "got {:?}", err);
        }
    }

    #[tokio::test]
    async fn test_analyze_runs_on_blocking_pool() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(TransientStore::new(TransientMode::Unique, dir.path()));
        let classifier: SharedClassifier = Arc::new(StubClassifier::potato(vec![0.03, 0.95, 0.02]));

        let report = analyze(classifier, leaf(), store).await.unwrap();
        assert_eq!(report.analysis.display_label, "POTATO HEALTHY");
        assert!(report.latency_ms >= 0.0);
    }
}
