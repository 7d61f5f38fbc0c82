//! Mapping analysis results onto what the page shows

use crate::config::PageConfig;
use crate::pipeline::AnalysisReport;
use leafscan_core::{AcquireError, InferenceError, LoadError, Outcome};
use serde::Serialize;
use std::fmt;

/// Page state after an interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewStatus {
    /// Nothing submitted yet
    Idle,
    /// Healthy result
    Success,
    /// Disease detected
    Warning,
    /// Analysis failed
    Error,
    /// Submitted bytes were not an acceptable image
    Rejected,
    /// Model is not loaded; analysis is never offered
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerKind {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Banner {
    pub kind: BannerKind,
    pub text: String,
}

/// A labelled value shown under the banner
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
}

/// Everything the page needs to render one interaction
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub status: ViewStatus,
    pub banner: Option<Banner>,
    pub metrics: Vec<Metric>,
    /// Play the celebration animation
    pub celebrate: bool,
    pub report: Option<AnalysisReport>,
    pub analyze_enabled: bool,
}

impl PageView {
    fn message(status: ViewStatus, kind: BannerKind, text: String, analyze_enabled: bool) -> Self {
        Self {
            status,
            banner: Some(Banner { kind, text }),
            metrics: Vec::new(),
            celebrate: false,
            report: None,
            analyze_enabled,
        }
    }
}

/// Render a finished analysis
pub fn render_analysis(report: &AnalysisReport, page: &PageConfig) -> PageView {
    let analysis = &report.analysis;
    let (status, banner) = match analysis.outcome {
        Outcome::Healthy => (
            ViewStatus::Success,
            Banner {
                kind: BannerKind::Success,
                text: format!("✅ RESULT: {}", analysis.display_label),
            },
        ),
        Outcome::Diseased => (
            ViewStatus::Warning,
            Banner {
                kind: BannerKind::Warning,
                text: format!("⚠️ WARNING! DISEASE DETECTED: {}", analysis.display_label),
            },
        ),
    };

    PageView {
        status,
        banner: Some(banner),
        metrics: vec![
            Metric {
                label: "Confidence".to_string(),
                value: analysis.confidence.clone(),
            },
            Metric {
                label: "Response time".to_string(),
                value: page.latency_label.clone(),
            },
        ],
        celebrate: analysis.outcome.is_healthy(),
        report: Some(report.clone()),
        analyze_enabled: true,
    }
}

/// Render a failure inside the analysis step
pub fn render_inference_error(error: &InferenceError) -> PageView {
    PageView::message(
        ViewStatus::Error,
        BannerKind::Error,
        format!("An error occurred during analysis: {}", error),
        true,
    )
}

/// Render a rejected upload or snapshot
pub fn render_acquire_error(error: &AcquireError) -> PageView {
    PageView::message(
        ViewStatus::Rejected,
        BannerKind::Error,
        format!("Image rejected: {}", error),
        true,
    )
}

/// Render the blocking message shown when the model failed to load
pub fn render_load_error(error: &LoadError) -> PageView {
    PageView::message(
        ViewStatus::Unavailable,
        BannerKind::Error,
        format!("Model could not be loaded: {}", error),
        false,
    )
}

/// Render the state before any image was provided
pub fn render_idle() -> PageView {
    PageView {
        status: ViewStatus::Idle,
        banner: None,
        metrics: Vec::new(),
        celebrate: false,
        report: None,
        analyze_enabled: true,
    }
}

impl fmt::Display for PageView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.banner {
            Some(banner) => writeln!(f, "{}", banner.text)?,
            None => writeln!(f, "No image provided.")?,
        }
        for metric in &self.metrics {
            writeln!(f, "  {}: {}", metric.label, metric.value)?;
        }
        if self.celebrate {
            writeln!(f, "  🎈🎈🎈")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquire::CaptureSource;
    use chrono::Utc;
    use leafscan_core::{Analysis, Prediction};
    use std::path::PathBuf;
    use uuid::Uuid;

    fn report(label: &str, confidence: f32) -> AnalysisReport {
        let prediction = Prediction {
            index: 0,
            label: label.to_string(),
            confidence,
        };
        AnalysisReport {
            id: Uuid::new_v4(),
            analysis: Analysis::from(prediction.clone()),
            ranked: vec![prediction],
            latency_ms: 12.5,
            model: "best".to_string(),
            source: CaptureSource::Upload,
            analyzed_at: Utc::now(),
        }
    }

    #[test]
    fn test_healthy_result_celebrates() {
        let view = render_analysis(&report("Potato_healthy", 0.95), &PageConfig::default());

        assert_eq!(view.status, ViewStatus::Success);
        let banner = view.banner.unwrap();
        assert_eq!(banner.kind, BannerKind::Success);
        assert_eq!(banner.text, "✅ RESULT: POTATO HEALTHY");
        assert!(view.celebrate);
        assert_eq!(
            view.metrics,
            vec![
                Metric {
                    label: "Confidence".to_string(),
                    value: "95.0%".to_string()
                },
                Metric {
                    label: "Response time".to_string(),
                    value: "~3 ms".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_disease_result_warns() {
        let view = render_analysis(&report("Tomato_Late_blight", 0.8734), &PageConfig::default());

        assert_eq!(view.status, ViewStatus::Warning);
        assert_eq!(
            view.banner.as_ref().unwrap().text,
            "⚠️ WARNING! DISEASE DETECTED: TOMATO LATE BLIGHT"
        );
        assert!(!view.celebrate);
        assert_eq!(view.metrics[0].value, "87.3%");
    }

    #[test]
    fn test_response_time_uses_configured_label() {
        let page = PageConfig {
            latency_label: "fast".to_string(),
            ..PageConfig::default()
        };
        let view = render_analysis(&report("Corn_healthy", 0.5), &page);
        assert_eq!(view.metrics[1].value, "fast");
    }

    #[test]
    fn test_inference_error_keeps_session_usable() {
        let view = render_inference_error(&InferenceError::runtime("tensor shape mismatch"));

        assert_eq!(view.status, ViewStatus::Error);
        assert_eq!(
            view.banner.unwrap().text,
            "An error occurred during analysis: classifier error: tensor shape mismatch"
        );
        assert!(view.analyze_enabled);
        assert!(view.metrics.is_empty());
    }

    #[test]
    fn test_load_error_disables_analysis() {
        let view = render_load_error(&LoadError::NotFound {
            path: PathBuf::from("best.safetensors"),
        });

        assert_eq!(view.status, ViewStatus::Unavailable);
        assert!(!view.analyze_enabled);
        assert!(view
            .banner
            .unwrap()
            .text
            .starts_with("Model could not be loaded: "));
    }

    #[test]
    fn test_idle_has_no_banner() {
        let view = render_idle();
        assert_eq!(view.status, ViewStatus::Idle);
        assert!(view.banner.is_none());
        assert_eq!(view.to_string(), "No image provided.\n");
    }

    #[test]
    fn test_json_shape() {
        let view = render_analysis(&report("Potato_healthy", 0.95), &PageConfig::default());
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["status"], "success");
        assert_eq!(json["banner"]["kind"], "success");
        assert_eq!(json["report"]["analysis"]["outcome"], "healthy");
        assert_eq!(json["report"]["source"], "upload");
    }
}
