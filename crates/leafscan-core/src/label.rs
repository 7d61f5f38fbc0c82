//! Label normalization and the healthy/diseased decision policy

use crate::types::Outcome;

/// Substring that marks a label as a healthy plant
pub const HEALTHY_MARKER: &str = "healthy";

/// Separator used inside raw class names (`Tomato_Late_blight`)
const LABEL_SEPARATOR: char = '_';

/// Normalize a raw class name for display.
///
/// Separators become spaces and the result is uppercased, so
/// `Tomato_Late_blight` becomes `TOMATO LATE BLIGHT`. Applying it to an
/// already normalized label returns the label unchanged.
pub fn normalize_label(raw: &str) -> String {
    raw.replace(LABEL_SEPARATOR, " ").to_uppercase()
}

/// Decide the outcome for a label.
///
/// This substring test is the whole policy: the confidence score never gates
/// the branch.
pub fn classify_label(label: &str) -> Outcome {
    if label.to_lowercase().contains(HEALTHY_MARKER) {
        Outcome::Healthy
    } else {
        Outcome::Diseased
    }
}

/// Format a probability in `[0, 1]` as a percentage with one decimal place
pub fn format_confidence(probability: f32) -> String {
    format!("{:.1}%", f64::from(probability) * 100.0)
}
