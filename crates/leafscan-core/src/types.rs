//! Core types for predictions and analysis outcomes

use crate::error::InferenceError;
use crate::label::{classify_label, format_confidence, normalize_label};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Full class-probability distribution for one processed image
#[derive(Debug, Clone)]
pub struct ClassProbabilities {
    /// One probability per class, indexed like `labels`
    probabilities: Vec<f32>,

    /// The model's label table
    labels: Arc<[String]>,
}

impl ClassProbabilities {
    /// Create a distribution over the given label table
    pub fn new(probabilities: Vec<f32>, labels: Arc<[String]>) -> Self {
        Self {
            probabilities,
            labels,
        }
    }

    /// Raw probabilities
    pub fn probabilities(&self) -> &[f32] {
        &self.probabilities
    }

    /// Label table
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of classes in the distribution
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    /// Whether the distribution is empty
    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    /// Arg-max class, its probability, and its label.
    ///
    /// Ties resolve to the lowest index.
    pub fn top1(&self) -> Result<Prediction, InferenceError> {
        self.validate()?;

        let mut best = 0;
        for (index, &p) in self.probabilities.iter().enumerate().skip(1) {
            if p > self.probabilities[best] {
                best = index;
            }
        }

        Ok(self.prediction_at(best))
    }

    /// The `k` most probable classes, highest first
    pub fn top_k(&self, k: usize) -> Result<Vec<Prediction>, InferenceError> {
        self.validate()?;

        let mut indices: Vec<usize> = (0..self.probabilities.len()).collect();
        indices.sort_by(|&a, &b| {
            self.probabilities[b]
                .partial_cmp(&self.probabilities[a])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });

        Ok(indices
            .into_iter()
            .take(k)
            .map(|index| self.prediction_at(index))
            .collect())
    }

    fn prediction_at(&self, index: usize) -> Prediction {
        Prediction {
            index,
            label: self.labels[index].clone(),
            confidence: self.probabilities[index],
        }
    }

    fn validate(&self) -> Result<(), InferenceError> {
        if self.probabilities.is_empty() {
            return Err(InferenceError::malformed("empty class distribution"));
        }
        if self.probabilities.len() != self.labels.len() {
            return Err(InferenceError::malformed(format!(
                "distribution has {} classes but the label table has {}",
                self.probabilities.len(),
                self.labels.len()
            )));
        }
        if let Some(index) = self.probabilities.iter().position(|p| !p.is_finite()) {
            return Err(InferenceError::malformed(format!(
                "non-finite probability for class {}",
                index
            )));
        }
        Ok(())
    }
}

/// Top-1 prediction: a class label and its confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Class index in the model's label table
    pub index: usize,

    /// Raw class label
    pub label: String,

    /// Confidence score (0.0-1.0)
    pub confidence: f32,
}

/// Healthy/diseased decision for a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Positive outcome: the label names a healthy plant
    Healthy,
    /// Warning outcome: the label names a condition
    Diseased,
}

impl Outcome {
    /// Whether this is the positive outcome
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }

    /// Stable lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Diseased => "diseased",
        }
    }
}

/// A prediction with the display policy applied
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    /// The underlying top-1 prediction
    pub prediction: Prediction,

    /// Normalized label (`TOMATO LATE BLIGHT`)
    pub display_label: String,

    /// Healthy/diseased decision
    pub outcome: Outcome,

    /// Confidence as a percentage string (`87.3%`)
    pub confidence: String,
}

impl From<Prediction> for Analysis {
    fn from(prediction: Prediction) -> Self {
        Self {
            display_label: normalize_label(&prediction.label),
            outcome: classify_label(&prediction.label),
            confidence: format_confidence(prediction.confidence),
            prediction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Arc<[String]> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_top1_picks_argmax() {
        let dist = ClassProbabilities::new(
            vec![0.02, 0.95, 0.03],
            labels(&["Potato_Early_blight", "Potato_healthy", "Potato_Late_blight"]),
        );

        let top = dist.top1().unwrap();
        assert_eq!(top.index, 1);
        assert_eq!(top.label, "Potato_healthy");
        assert!((top.confidence - 0.95).abs() < f32::EPSILON);
    }

    #[test]
    fn test_top1_tie_resolves_to_lowest_index() {
        let dist = ClassProbabilities::new(vec![0.5, 0.5], labels(&["a", "b"]));
        assert_eq!(dist.top1().unwrap().index, 0);
    }

    #[test]
    fn test_top1_rejects_malformed_distributions() {
        let empty = ClassProbabilities::new(vec![], labels(&[]));
        assert!(matches!(
            empty.top1(),
            Err(InferenceError::MalformedResult(_))
        ));

        let mismatched = ClassProbabilities::new(vec![0.1, 0.9], labels(&["only"]));
        assert!(matches!(
            mismatched.top1(),
            Err(InferenceError::MalformedResult(_))
        ));

        let nan = ClassProbabilities::new(vec![f32::NAN, 0.9], labels(&["a", "b"]));
        assert!(matches!(nan.top1(), Err(InferenceError::MalformedResult(_))));
    }

    #[test]
    fn test_top_k_orders_by_probability() {
        let dist = ClassProbabilities::new(
            vec![0.1, 0.6, 0.3],
            labels(&["a", "b", "c"]),
        );

        let top: Vec<String> = dist
            .top_k(2)
            .unwrap()
            .into_iter()
            .map(|p| p.label)
            .collect();
        assert_eq!(top, vec!["b", "c"]);
        assert_eq!(dist.top_k(10).unwrap().len(), 3);
    }

    #[test]
    fn test_analysis_from_diseased_prediction() {
        let analysis = Analysis::from(Prediction {
            index: 3,
            label: "Tomato_Late_blight".to_string(),
            confidence: 0.8734,
        });

        assert_eq!(analysis.outcome, Outcome::Diseased);
        assert_eq!(analysis.display_label, "TOMATO LATE BLIGHT");
        assert_eq!(analysis.confidence, "87.3%");
    }

    #[test]
    fn test_outcome_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Outcome::Healthy).unwrap(),
            "\"healthy\""
        );
        assert_eq!(Outcome::Diseased.as_str(), "diseased");
    }
}
