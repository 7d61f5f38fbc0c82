//! LeafScan Core
//!
//! Core types and policy shared across LeafScan components.
//!
//! This crate provides:
//! - The error kinds raised while loading a model, acquiring an image, and
//!   running an analysis
//! - The prediction data model (`ClassProbabilities`, `Prediction`)
//! - Label normalization and the healthy/diseased decision policy
//! - Confidence formatting for display

pub mod error;
pub mod label;
pub mod types;

pub use error::{AcquireError, Error, InferenceError, LoadError, Result};
pub use label::{classify_label, format_confidence, normalize_label, HEALTHY_MARKER};
pub use types::{Analysis, ClassProbabilities, Outcome, Prediction};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{AcquireError, Error, InferenceError, LoadError, Result};
    pub use crate::label::{classify_label, format_confidence, normalize_label};
    pub use crate::types::{Analysis, ClassProbabilities, Outcome, Prediction};
}
