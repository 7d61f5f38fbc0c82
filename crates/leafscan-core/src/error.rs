//! Error types for LeafScan

use std::path::PathBuf;

/// Result type alias using LeafScan's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for LeafScan operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The model could not be loaded
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The submitted image was rejected
    #[error(transparent)]
    Acquire(#[from] AcquireError),

    /// An analysis step failed
    #[error(transparent)]
    Inference(#[from] InferenceError),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Failure to produce a ready classifier from the model artifact.
///
/// Raised once at startup. While a load error stands, no analysis is offered.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The artifact path does not exist
    #[error("model file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The artifact exists but could not be read as a model
    #[error("malformed model file {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },

    /// The label table is missing, empty, or inconsistent
    #[error("invalid label table: {0}")]
    Labels(String),

    /// The requested inference device is unavailable
    #[error("device unavailable: {0}")]
    Device(String),

    /// Fetching the artifact from a remote hub failed
    #[error("model download failed: {0}")]
    Download(String),

    /// The model configuration itself is unusable
    #[error("model configuration error: {0}")]
    Config(String),
}

impl LoadError {
    /// Create a malformed-artifact error
    pub fn malformed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Malformed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a label table error
    pub fn labels(msg: impl Into<String>) -> Self {
        Self::Labels(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Short, stable name used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Malformed { .. } => "malformed",
            Self::Labels(_) => "labels",
            Self::Device(_) => "device",
            Self::Download(_) => "download",
            Self::Config(_) => "config",
        }
    }
}

/// Rejection of the submitted bytes before any analysis runs
#[derive(Debug, thiserror::Error)]
pub enum AcquireError {
    /// The bytes are an image, but not one of the accepted encodings
    #[error("unsupported image format: {detected} (expected jpeg or png)")]
    UnsupportedFormat { detected: String },

    /// The bytes claim an accepted encoding but do not decode
    #[error("could not decode image: {0}")]
    Decode(String),
}

impl AcquireError {
    /// Create a decode error
    pub fn decode(reason: impl ToString) -> Self {
        Self::Decode(reason.to_string())
    }

    /// Short, stable name used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat { .. } => "unsupported_format",
            Self::Decode(_) => "decode",
        }
    }
}

/// Any failure inside the persist → infer → render step.
///
/// Rendered verbatim to the user; the session stays usable.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// Writing or reading the transient file failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The transient image could not be encoded or decoded
    #[error("image error: {0}")]
    Image(String),

    /// The classifier failed while running
    #[error("classifier error: {0}")]
    Runtime(String),

    /// The classifier returned something that is not a usable distribution
    #[error("malformed classifier result: {0}")]
    MalformedResult(String),
}

impl InferenceError {
    /// Create an image encode/decode error
    pub fn image(reason: impl ToString) -> Self {
        Self::Image(reason.to_string())
    }

    /// Create a classifier runtime error
    pub fn runtime(reason: impl ToString) -> Self {
        Self::Runtime(reason.to_string())
    }

    /// Create a malformed-result error
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResult(reason.into())
    }

    /// Short, stable name used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Image(_) => "image",
            Self::Runtime(_) => "runtime",
            Self::MalformedResult(_) => "malformed_result",
        }
    }
}
