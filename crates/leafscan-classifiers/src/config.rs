//! Configuration for the image model and its label table

use candle_core::Device;
use leafscan_core::LoadError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Configuration for loading an image classification model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Display name (defaults to the artifact file stem)
    #[serde(default)]
    pub name: Option<String>,

    /// Source of the model weights
    #[serde(flatten)]
    pub source: ModelSource,

    /// Network architecture the weights belong to
    #[serde(default)]
    pub architecture: Architecture,

    /// Label table, indexed by class
    #[serde(default)]
    pub labels: LabelSource,

    /// Device to run inference on
    #[serde(default)]
    pub device: DeviceSpec,

    /// Square input resolution fed to the network
    #[serde(default = "default_image_size")]
    pub image_size: usize,

    /// Pixel normalization applied after scaling to `[0, 1]`
    #[serde(default)]
    pub normalization: Normalization,
}

/// Source location for model weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelSource {
    /// Local safetensors file
    Local { path: PathBuf },

    /// Download from Hugging Face Hub
    HuggingFace {
        repo_id: String,
        filename: String,
        revision: Option<String>,
    },
}

/// Supported classification networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Architecture {
    #[default]
    Resnet18,
    Resnet34,
    Resnet50,
    EfficientnetB0,
    EfficientnetB1,
    EfficientnetB2,
    EfficientnetB3,
}

impl Architecture {
    /// All supported architectures
    pub const ALL: [Architecture; 7] = [
        Self::Resnet18,
        Self::Resnet34,
        Self::Resnet50,
        Self::EfficientnetB0,
        Self::EfficientnetB1,
        Self::EfficientnetB2,
        Self::EfficientnetB3,
    ];

    /// Config-file name of the architecture
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resnet18 => "resnet18",
            Self::Resnet34 => "resnet34",
            Self::Resnet50 => "resnet50",
            Self::EfficientnetB0 => "efficientnet_b0",
            Self::EfficientnetB1 => "efficientnet_b1",
            Self::EfficientnetB2 => "efficientnet_b2",
            Self::EfficientnetB3 => "efficientnet_b3",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Architecture {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|arch| arch.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|a| a.as_str()).collect();
                format!("unknown architecture '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

/// Where the label table comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelSource {
    /// Labels listed directly in the configuration
    Inline(Vec<String>),

    /// Labels read from a JSON, YAML, or plain-text file
    File(PathBuf),
}

impl Default for LabelSource {
    fn default() -> Self {
        Self::File(PathBuf::from("labels.json"))
    }
}

/// Device specification (for config files)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceSpec {
    #[default]
    Cpu,
    Cuda { index: Option<usize> },
    Metal { index: Option<usize> },
}

impl DeviceSpec {
    /// Create the candle device
    pub fn to_device(&self) -> Result<Device, LoadError> {
        match self {
            Self::Cpu => Ok(Device::Cpu),
            Self::Cuda { index } => Device::new_cuda(index.unwrap_or(0))
                .map_err(|e| LoadError::Device(format!("failed to create CUDA device: {}", e))),
            Self::Metal { index } => Device::new_metal(index.unwrap_or(0))
                .map_err(|e| LoadError::Device(format!("failed to create Metal device: {}", e))),
        }
    }
}

/// Pixel normalization scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    /// Subtract the ImageNet channel means and divide by their deviations
    #[default]
    Imagenet,
    /// Keep pixels scaled to `[0, 1]`
    Unit,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: None,
            source: ModelSource::Local {
                path: PathBuf::from("best.safetensors"),
            },
            architecture: Architecture::default(),
            labels: LabelSource::default(),
            device: DeviceSpec::Cpu,
            image_size: default_image_size(),
            normalization: Normalization::default(),
        }
    }
}

impl ModelConfig {
    /// Create a new model configuration from local path
    pub fn from_local(path: impl Into<PathBuf>) -> Self {
        Self {
            source: ModelSource::Local { path: path.into() },
            ..Default::default()
        }
    }

    /// Create a new model configuration from Hugging Face
    pub fn from_hf(repo_id: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            source: ModelSource::HuggingFace {
                repo_id: repo_id.into(),
                filename: filename.into(),
                revision: None,
            },
            ..Default::default()
        }
    }

    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Set the architecture
    pub fn with_architecture(mut self, architecture: Architecture) -> Self {
        self.architecture = architecture;
        self
    }

    /// Set the label table
    pub fn with_labels(mut self, labels: LabelSource) -> Self {
        self.labels = labels;
        self
    }

    /// Set device
    pub fn with_device(mut self, device: DeviceSpec) -> Self {
        self.device = device;
        self
    }

    /// Set the input resolution
    pub fn with_image_size(mut self, size: usize) -> Self {
        self.image_size = size;
        self
    }

    /// Set the pixel normalization
    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    /// Set Hugging Face revision
    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        if let ModelSource::HuggingFace { repo_id, filename, .. } = self.source {
            self.source = ModelSource::HuggingFace {
                repo_id,
                filename,
                revision: Some(revision.into()),
            };
        }
        self
    }

    /// Name shown to users: the configured name, or the artifact file stem
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }

        let file = match &self.source {
            ModelSource::Local { path } => path.file_stem().and_then(|s| s.to_str()),
            ModelSource::HuggingFace { repo_id, .. } => Some(repo_id.as_str()),
        };
        file.unwrap_or("model").to_string()
    }

    /// Check the values serde cannot
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.image_size < 32 {
            return Err(LoadError::config(format!(
                "image_size must be at least 32, got {}",
                self.image_size
            )));
        }
        if let ModelSource::Local { path } = &self.source {
            if path.as_os_str().is_empty() {
                return Err(LoadError::config("model path is empty"));
            }
        }
        Ok(())
    }
}

fn default_image_size() -> usize {
    224
}
