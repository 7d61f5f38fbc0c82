//! Demo configuration

use crate::cli::ModelArgs;
use crate::transient::TransientMode;
use leafscan_classifiers::{LabelSource, ModelConfig, ModelSource};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Demo configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Model artifact and label table
    #[serde(default)]
    pub model: ModelConfig,

    /// Where analyses write their transient image
    #[serde(default)]
    pub transient: TransientConfig,

    /// Page text
    #[serde(default)]
    pub page: PageConfig,
}

impl AppConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(args: &ModelArgs) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config = if Path::new(&args.config).exists() {
            let content = std::fs::read_to_string(&args.config)?;
            Self::from_yaml(&content)?
        } else {
            tracing::debug!("No config file at {}, using defaults", args.config);
            Self::default()
        };

        config.apply_overrides(args);
        Ok(config)
    }

    /// Parse a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Apply CLI overrides
    pub fn apply_overrides(&mut self, args: &ModelArgs) {
        if let Some(model) = &args.model {
            self.model.source = ModelSource::Local {
                path: model.clone(),
            };
        }

        if let Some(labels) = &args.labels {
            self.model.labels = LabelSource::File(labels.clone());
        }

        if let Some(architecture) = args.architecture {
            self.model.architecture = architecture;
        }

        if args.shared_transient {
            self.transient.mode = TransientMode::Shared;
        }
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_address")]
    pub address: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted upload in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Transient file configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransientConfig {
    /// Unique file per analysis, or one shared fixed file
    #[serde(default)]
    pub mode: TransientMode,

    /// Directory for transient files (system temp dir when unset)
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// Text shown on the page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    /// Browser tab title
    #[serde(default = "default_title")]
    pub title: String,

    /// Main heading
    #[serde(default = "default_heading")]
    pub heading: String,

    /// Fixed value of the response-time metric
    #[serde(default = "default_latency_label")]
    pub latency_label: String,

    /// Footer caption
    #[serde(default = "default_footer")]
    pub footer: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            heading: default_heading(),
            latency_label: default_latency_label(),
            footer: default_footer(),
        }
    }
}

fn default_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}

fn default_title() -> String {
    "Plant Health AI".to_string()
}

fn default_heading() -> String {
    "🌿 Agricultural Robotics: Plant Disease Detection".to_string()
}

fn default_latency_label() -> String {
    "~3 ms".to_string()
}

fn default_footer() -> String {
    "Powered by candle & axum".to_string()
}
