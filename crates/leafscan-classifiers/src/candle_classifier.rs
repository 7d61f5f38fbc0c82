//! Candle-backed image classifier loaded from a safetensors artifact

use crate::classifier::ImageClassifier;
use crate::config::{Architecture, ModelConfig, ModelSource, Normalization};
use crate::labels::LabelTable;
use crate::preprocess::image_to_tensor;
use candle_core::{DType, Device, Module, D};
use candle_nn::VarBuilder;
use candle_transformers::models::efficientnet::{EfficientNet, MBConvConfig};
use candle_transformers::models::resnet;
use hf_hub::{api::sync::Api, Repo, RepoType};
use image::{DynamicImage, ImageReader};
use leafscan_core::{ClassProbabilities, InferenceError, LoadError};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

type Network = Box<dyn Module + Send + Sync>;

/// Image classifier running a candle network on a fixed label table
pub struct CandleImageClassifier {
    name: String,
    network: Network,
    device: Device,
    labels: LabelTable,
    image_size: usize,
    normalization: Normalization,
    weights_path: PathBuf,
}

impl CandleImageClassifier {
    /// Load a classifier from configuration.
    ///
    /// The network is built with one output per label, so a label table that
    /// does not match the artifact's head fails here rather than at inference.
    pub fn load(config: &ModelConfig) -> Result<Self, LoadError> {
        config.validate()?;

        let labels = LabelTable::load(&config.labels)?;
        let weights_path = resolve_model_path(&config.source)?;
        let device = config.device.to_device()?;

        let tensors = candle_core::safetensors::load(&weights_path, &device)
            .map_err(|e| LoadError::malformed(&weights_path, e))?;
        debug!(
            "Read {} tensors from {}",
            tensors.len(),
            weights_path.display()
        );

        let vb = VarBuilder::from_tensors(tensors, DType::F32, &device);
        let network = build_network(config.architecture, labels.len(), vb)
            .map_err(|e| LoadError::malformed(&weights_path, e))?;

        info!(
            "Loaded {} classifier '{}' with {} labels",
            config.architecture,
            config.display_name(),
            labels.len()
        );

        Ok(Self {
            name: config.display_name(),
            network,
            device,
            labels,
            image_size: config.image_size,
            normalization: config.normalization,
            weights_path,
        })
    }

    /// Classify an already decoded image
    pub fn classify_image(&self, image: &DynamicImage) -> Result<ClassProbabilities, InferenceError> {
        let start = Instant::now();

        let input = image_to_tensor(image, self.image_size, self.normalization, &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(InferenceError::runtime)?;

        let logits = self
            .network
            .forward(&input)
            .map_err(InferenceError::runtime)?;

        let probabilities: Vec<f32> = candle_nn::ops::softmax(&logits, D::Minus1)
            .and_then(|p| p.squeeze(0))
            .and_then(|p| p.to_dtype(DType::F32))
            .and_then(|p| p.to_vec1())
            .map_err(|e| InferenceError::malformed(e.to_string()))?;

        debug!(
            "Classified {}x{} image in {}us",
            image.width(),
            image.height(),
            start.elapsed().as_micros()
        );

        Ok(ClassProbabilities::new(probabilities, self.labels.shared()))
    }

    /// Get the device the network runs on
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Get the resolved weights path
    pub fn weights_path(&self) -> &Path {
        &self.weights_path
    }
}

impl ImageClassifier for CandleImageClassifier {
    fn classify_file(&self, path: &Path) -> Result<ClassProbabilities, InferenceError> {
        let image = ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(InferenceError::image)?;

        self.classify_image(&image)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn labels(&self) -> &[String] {
        self.labels.as_slice()
    }
}

/// Build the network for an architecture with `num_classes` outputs
fn build_network(
    architecture: Architecture,
    num_classes: usize,
    vb: VarBuilder<'static>,
) -> candle_core::Result<Network> {
    let network: Network = match architecture {
        Architecture::Resnet18 => Box::new(resnet::resnet18(num_classes, vb)?),
        Architecture::Resnet34 => Box::new(resnet::resnet34(num_classes, vb)?),
        Architecture::Resnet50 => Box::new(resnet::resnet50(num_classes, vb)?),
        Architecture::EfficientnetB0 => {
            Box::new(EfficientNet::new(vb, MBConvConfig::b0(), num_classes)?)
        }
        Architecture::EfficientnetB1 => {
            Box::new(EfficientNet::new(vb, MBConvConfig::b1(), num_classes)?)
        }
        Architecture::EfficientnetB2 => {
            Box::new(EfficientNet::new(vb, MBConvConfig::b2(), num_classes)?)
        }
        Architecture::EfficientnetB3 => {
            Box::new(EfficientNet::new(vb, MBConvConfig::b3(), num_classes)?)
        }
    };
    Ok(network)
}

/// Resolve model path from source
fn resolve_model_path(source: &ModelSource) -> Result<PathBuf, LoadError> {
    match source {
        ModelSource::Local { path } => {
            if !path.is_file() {
                return Err(LoadError::NotFound { path: path.clone() });
            }
            Ok(path.clone())
        }
        ModelSource::HuggingFace {
            repo_id,
            filename,
            revision,
        } => {
            info!("Downloading model from HuggingFace: {}/{}", repo_id, filename);

            let api = Api::new()
                .map_err(|e| LoadError::Download(format!("failed to initialize HF API: {}", e)))?;

            let repo = api.repo(Repo::with_revision(
                repo_id.clone(),
                RepoType::Model,
                revision.clone().unwrap_or_else(|| "main".to_string()),
            ));

            repo.get(filename)
                .map_err(|e| LoadError::Download(format!("failed to download {}: {}", filename, e)))
        }
    }
}
