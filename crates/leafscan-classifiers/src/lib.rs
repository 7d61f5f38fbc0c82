//! LeafScan Classifiers
//!
//! Image classifiers for plant-disease detection.
//!
//! A classifier maps an image file to a probability distribution over a fixed
//! label table. The candle-backed implementation loads a safetensors artifact
//! for one of the supported architectures; the [`ModelLoader`] makes sure that
//! load happens once per process and hands out the same shared instance after.
//!
//! All inference runs on CPU by default.

pub mod candle_classifier;
pub mod classifier;
pub mod config;
pub mod labels;
pub mod model_loader;
pub mod preprocess;

pub use candle_classifier::CandleImageClassifier;
pub use classifier::{ImageClassifier, SharedClassifier};
pub use config::{Architecture, DeviceSpec, LabelSource, ModelConfig, ModelSource, Normalization};
pub use labels::LabelTable;
pub use model_loader::ModelLoader;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::candle_classifier::CandleImageClassifier;
    pub use crate::classifier::{ImageClassifier, SharedClassifier};
    pub use crate::config::{Architecture, DeviceSpec, LabelSource, ModelConfig, ModelSource};
    pub use crate::labels::LabelTable;
    pub use crate::model_loader::ModelLoader;
}
