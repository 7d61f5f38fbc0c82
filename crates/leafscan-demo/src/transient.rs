//! Transient image files handed to the classifier

use crate::acquire::LeafImage;
use crate::config::TransientConfig;
use image::ImageFormat;
use leafscan_core::InferenceError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tempfile::TempPath;

/// Fixed file name used in shared mode
pub const SHARED_FILE_NAME: &str = "temp_leaf.jpg";

/// How transient files are named
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransientMode {
    /// A fresh file per analysis, removed once the analysis finishes
    #[default]
    Unique,
    /// One fixed file overwritten by every analysis.
    ///
    /// Concurrent sessions race on this file; a result may be computed
    /// from another session's image.
    Shared,
}

/// Writes leaf images to disk as JPEG for the classifier to read back
#[derive(Debug, Clone)]
pub struct TransientStore {
    mode: TransientMode,
    dir: PathBuf,
}

impl TransientStore {
    pub fn new(mode: TransientMode, dir: impl Into<PathBuf>) -> Self {
        Self {
            mode,
            dir: dir.into(),
        }
    }

    /// Build from configuration, defaulting to the system temp directory
    pub fn from_config(config: &TransientConfig) -> Self {
        let dir = config.dir.clone().unwrap_or_else(std::env::temp_dir);
        Self::new(config.mode, dir)
    }

    pub fn mode(&self) -> TransientMode {
        self.mode
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Encode the image as JPEG into a transient file
    pub fn persist(&self, leaf: &LeafImage) -> Result<TransientFile, InferenceError> {
        // JPEG has no alpha channel
        let rgb = leaf.image().to_rgb8();

        match self.mode {
            TransientMode::Unique => {
                let file = tempfile::Builder::new()
                    .prefix("leaf-")
                    .suffix(".jpg")
                    .tempfile_in(&self.dir)?;
                let path = file.into_temp_path();
                rgb.save_with_format(&path, ImageFormat::Jpeg)
                    .map_err(InferenceError::image)?;
                Ok(TransientFile::Unique(path))
            }
            TransientMode::Shared => {
                let path = self.dir.join(SHARED_FILE_NAME);
                rgb.save_with_format(&path, ImageFormat::Jpeg)
                    .map_err(InferenceError::image)?;
                Ok(TransientFile::Shared(path))
            }
        }
    }
}

/// A persisted image; unique files are deleted on drop, the shared file is left in place
#[derive(Debug)]
pub enum TransientFile {
    Unique(TempPath),
    Shared(PathBuf),
}

impl TransientFile {
    pub fn path(&self) -> &Path {
        match self {
            Self::Unique(path) => &**path,
            Self::Shared(path) => path.as_path(),
        }
    }
}
