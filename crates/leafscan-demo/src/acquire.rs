//! Image acquisition from an upload or a camera snapshot

use image::{DynamicImage, ImageFormat};
use leafscan_core::AcquireError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where the leaf photo came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureSource {
    /// A file picked from disk
    #[default]
    Upload,
    /// A still taken with the device camera
    Camera,
}

impl CaptureSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Camera => "camera",
        }
    }
}

impl fmt::Display for CaptureSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaptureSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "upload" | "file" => Ok(Self::Upload),
            "camera" | "snapshot" => Ok(Self::Camera),
            other => Err(format!("unknown image source '{}' (expected upload or camera)", other)),
        }
    }
}

/// A decoded leaf photo ready for analysis
#[derive(Debug, Clone)]
pub struct LeafImage {
    image: DynamicImage,
    format: ImageFormat,
    source: CaptureSource,
}

impl LeafImage {
    /// Wrap an already decoded image
    pub fn new(image: DynamicImage, format: ImageFormat, source: CaptureSource) -> Self {
        Self {
            image,
            format,
            source,
        }
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Encoding the bytes arrived in
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn source(&self) -> CaptureSource {
        self.source
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

/// Decode submitted bytes into a [`LeafImage`].
///
/// `None` or an empty buffer means nothing was provided yet and yields
/// `Ok(None)`. Only JPEG and PNG are accepted, detected from the content
/// rather than any file name the client sent.
pub fn acquire(
    source: CaptureSource,
    bytes: Option<&[u8]>,
) -> Result<Option<LeafImage>, AcquireError> {
    let bytes = match bytes {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => return Ok(None),
    };

    let format = match image::guess_format(bytes) {
        Ok(format @ (ImageFormat::Jpeg | ImageFormat::Png)) => format,
        Ok(other) => {
            return Err(AcquireError::UnsupportedFormat {
                detected: format_name(other),
            })
        }
        Err(_) => {
            return Err(AcquireError::UnsupportedFormat {
                detected: "unknown".to_string(),
            })
        }
    };

    let image =
        image::load_from_memory_with_format(bytes, format).map_err(AcquireError::decode)?;

    tracing::debug!(
        "Acquired {} {}x{} image from {}",
        format_name(format),
        image.width(),
        image.height(),
        source
    );

    Ok(Some(LeafImage::new(image, format, source)))
}

fn format_name(format: ImageFormat) -> String {
    format
        .extensions_str()
        .first()
        .map(|ext| ext.to_string())
        .unwrap_or_else(|| format!("{:?}", format).to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    fn green_leaf() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 24, Rgb([40, 160, 60])))
    }

    #[test]
    fn test_nothing_provided_is_idle() {
        assert!(acquire(CaptureSource::Upload, None).unwrap().is_none());
        assert!(acquire(CaptureSource::Camera, Some(&[])).unwrap().is_none());
    }

    #[test]
    fn test_accepts_jpeg_upload() {
        let bytes = encode(green_leaf(), ImageFormat::Jpeg);
        let leaf = acquire(CaptureSource::Upload, Some(&bytes)).unwrap().unwrap();

        assert_eq!(leaf.format(), ImageFormat::Jpeg);
        assert_eq!(leaf.source(), CaptureSource::Upload);
        assert_eq!(leaf.dimensions(), (32, 24));
    }

    #[test]
    fn test_accepts_png_camera_snapshot_with_alpha() {
        let snapshot = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([1, 2, 3, 200])));
        let bytes = encode(snapshot, ImageFormat::Png);
        let leaf = acquire(CaptureSource::Camera, Some(&bytes)).unwrap().unwrap();

        assert_eq!(leaf.format(), ImageFormat::Png);
        assert_eq!(leaf.source(), CaptureSource::Camera);
        assert_eq!(leaf.dimensions(), (8, 8));
    }

    #[test]
    fn test_rejects_gif_by_content() {
        let gif = b"GIF89a\x01\x00\x01\x00\x00\x00\x00;";
        let err = acquire(CaptureSource::Upload, Some(gif)).unwrap_err();

        match err {
            AcquireError::UnsupportedFormat { detected } => assert_eq!(detected, "gif"),
            other => panic!("expected unsupported format, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unrecognized_bytes() {
        let err = acquire(CaptureSource::Upload, Some(b"hello, leaf")).unwrap_err();
        assert!(matches!(
            err,
            AcquireError::UnsupportedFormat { ref detected } if detected == "unknown"
        ));
    }

    #[test]
    fn test_truncated_png_is_decode_error() {
        let mut bytes = encode(green_leaf(), ImageFormat::Png);
        bytes.truncate(40);

        let err = acquire(CaptureSource::Upload, Some(&bytes)).unwrap_err();
        assert!(matches!(err, AcquireError::Decode(_)), "got {:?}", err);
    }

    #[test]
    fn test_capture_source_parsing() {
        assert_eq!("camera".parse::<CaptureSource>().unwrap(), CaptureSource::Camera);
        assert_eq!(" Upload ".parse::<CaptureSource>().unwrap(), CaptureSource::Upload);
        assert!("scanner".parse::<CaptureSource>().is_err());
    }
}
