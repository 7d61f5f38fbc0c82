//! Image to tensor conversion

use crate::config::Normalization;
use candle_core::{DType, Device, Tensor};
use image::imageops::FilterType;
use image::DynamicImage;

/// ImageNet per-channel means (RGB)
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// ImageNet per-channel standard deviations (RGB)
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Convert an image into a `(3, size, size)` f32 tensor.
///
/// The image is resized so its shorter side matches `size`, center-cropped to
/// a square, scaled to `[0, 1]`, then normalized.
pub fn image_to_tensor(
    image: &DynamicImage,
    size: usize,
    normalization: Normalization,
    device: &Device,
) -> candle_core::Result<Tensor> {
    let side = size as u32;
    let rgb = image
        .resize_to_fill(side, side, FilterType::Triangle)
        .to_rgb8();

    let data = rgb.into_raw();
    let pixels = Tensor::from_vec(data, (size, size, 3), &Device::Cpu)?
        .permute((2, 0, 1))?
        .to_dtype(DType::F32)?;
    let scaled = (pixels / 255.0)?;

    let normalized = match normalization {
        Normalization::Unit => scaled,
        Normalization::Imagenet => {
            let mean = Tensor::new(&IMAGENET_MEAN, &Device::Cpu)?.reshape((3, 1, 1))?;
            let std = Tensor::new(&IMAGENET_STD, &Device::Cpu)?.reshape((3, 1, 1))?;
            scaled.broadcast_sub(&mean)?.broadcast_div(&std)?
        }
    };

    normalized.to_device(device)
}
