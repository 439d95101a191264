use std::io::Cursor;

use domain::Error;
use image::{
    imageops::{self, FilterType},
    GrayImage, ImageFormat, Luma,
};

/// Fixed sequence of image clean-up steps run before recognition.
///
/// Stages run in field order; `None` skips a stage. With `enabled: false`
/// the image is only converted to grayscale. Hand-built options are taken
/// as-is except that an upscale factor below 2 and a non-positive blur
/// sigma are treated like `None`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PreprocessOptions {
    pub enabled: bool,
    /// Multiplicative contrast factor around the mean intensity.
    pub contrast: Option<f32>,
    /// Block radius for adaptive (local mean) thresholding.
    pub threshold_radius: Option<u32>,
    /// Integer upscaling factor, Lanczos3 resampling.
    pub upscale: Option<u32>,
    /// Gaussian blur sigma.
    pub blur_radius: Option<f32>,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            contrast: Some(1.5),
            threshold_radius: None,
            upscale: Some(2),
            blur_radius: Some(1.0),
        }
    }
}

pub fn preprocess(bytes: &[u8], options: &PreprocessOptions) -> Result<GrayImage, Error> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| Error::decode(format!("Unsupported or corrupt image: {}", e)))?;

    let mut gray = decoded.to_luma8();
    if !options.enabled {
        return Ok(gray);
    }

    if let Some(factor) = options.contrast {
        gray = enhance_contrast(&gray, factor);
    }

    if let Some(radius) = options.threshold_radius {
        gray = imageproc::contrast::adaptive_threshold(&gray, radius);
    }

    if let Some(factor) = options.upscale.filter(|f| *f > 1) {
        let (width, height) = match (
            gray.width().checked_mul(factor),
            gray.height().checked_mul(factor),
        ) {
            (Some(w), Some(h)) => (w, h),
            _ => return Err(Error::decode("Image too large to upscale")),
        };
        gray = imageops::resize(&gray, width, height, FilterType::Lanczos3);
    }

    if let Some(sigma) = options.blur_radius.filter(|r| *r > 0.0) {
        gray = imageops::blur(&gray, sigma);
    }

    Ok(gray)
}

/// Pushes every pixel away from (factor > 1) or towards (factor < 1) the
/// image's mean intensity.
pub fn enhance_contrast(image: &GrayImage, factor: f32) -> GrayImage {
    let pixels = image.as_raw();
    if pixels.is_empty() {
        return image.clone();
    }

    let sum: u64 = pixels.iter().map(|&p| p as u64).sum();
    let mean = (sum as f32 / pixels.len() as f32).round();

    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let value = mean + factor * (pixel[0] as f32 - mean);
        *pixel = Luma([value.round().clamp(0.0, 255.0) as u8]);
    }
    out
}

/// PNG bytes for handing the processed image to an external engine.
pub fn encode_png(image: &GrayImage) -> Result<Vec<u8>, Error> {
    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|e| Error::engine(format!("Failed to encode image: {}", e)))?;
    Ok(cursor.into_inner())
}
