// SPDX-License-Identifier: GPL-3.0-only

//! JPEG encoding for captured photos and exported strips
//!
//! JPEG has no alpha channel, so RGBA input is flattened to RGB first.

use crate::constants::encoding;
use crate::errors::{AppError, AppResult};
use image::{ImageBuffer, Rgb, RgbImage, RgbaImage};
use tracing::debug;

/// Encoding quality settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingQuality {
    /// Medium quality (balanced)
    Medium,
    /// Quality used for captured photos
    High,
    /// Maximum quality, used for strip export
    Maximum,
}

impl EncodingQuality {
    /// Get JPEG quality value (0-100)
    pub fn jpeg_quality(&self) -> u8 {
        match self {
            EncodingQuality::Medium => 80,
            EncodingQuality::High => encoding::CAPTURE_JPEG_QUALITY,
            EncodingQuality::Maximum => encoding::EXPORT_JPEG_QUALITY,
        }
    }
}

/// Photo encoder
#[derive(Debug, Clone, Copy)]
pub struct PhotoEncoder {
    quality: EncodingQuality,
}

impl PhotoEncoder {
    /// Create a new encoder with high quality
    pub fn new() -> Self {
        Self {
            quality: EncodingQuality::High,
        }
    }

    pub fn with_quality(quality: EncodingQuality) -> Self {
        Self { quality }
    }

    /// Set encoding quality
    pub fn set_quality(&mut self, quality: EncodingQuality) {
        self.quality = quality;
    }

    pub fn quality(&self) -> EncodingQuality {
        self.quality
    }

    /// Encode an RGBA image as JPEG on the current thread
    pub fn encode_jpeg(&self, image: &RgbaImage) -> AppResult<Vec<u8>> {
        let rgb = flatten_alpha(image);
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);

        let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
            &mut cursor,
            self.quality.jpeg_quality(),
        );

        encoder
            .encode(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| AppError::ExportFailed(format!("JPEG encoding failed: {}", e)))?;

        debug!(
            size = buffer.len(),
            quality = self.quality.jpeg_quality(),
            "Encoding complete"
        );
        Ok(buffer)
    }

    /// Encode on a blocking worker thread
    pub async fn encode_jpeg_async(&self, image: RgbaImage) -> AppResult<Vec<u8>> {
        let encoder = *self;
        tokio::task::spawn_blocking(move || encoder.encode_jpeg(&image))
            .await
            .map_err(|e| AppError::ExportFailed(format!("Encoding task error: {}", e)))?
    }
}

impl Default for PhotoEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Composite over white and drop the alpha channel
fn flatten_alpha(image: &RgbaImage) -> RgbImage {
    ImageBuffer::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        if a == 255 {
            return Rgb([r, g, b]);
        }
        let alpha = a as f32 / 255.0;
        let blend = |c: u8| (c as f32 * alpha + 255.0 * (1.0 - alpha)).round() as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}
