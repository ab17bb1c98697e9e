// SPDX-License-Identifier: MPL-2.0

//! Photo capture pipeline
//!
//! ```text
//! Camera Backend → Frame (RGBA) → Filter → JPEG encode → Photo
//! ```
//!
//! The whole pipeline runs synchronously at the moment the countdown ends,
//! so the photo reflects exactly the frame that was current then.

pub mod encoding;
pub mod filters;

pub use encoding::{EncodingQuality, PhotoEncoder};
pub use filters::apply_filter;

use crate::app::FilterType;
use crate::backends::camera::types::CameraFrame;
use crate::errors::{AppError, AppResult};
use crate::storage::Photo;
use tracing::debug;

/// Frame to stored photo
#[derive(Debug, Clone, Default)]
pub struct PhotoPipeline {
    encoder: PhotoEncoder,
}

impl PhotoPipeline {
    /// Create a new photo pipeline with default settings
    pub fn new() -> Self {
        Self {
            encoder: PhotoEncoder::new(),
        }
    }

    /// Filter and encode one frame
    pub fn process(&self, frame: &CameraFrame, filter: FilterType) -> AppResult<Photo> {
        let image = frame
            .to_rgba_image()
            .map_err(|e| AppError::CaptureAborted(e.to_string()))?;

        let filtered = apply_filter(&image, filter);
        let bytes = self
            .encoder
            .encode_jpeg(&filtered)
            .map_err(|e| AppError::CaptureAborted(e.to_string()))?;

        debug!(
            width = frame.width,
            height = frame.height,
            %filter,
            size = bytes.len(),
            "Photo processed"
        );
        Ok(Photo::jpeg(bytes))
    }
}
