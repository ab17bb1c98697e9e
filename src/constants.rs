// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Product identity used in file names, storage keys and the strip title
pub mod product {
    /// Lowercase product id (file name prefix, storage key prefix)
    pub const ID: &str = "photobooth";

    /// Title drawn at the top of every strip
    pub const STRIP_TITLE: &str = "PHOTOBOOTH MEMORIES";
}

/// Photo set limits
pub mod strip {
    /// Number of photos in a complete strip
    pub const PHOTOS_PER_STRIP: usize = 4;
}

/// Capture sequencer timing
pub mod timing {
    use super::Duration;

    /// Countdown start value (seconds shown before each capture)
    pub const COUNTDOWN_START: u8 = 3;

    /// Interval between countdown ticks
    pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

    /// Pause after a capture (processing + flash) before the next countdown
    pub const CAPTURE_COOLDOWN: Duration = Duration::from_millis(1200);

    /// Minimum spacing between two manual triggers
    pub const MANUAL_TRIGGER_GUARD: Duration = Duration::from_millis(1500);

    /// How long camera activation may wait for the first frame
    pub const CAMERA_START_TIMEOUT: Duration = Duration::from_secs(5);
}

/// Keys for the persisted key-value entries
pub mod storage_keys {
    /// JSON array of data-URI encoded photos
    pub const PHOTOS: &str = "photobooth-photos";

    /// Sound preference, "true" or "false"
    pub const SOUND: &str = "photobooth-sound";
}

/// Encoding settings
pub mod encoding {
    /// JPEG quality for captured photos
    pub const CAPTURE_JPEG_QUALITY: u8 = 92;

    /// JPEG quality for exported strips
    pub const EXPORT_JPEG_QUALITY: u8 = 100;

    /// MIME type of captured photos
    pub const CAPTURE_MIME: &str = "image/jpeg";
}

/// Filter parameters
pub mod filters {
    /// Gaussian sigma for the blur filter, in pixels
    pub const BLUR_SIGMA: f32 = 5.0;

    /// Contrast multiplier of the noir filter
    pub const NOIR_CONTRAST: f32 = 1.5;
}

/// Default capture resolution requested from V4L2 devices
pub mod formats {
    /// Preferred capture width
    pub const DEFAULT_CAPTURE_WIDTH: u32 = 1280;

    /// Preferred capture height
    pub const DEFAULT_CAPTURE_HEIGHT: u32 = 720;

    /// Number of mmap buffers for the V4L2 stream
    pub const V4L2_BUFFER_COUNT: u32 = 4;

    /// Default V4L2 device
    pub const DEFAULT_V4L2_DEVICE: &str = "/dev/video0";
}

/// Supported still image extensions for the file source
pub mod file_formats {
    /// Image file extensions
    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

    /// Check if extension is a supported image format
    pub fn is_image_extension(ext: &str) -> bool {
        IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    }
}

/// Application information utilities
pub mod app_info {
    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_fits_cooldown_guard() {
        // The manual guard must outlast the cooldown so one key press cannot
        // queue a second capture right after the first one lands
        assert!(timing::MANUAL_TRIGGER_GUARD > timing::CAPTURE_COOLDOWN);
    }

    #[test]
    fn test_image_extensions() {
        assert!(file_formats::is_image_extension("JPG"));
        assert!(file_formats::is_image_extension("png"));
        assert!(!file_formats::is_image_extension("mp4"));
    }
}
