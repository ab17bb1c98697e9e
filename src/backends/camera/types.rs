// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera backend abstraction

//! Shared types for camera backends

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Camera backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CameraBackendType {
    /// Video4Linux device (real webcam)
    #[default]
    V4l2,
    /// Still images from a file or directory
    File,
    /// Synthetic test pattern
    Pattern,
}

impl std::fmt::Display for CameraBackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraBackendType::V4l2 => write!(f, "V4L2"),
            CameraBackendType::File => write!(f, "file"),
            CameraBackendType::Pattern => write!(f, "test pattern"),
        }
    }
}

/// Where frames come from, with everything needed to open the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraSource {
    /// V4L2 device node with the requested capture size
    V4l2 {
        device: PathBuf,
        width: u32,
        height: u32,
    },
    /// Image file, or directory of images cycled per capture
    File(PathBuf),
    /// Generated gradient
    Pattern { width: u32, height: u32 },
}

impl CameraSource {
    /// Backend type serving this source
    pub fn backend_type(&self) -> CameraBackendType {
        match self {
            CameraSource::V4l2 { .. } => CameraBackendType::V4l2,
            CameraSource::File(_) => CameraBackendType::File,
            CameraSource::Pattern { .. } => CameraBackendType::Pattern,
        }
    }
}

impl std::fmt::Display for CameraSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraSource::V4l2 {
                device,
                width,
                height,
            } => write!(f, "{} ({}x{})", device.display(), width, height),
            CameraSource::File(path) => write!(f, "{}", path.display()),
            CameraSource::Pattern { width, height } => {
                write!(f, "test pattern ({}x{})", width, height)
            }
        }
    }
}

/// A single RGBA8 frame from the active source
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// RGBA pixels, `stride` bytes per row
    pub data: Arc<[u8]>,
    /// Row stride in bytes (may include padding)
    pub stride: u32,
    /// Timestamp when the frame was captured
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Wrap a decoded RGBA image as a frame
    pub fn from_rgba_image(image: RgbaImage) -> Self {
        let width = image.width();
        let height = image.height();
        Self {
            width,
            height,
            stride: width * 4,
            data: Arc::from(image.into_raw().into_boxed_slice()),
            captured_at: Instant::now(),
        }
    }

    /// Copy the frame into a tightly packed RGBA image, dropping row padding
    pub fn to_rgba_image(&self) -> BackendResult<RgbaImage> {
        let row_bytes = self.width as usize * 4;
        let stride = self.stride as usize;
        if stride < row_bytes || self.data.len() < stride * self.height as usize {
            return Err(BackendError::Other(format!(
                "Frame buffer too small: {} bytes for {}x{} (stride {})",
                self.data.len(),
                self.width,
                self.height,
                self.stride
            )));
        }

        let packed: Vec<u8> = if stride == row_bytes {
            self.data[..row_bytes * self.height as usize].to_vec()
        } else {
            self.data
                .chunks_exact(stride)
                .take(self.height as usize)
                .flat_map(|row| &row[..row_bytes])
                .copied()
                .collect()
        };

        RgbaImage::from_raw(self.width, self.height, packed)
            .ok_or_else(|| BackendError::Other("Frame dimensions do not match data".into()))
    }
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Error types for backend operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// User or system refused access to the device
    PermissionDenied(String),
    /// Camera device not found
    DeviceNotFound(String),
    /// Device held by another process
    DeviceBusy(String),
    /// Frame requested while the source is off
    NotActive,
    /// Format not supported
    FormatNotSupported(String),
    /// Other errors
    Other(String),
}

impl BackendError {
    /// Classify an I/O error from opening or streaming a device
    pub fn from_io(context: &str, err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => {
                BackendError::PermissionDenied(format!("{}: {}", context, err))
            }
            std::io::ErrorKind::NotFound => {
                BackendError::DeviceNotFound(format!("{}: {}", context, err))
            }
            std::io::ErrorKind::ResourceBusy => {
                BackendError::DeviceBusy(format!("{}: {}", context, err))
            }
            _ => BackendError::Other(format!("{}: {}", context, err)),
        }
    }
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
            BackendError::DeviceNotFound(msg) => write!(f, "Device not found: {}", msg),
            BackendError::DeviceBusy(msg) => write!(f, "Device busy: {}", msg),
            BackendError::NotActive => write!(f, "Camera is not active"),
            BackendError::FormatNotSupported(msg) => write!(f, "Format not supported: {}", msg),
            BackendError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_rgba_image_strips_padding() {
        // 2x2 frame, stride 12 (one padding pixel per row)
        let mut data = vec![0u8; 24];
        data[0..4].copy_from_slice(&[1, 2, 3, 255]);
        data[12..16].copy_from_slice(&[9, 8, 7, 255]);
        let frame = CameraFrame {
            width: 2,
            height: 2,
            data: Arc::from(data.into_boxed_slice()),
            stride: 12,
            captured_at: Instant::now(),
        };

        let image = frame.to_rgba_image().unwrap();
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.get_pixel(0, 0).0, [1, 2, 3, 255]);
        assert_eq!(image.get_pixel(0, 1).0, [9, 8, 7, 255]);
    }

    #[test]
    fn test_short_buffer_is_rejected() {
        let frame = CameraFrame {
            width: 4,
            height: 4,
            data: Arc::from(vec![0u8; 10].into_boxed_slice()),
            stride: 16,
            captured_at: Instant::now(),
        };
        assert!(frame.to_rgba_image().is_err());
    }

    #[test]
    fn test_io_error_classification() {
        let err = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        assert!(matches!(
            BackendError::from_io("/dev/video0", &err),
            BackendError::PermissionDenied(_)
        ));

        let err = std::io::Error::from(std::io::ErrorKind::NotFound);
        assert!(matches!(
            BackendError::from_io("/dev/video9", &err),
            BackendError::DeviceNotFound(_)
        ));
    }
}
