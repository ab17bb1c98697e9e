// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the photo booth
//!
//! Lower layers have their own error enums ([`BackendError`] for camera
//! backends, [`PhotoSetError`] for the photo set). Everything that reaches the
//! session context is folded into [`AppError`], which is cloneable so it can
//! travel inside messages.
//!
//! [`BackendError`]: crate::backends::camera::BackendError
//! [`PhotoSetError`]: crate::storage::PhotoSetError

use crate::backends::camera::BackendError;
use crate::storage::PhotoSetError;
use thiserror::Error;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AppError {
    /// Camera missing, permission denied, or device busy
    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),
    /// Camera went away while a countdown or capture was running
    #[error("Capture aborted: {0}")]
    CaptureAborted(String),
    /// Stored photo set or preference could not be read back
    #[error("Stored data is corrupt: {0}")]
    PersistenceCorrupt(String),
    /// Decoding, compositing, encoding or saving the strip failed
    #[error("Export failed: {0}")]
    ExportFailed(String),
    /// Strip requested before all four photos exist
    #[error("Take {needed} more photo{} to complete your strip!", plural_suffix(.needed))]
    InsufficientPhotos { needed: usize },
    /// Photo set index or capacity violation
    #[error(transparent)]
    PhotoSet(#[from] PhotoSetError),
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
    /// Key-value storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl AppError {
    /// Short user-facing title for notifications
    pub fn title(&self) -> &'static str {
        match self {
            AppError::CameraUnavailable(_) | AppError::CaptureAborted(_) => "Camera Error",
            AppError::PersistenceCorrupt(_) => "Saved photos discarded",
            AppError::ExportFailed(_) => "Download failed",
            AppError::InsufficientPhotos { .. } => "Not enough photos",
            AppError::PhotoSet(_) => "Photo not available",
            AppError::Config(_) => "Configuration error",
            AppError::Storage(_) => "Storage error",
        }
    }
}

fn plural_suffix(count: &usize) -> &'static str {
    if *count == 1 { "" } else { "s" }
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        AppError::CameraUnavailable(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_photos_message() {
        let err = AppError::InsufficientPhotos { needed: 2 };
        assert_eq!(err.to_string(), "Take 2 more photos to complete your strip!");

        let err = AppError::InsufficientPhotos { needed: 1 };
        assert_eq!(err.to_string(), "Take 1 more photo to complete your strip!");
    }

    #[test]
    fn test_backend_errors_map_to_camera_unavailable() {
        let err: AppError = BackendError::PermissionDenied("/dev/video0".into()).into();
        assert!(matches!(err, AppError::CameraUnavailable(_)));
        assert_eq!(err.title(), "Camera Error");
    }
}
