// SPDX-License-Identifier: GPL-3.0-only

//! Events emitted by the booth for the presentation layer
//!
//! The core never draws anything. Toasts, sounds, the flash overlay and view
//! switches are all published as [`BoothEvent`]s and left to whoever listens.

use super::state::{CaptureState, View};
use crate::constants::strip::PHOTOS_PER_STRIP;
use crate::errors::AppError;
use std::path::Path;

/// Something the presentation layer may want to show or play
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoothEvent {
    Notify(Notification),
    StateChanged(CaptureState),
    Cue(Cue),
    ViewChanged(View),
}

/// Audible and visual effects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// One per countdown tick
    Beep,
    Shutter,
    Flash,
    /// Strip completed
    Confetti,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    SequenceStarted,
    PhotoCaptured,
    StripCompleted,
    RetakeStarted,
    PhotoDeleted,
    PhotosCleared,
    CameraActivated,
    CameraDeactivated,
    CameraError,
    NotEnoughPhotos,
    DownloadStarted,
    DownloadSucceeded,
    DownloadFailed,
}

impl NotificationKind {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            NotificationKind::CameraError
                | NotificationKind::NotEnoughPhotos
                | NotificationKind::DownloadFailed
        )
    }
}

/// Toast with a title and a description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
}

impl Notification {
    fn new(kind: NotificationKind, title: &str, description: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.to_string(),
            description: description.into(),
        }
    }

    pub fn sequence_started() -> Self {
        Self::new(
            NotificationKind::SequenceStarted,
            "Get ready!",
            "Taking photos in sequence...",
        )
    }

    /// `index` is zero-based
    pub fn photo_captured(index: usize) -> Self {
        Self::new(
            NotificationKind::PhotoCaptured,
            "Photo captured",
            format!("Photo {} of {} saved.", index + 1, PHOTOS_PER_STRIP),
        )
    }

    pub fn strip_completed() -> Self {
        Self::new(
            NotificationKind::StripCompleted,
            "Photo strip complete!",
            format!(
                "All {} photos captured. View your photo strip!",
                PHOTOS_PER_STRIP
            ),
        )
    }

    pub fn retake_started(index: usize) -> Self {
        Self::new(
            NotificationKind::RetakeStarted,
            "Retaking photo",
            format!("Retaking photo {}. Get ready!", index + 1),
        )
    }

    pub fn photo_deleted(index: usize) -> Self {
        Self::new(
            NotificationKind::PhotoDeleted,
            "Photo deleted",
            format!("Photo {} removed from your strip.", index + 1),
        )
    }

    pub fn photos_cleared() -> Self {
        Self::new(
            NotificationKind::PhotosCleared,
            "Photos cleared",
            "Your photo strip has been reset.",
        )
    }

    pub fn camera_activated() -> Self {
        Self::new(
            NotificationKind::CameraActivated,
            "Camera activated",
            "Camera is now turned on.",
        )
    }

    pub fn camera_deactivated() -> Self {
        Self::new(
            NotificationKind::CameraDeactivated,
            "Camera deactivated",
            "Camera is now turned off.",
        )
    }

    pub fn camera_error() -> Self {
        Self::new(
            NotificationKind::CameraError,
            "Camera Error",
            "Could not access your camera. Please check permissions.",
        )
    }

    pub fn download_started() -> Self {
        Self::new(
            NotificationKind::DownloadStarted,
            "Download started",
            "Your photo strip is being downloaded.",
        )
    }

    pub fn download_succeeded(path: &Path) -> Self {
        Self::new(
            NotificationKind::DownloadSucceeded,
            "Download complete",
            format!("Saved to {}", path.display()),
        )
    }

    /// Toast for a failed operation, worded after the error
    pub fn from_error(error: &AppError) -> Self {
        let kind = match error {
            AppError::CameraUnavailable(_) => return Self::camera_error(),
            AppError::InsufficientPhotos { .. } => NotificationKind::NotEnoughPhotos,
            _ => NotificationKind::DownloadFailed,
        };
        Self::new(kind, error.title(), error.to_string())
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_enough_photos_wording() {
        let n = Notification::from_error(&AppError::InsufficientPhotos { needed: 1 });
        assert_eq!(n.kind, NotificationKind::NotEnoughPhotos);
        assert_eq!(n.title, "Not enough photos");
        assert_eq!(n.description, "Take 1 more photo to complete your strip!");
        assert!(n.kind.is_error());
    }

    #[test]
    fn test_camera_errors_use_permission_copy() {
        let n = Notification::from_error(&AppError::CameraUnavailable("busy".into()));
        assert_eq!(n, Notification::camera_error());
    }

    #[test]
    fn test_positions_are_one_based() {
        assert_eq!(
            Notification::retake_started(2).description,
            "Retaking photo 3. Get ready!"
        );
        assert_eq!(
            Notification::photo_captured(0).description,
            "Photo 1 of 4 saved."
        );
    }
}
