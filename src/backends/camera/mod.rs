// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend abstraction
//!
//! ```text
//! ┌─────────────────────┐
//! │  Capture sequencer  │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │ CameraBackendManager│  ← Lifecycle, error mapping, shared access
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │  CameraBackend Trait│  ← Common interface
//! └──────────┬──────────┘
//!            │
//!       ┌────┴─────┬───────────┐
//!       ▼          ▼           ▼
//!    ┌─────┐  ┌──────────┐ ┌───────────┐
//!    │V4L2 │  │FileSource│ │TestPattern│
//!    └─────┘  └──────────┘ └───────────┘
//! ```

pub mod manager;
pub mod types;
pub mod v4l2;

pub use manager::CameraBackendManager;
pub use types::*;

use crate::backends::virtual_camera::{FileSource, TestPattern};

/// Camera backend trait
///
/// A backend owns one video source. The manager serializes access, so
/// implementations only need to be `Send`.
pub trait CameraBackend: Send {
    /// Request the device and start producing frames
    ///
    /// Calling this on an active backend is a no-op.
    fn activate(&mut self) -> BackendResult<()>;

    /// Release the device synchronously
    ///
    /// Calling this on an inactive backend is harmless.
    fn deactivate(&mut self) -> BackendResult<()>;

    /// Whether frames can currently be read
    fn is_active(&self) -> bool;

    /// Copy the most recent frame
    ///
    /// Returns `BackendError::NotActive` while the backend is off.
    fn capture_frame(&self) -> BackendResult<CameraFrame>;

    /// Get the backend type identifier
    fn backend_type(&self) -> CameraBackendType;
}

/// Build the backend serving a source
pub fn create_backend(source: &CameraSource) -> Box<dyn CameraBackend> {
    match source {
        CameraSource::V4l2 {
            device,
            width,
            height,
        } => Box::new(v4l2::V4l2Backend::new(device.clone(), *width, *height)),
        CameraSource::File(path) => Box::new(FileSource::new(path.clone())),
        CameraSource::Pattern { width, height } => Box::new(TestPattern::new(*width, *height)),
    }
}
