// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend lifecycle manager
//!
//! The manager provides:
//! - Backend lifecycle management (activation, release)
//! - Mapping of every activation failure onto `AppError::CameraUnavailable`
//! - Thread-safe backend access for blocking tasks

use super::types::*;
use super::{CameraBackend, create_backend};
use crate::errors::{AppError, AppResult};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

/// Internal manager state
struct ManagerState {
    /// The active backend instance
    backend: Box<dyn CameraBackend>,
    /// Backend type
    backend_type: CameraBackendType,
}

/// Camera backend manager
///
/// Thread-safe and can be shared across threads; clones share the backend.
#[derive(Clone)]
pub struct CameraBackendManager {
    state: Arc<Mutex<ManagerState>>,
}

impl CameraBackendManager {
    /// Create a manager for a source
    pub fn new(source: &CameraSource) -> Self {
        info!(backend = %source.backend_type(), source = %source, "Creating camera backend manager");
        Self::with_backend(create_backend(source))
    }

    /// Wrap an already constructed backend
    pub fn with_backend(backend: Box<dyn CameraBackend>) -> Self {
        let backend_type = backend.backend_type();
        Self {
            state: Arc::new(Mutex::new(ManagerState {
                backend,
                backend_type,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ManagerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get the backend type
    pub fn backend_type(&self) -> CameraBackendType {
        self.lock().backend_type
    }

    /// Request the camera
    ///
    /// Blocks until the device delivers its first frame or fails. The
    /// specific cause is logged; callers only see `CameraUnavailable`.
    pub fn activate(&self) -> AppResult<()> {
        let mut state = self.lock();
        info!(backend = %state.backend_type, "Activating camera");

        state.backend.activate().map_err(|err| {
            match &err {
                BackendError::PermissionDenied(msg) => {
                    warn!(reason = %msg, "Camera permission denied")
                }
                BackendError::DeviceNotFound(msg) => warn!(reason = %msg, "No camera device"),
                BackendError::DeviceBusy(msg) => warn!(reason = %msg, "Camera device busy"),
                other => warn!(error = %other, "Camera activation failed"),
            }
            AppError::from(err)
        })
    }

    /// Release the camera
    pub fn deactivate(&self) {
        info!("Deactivating camera");
        if let Err(err) = self.lock().backend.deactivate() {
            warn!(error = %err, "Camera did not shut down cleanly");
        }
    }

    /// Check if the camera is delivering frames
    pub fn is_active(&self) -> bool {
        self.lock().backend.is_active()
    }

    /// Copy the current frame
    pub fn capture_frame(&self) -> BackendResult<CameraFrame> {
        self.lock().backend.capture_frame()
    }
}

impl std::fmt::Debug for CameraBackendManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("CameraBackendManager")
            .field("backend_type", &state.backend_type)
            .field("active", &state.backend.is_active())
            .finish()
    }
}
