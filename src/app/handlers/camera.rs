// SPDX-License-Identifier: GPL-3.0-only

//! Camera lifecycle handlers
//!
//! Activation runs off the event loop (opening a device can block), so the
//! handler only marks the camera as starting and asks the runtime to do it.

use crate::app::PhotoBooth;
use crate::app::notifications::Notification;
use crate::app::state::{CameraStatus, Command};
use crate::errors::AppError;
use tracing::{info, warn};

impl PhotoBooth {
    pub(crate) fn handle_toggle_camera(&mut self) -> Command {
        match self.camera_status {
            CameraStatus::Off | CameraStatus::Unavailable => {
                info!("Turning camera on");
                self.camera_status = CameraStatus::Starting;
                self.announce_camera = true;
                Command::ActivateCamera
            }
            CameraStatus::Ready => {
                info!("Turning camera off");
                self.abort_sequence();
                self.camera.deactivate();
                self.camera_status = CameraStatus::Off;
                self.notify(Notification::camera_deactivated());
                Command::none()
            }
            CameraStatus::Starting => Command::none(),
        }
    }

    pub(crate) fn handle_camera_activated(&mut self, result: Result<(), AppError>) -> Command {
        let announce = std::mem::take(&mut self.announce_camera);

        if self.camera_status != CameraStatus::Starting {
            // Turned off again while starting
            self.camera.deactivate();
            return Command::none();
        }

        match result {
            Ok(()) => {
                info!(backend = %self.camera.backend_type(), "Camera ready");
                self.camera_status = CameraStatus::Ready;
                if announce {
                    self.notify(Notification::camera_activated());
                }
                Command::none()
            }
            Err(e) => self.camera_failed(e),
        }
    }

    pub(crate) fn handle_camera_lost(&mut self, reason: String) -> Command {
        if self.camera_status != CameraStatus::Ready {
            return Command::none();
        }
        warn!(%reason, "Camera lost");
        self.camera_failed(AppError::CameraUnavailable(reason))
    }

    /// Any camera failure: stop the sequencer, release the device, tell the user
    pub(crate) fn camera_failed(&mut self, error: AppError) -> Command {
        warn!(error = %error, "Camera unavailable");
        self.abort_sequence();
        self.camera.deactivate();
        self.camera_status = CameraStatus::Unavailable;
        self.notify(Notification::camera_error());
        Command::none()
    }
}
