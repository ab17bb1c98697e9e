// SPDX-License-Identifier: MPL-2.0

//! Photo booth session
//!
//! This module contains the session state, message handling, and the event
//! loop that drives timers, camera activation and strip export.
//!
//! # Architecture
//!
//! - `state`: Session state types (Message, Command, CaptureState, etc.)
//! - `update`: Message dispatch
//! - `handlers`: Message handlers grouped by domain
//! - `notifications`: Events published to the presentation layer
//! - `runtime`: Executes commands and feeds results back as messages
//!
//! # Main Types
//!
//! - [`PhotoBooth`]: Session context owning the camera, photo set and sequencer
//! - [`Message`]: All user interactions and system events
//! - [`Command`]: Deferred work requested by a handler
//!
//! `PhotoBooth` is only mutated through [`PhotoBooth::update`]. Anything that
//! waits (timers, camera start, rendering) is described as a [`Command`] and
//! executed by [`BoothRuntime`], which reports back with another message.

mod handlers;
pub mod notifications;
pub mod runtime;
mod state;
mod update;

pub use notifications::{BoothEvent, Cue, Notification, NotificationKind};
pub use runtime::BoothRuntime;
pub use state::{
    BoothSettings, CameraStatus, CaptureSession, CaptureState, Command, FilterCategory,
    FilterType, Message, StripTemplate, View,
};

use crate::backends::camera::CameraBackendManager;
use crate::config::Config;
use crate::pipelines::photo::PhotoPipeline;
use crate::storage::{KeyValueStore, Photo, PhotoStore, Preferences};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

impl BoothSettings {
    /// Startup settings from the user configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            filter: config.default_filter,
            template: config.default_template,
            manual_mode: config.manual_capture,
            mirror_preview: config.mirror_preview,
            ..Self::default()
        }
    }
}

/// Session context for one booth
pub struct PhotoBooth {
    pub(crate) camera: CameraBackendManager,
    pub(crate) photos: PhotoStore,
    pub(crate) preferences: Preferences,
    pub(crate) pipeline: PhotoPipeline,
    pub(crate) session: CaptureSession,
    pub(crate) camera_status: CameraStatus,
    /// Toast on the next successful activation (user toggles only)
    pub(crate) announce_camera: bool,
    pub(crate) settings: BoothSettings,
    pub(crate) view: View,
    events: mpsc::UnboundedSender<BoothEvent>,
}

impl PhotoBooth {
    /// Create a booth and restore any saved photos
    ///
    /// The sound preference stored in `store` overrides `settings`. A corrupt
    /// saved photo set is discarded and the booth starts empty.
    pub fn new(
        camera: CameraBackendManager,
        store: Arc<dyn KeyValueStore>,
        mut settings: BoothSettings,
    ) -> (Self, mpsc::UnboundedReceiver<BoothEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();

        let mut photos = PhotoStore::new(Arc::clone(&store));
        match photos.restore() {
            Ok(count) => debug!(count, "Restored saved photos"),
            Err(e) => warn!(error = %e, "Starting with an empty photo strip"),
        }

        let preferences = Preferences::new(store);
        settings.sound_enabled = preferences.sound_enabled();

        let view = if photos.is_full() {
            View::Strip
        } else {
            View::Camera
        };

        info!(
            backend = %camera.backend_type(),
            photos = photos.len(),
            filter = %settings.filter,
            template = %settings.template,
            "Photo booth ready"
        );

        let booth = Self {
            camera,
            photos,
            preferences,
            pipeline: PhotoPipeline::new(),
            session: CaptureSession::default(),
            camera_status: CameraStatus::Off,
            announce_camera: false,
            settings,
            view,
            events,
        };
        (booth, receiver)
    }

    /// Turn the camera on without a toast, as done when the booth opens
    pub fn start(&mut self) -> Command {
        if self.camera_status != CameraStatus::Off {
            return Command::none();
        }
        self.camera_status = CameraStatus::Starting;
        Command::ActivateCamera
    }

    pub fn photos(&self) -> &[Photo] {
        self.photos.photos()
    }

    pub fn photo_count(&self) -> usize {
        self.photos.len()
    }

    pub fn capture_state(&self) -> CaptureState {
        self.session.state
    }

    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    pub fn camera_status(&self) -> CameraStatus {
        self.camera_status
    }

    pub fn settings(&self) -> &BoothSettings {
        &self.settings
    }

    pub fn view(&self) -> View {
        self.view
    }

    /// Camera shared with the preview and the runtime
    pub fn camera(&self) -> &CameraBackendManager {
        &self.camera
    }

    pub(crate) fn emit(&self, event: BoothEvent) {
        // Nobody listening is fine
        let _ = self.events.send(event);
    }

    pub(crate) fn notify(&self, notification: Notification) {
        debug!(title = %notification.title, "Notification");
        self.emit(BoothEvent::Notify(notification));
    }

    pub(crate) fn cue(&self, cue: Cue) {
        self.emit(BoothEvent::Cue(cue));
    }

    /// Play a sound cue if sound is on
    pub(crate) fn sound(&self, cue: Cue) {
        if self.settings.sound_enabled {
            self.cue(cue);
        }
    }

    pub(crate) fn set_capture_state(&mut self, state: CaptureState) {
        if self.session.state != state {
            debug!(from = %self.session.state, to = %state, "Capture state");
        }
        self.session.state = state;
        self.emit(BoothEvent::StateChanged(state));
    }

    pub(crate) fn set_view(&mut self, view: View) {
        if self.view != view {
            self.view = view;
            self.emit(BoothEvent::ViewChanged(view));
        }
    }

    /// Write the photo set through; failures are logged and the session goes on
    pub(crate) fn persist_photos(&self) {
        if let Err(e) = self.photos.persist() {
            warn!(error = %e, "Failed to save photos");
        }
    }
}

impl std::fmt::Debug for PhotoBooth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoBooth")
            .field("camera_status", &self.camera_status)
            .field("session", &self.session)
            .field("photos", &self.photos.len())
            .field("settings", &self.settings)
            .field("view", &self.view)
            .finish_non_exhaustive()
    }
}
