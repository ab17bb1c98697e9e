// SPDX-License-Identifier: GPL-3.0-only

//! Capture sequencer handlers
//!
//! ```text
//!  Idle ──start──▶ Countdown(3) ──tick──▶ Countdown(2) ──tick──▶ Countdown(1)
//!   ▲                   ▲                                            │ tick
//!   │                   │ repeat                                     ▼
//!   └──── done ──── Cooldown ◀──────────── store photo ──────── Capturing
//! ```
//!
//! Every timer message carries the session epoch it was scheduled in. Aborting
//! bumps the epoch, so a tick that arrives after an abort is ignored.

use crate::app::notifications::{Cue, Notification};
use crate::app::state::{CameraStatus, CaptureState, Command, Message, View};
use crate::app::PhotoBooth;
use crate::constants::timing;
use crate::errors::AppError;
use tracing::{debug, info, warn};

impl PhotoBooth {
    // =========================================================================
    // Sequence Start
    // =========================================================================

    /// Whether a new countdown may begin right now
    fn can_begin(&self) -> bool {
        if self.camera_status != CameraStatus::Ready {
            debug!(status = ?self.camera_status, "Camera not ready, ignoring start");
            return false;
        }
        if !self.session.state.is_idle() {
            debug!(state = %self.session.state, "Sequence already running");
            return false;
        }
        true
    }

    /// A finished strip is cleared before the next one starts
    fn start_new_strip_if_full(&mut self) {
        if self.photos.is_full() {
            info!("Starting a new strip");
            self.photos.clear();
            self.persist_photos();
            self.set_view(View::Camera);
        }
    }

    pub(crate) fn handle_start_sequence(&mut self) -> Command {
        if !self.can_begin() {
            return Command::none();
        }
        self.start_new_strip_if_full();

        self.session.retake_index = None;
        self.session.single_shot = false;
        info!(existing = self.photos.len(), "Starting capture sequence");
        self.notify(Notification::sequence_started());
        self.begin_countdown()
    }

    /// Space bar: a full sequence in automatic mode, one shot in manual mode
    pub(crate) fn handle_trigger_capture(&mut self) -> Command {
        if !self.can_begin() {
            return Command::none();
        }
        if let Some(last) = self.session.last_capture
            && last.elapsed() < timing::MANUAL_TRIGGER_GUARD
        {
            debug!("Trigger too soon after the previous capture");
            return Command::none();
        }

        if !self.settings.manual_mode {
            return self.handle_start_sequence();
        }

        self.start_new_strip_if_full();
        self.session.retake_index = None;
        self.session.single_shot = true;
        info!(index = self.photos.len(), "Manual capture");
        self.begin_countdown()
    }

    pub(crate) fn handle_retake(&mut self, index: usize) -> Command {
        if index >= self.photos.len() {
            warn!(index, count = self.photos.len(), "No photo to retake");
            return Command::none();
        }
        if !self.can_begin() {
            return Command::none();
        }

        info!(index, "Retaking photo");
        self.session.retake_index = Some(index);
        self.session.single_shot = true;
        self.set_view(View::Camera);
        self.notify(Notification::retake_started(index));
        self.begin_countdown()
    }

    // =========================================================================
    // Countdown
    // =========================================================================

    fn begin_countdown(&mut self) -> Command {
        self.set_capture_state(CaptureState::Countdown(timing::COUNTDOWN_START));
        self.sound(Cue::Beep);
        self.schedule_tick()
    }

    fn schedule_tick(&self) -> Command {
        Command::delay(
            timing::COUNTDOWN_TICK,
            Message::CountdownTick {
                epoch: self.session.epoch,
            },
        )
    }

    pub(crate) fn handle_countdown_tick(&mut self, epoch: u64) -> Command {
        if epoch != self.session.epoch {
            debug!(epoch, current = self.session.epoch, "Stale countdown tick");
            return Command::none();
        }
        match self.session.state {
            CaptureState::Countdown(n) if n > 1 => {
                self.set_capture_state(CaptureState::Countdown(n - 1));
                self.sound(Cue::Beep);
                self.schedule_tick()
            }
            CaptureState::Countdown(_) => self.capture_photo(),
            state => {
                debug!(%state, "Countdown tick outside countdown");
                Command::none()
            }
        }
    }

    // =========================================================================
    // Capture
    // =========================================================================

    /// Grab, filter and store one photo, then cool down
    fn capture_photo(&mut self) -> Command {
        self.set_capture_state(CaptureState::Capturing);

        let frame = match self.camera.capture_frame() {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "Frame grab failed");
                return self.camera_failed(AppError::from(e));
            }
        };

        let photo = match self.pipeline.process(&frame, self.settings.filter) {
            Ok(photo) => photo,
            Err(e) => {
                warn!(error = %e, "Photo processing failed");
                self.abort_sequence();
                return Command::none();
            }
        };

        let stored = match self.session.retake_index {
            Some(index) => self
                .photos
                .replace_at(index, photo)
                .map(|()| (index, false)),
            None => self
                .photos
                .append(photo)
                .map(|outcome| (outcome.index, outcome.completed)),
        };

        let (index, completed) = match stored {
            Ok(stored) => stored,
            Err(e) => {
                // Set changed underneath the countdown (delete or reset)
                warn!(error = %e, "Captured photo has nowhere to go");
                self.abort_sequence();
                return Command::none();
            }
        };

        self.persist_photos();
        self.session.last_capture = Some(tokio::time::Instant::now());
        info!(index, filter = %self.settings.filter, "Photo captured");

        self.cue(Cue::Flash);
        self.sound(Cue::Shutter);
        self.notify(Notification::photo_captured(index));

        if completed {
            info!("Photo strip complete");
            self.cue(Cue::Confetti);
            self.notify(Notification::strip_completed());
            self.set_view(View::Strip);
        }

        self.set_capture_state(CaptureState::Cooldown);
        Command::delay(
            timing::CAPTURE_COOLDOWN,
            Message::CooldownElapsed {
                epoch: self.session.epoch,
            },
        )
    }

    pub(crate) fn handle_cooldown_elapsed(&mut self, epoch: u64) -> Command {
        if epoch != self.session.epoch || self.session.state != CaptureState::Cooldown {
            debug!(epoch, "Stale cooldown");
            return Command::none();
        }

        let continue_sequence = !self.settings.manual_mode
            && self.session.retake_index.is_none()
            && !self.session.single_shot
            && !self.photos.is_full();

        if continue_sequence {
            return self.begin_countdown();
        }

        if self.session.retake_index.is_some() && self.photos.is_full() {
            self.set_view(View::Strip);
        }
        self.session.retake_index = None;
        self.session.single_shot = false;
        self.set_capture_state(CaptureState::Idle);
        Command::none()
    }

    // =========================================================================
    // Cancellation
    // =========================================================================

    /// Drop whatever the sequencer was doing; photos are kept
    pub(crate) fn abort_sequence(&mut self) {
        let was_idle = self.session.state.is_idle();
        self.session.abort();
        if !was_idle {
            info!(epoch = self.session.epoch, "Capture sequence cancelled");
            self.set_capture_state(CaptureState::Idle);
        }
    }
}
