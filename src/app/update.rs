// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! The main `update()` function acts as a dispatcher, while specific handlers
//! are implemented in the `handlers` submodules organized by domain.
//!
//! # Handler Modules
//!
//! - `handlers::capture`: Sequence start, countdown, capture, cooldown, retake
//! - `handlers::camera`: Camera toggling, activation results, camera loss
//! - `handlers::photos`: Delete and reset
//! - `handlers::export`: Download requests and their results
//! - `handlers::system`: Filter, template, sound and manual mode

use crate::app::PhotoBooth;
use crate::app::state::{Command, Message};

impl PhotoBooth {
    /// Main message handler
    ///
    /// Returns the deferred work the message requires. Messages that do not
    /// apply in the current state are dropped and return [`Command::None`].
    pub fn update(&mut self, message: Message) -> Command {
        match message {
            // ===== Capture =====
            Message::StartSequence => self.handle_start_sequence(),
            Message::TriggerCapture => self.handle_trigger_capture(),
            Message::Retake(index) => self.handle_retake(index),
            Message::CountdownTick { epoch } => self.handle_countdown_tick(epoch),
            Message::CooldownElapsed { epoch } => self.handle_cooldown_elapsed(epoch),

            // ===== Camera =====
            Message::ToggleCamera => self.handle_toggle_camera(),
            Message::CameraActivated(result) => self.handle_camera_activated(result),
            Message::CameraLost(reason) => self.handle_camera_lost(reason),

            // ===== Photo Set =====
            Message::DeletePhoto(index) => self.handle_delete_photo(index),
            Message::Reset => self.handle_reset(),

            // ===== Export =====
            Message::Download(template) => self.handle_download(template),
            Message::ExportFinished(result) => self.handle_export_finished(result),

            // ===== Settings =====
            Message::SelectFilter(filter) => self.handle_select_filter(filter),
            Message::SelectTemplate(template) => self.handle_select_template(template),
            Message::ToggleSound => self.handle_toggle_sound(),
            Message::ToggleManualMode => self.handle_toggle_manual_mode(),
        }
    }
}
