// SPDX-License-Identifier: GPL-3.0-only

//! Settings handlers: filter, template, sound and capture mode

use crate::app::PhotoBooth;
use crate::app::state::{Command, FilterType, StripTemplate};
use tracing::{debug, info, warn};

impl PhotoBooth {
    /// Takes effect at the next capture; stored photos keep their filter
    pub(crate) fn handle_select_filter(&mut self, filter: FilterType) -> Command {
        debug!(%filter, "Filter selected");
        self.settings.filter = filter;
        Command::none()
    }

    pub(crate) fn handle_select_template(&mut self, template: StripTemplate) -> Command {
        debug!(%template, "Template selected");
        self.settings.template = template;
        Command::none()
    }

    pub(crate) fn handle_toggle_sound(&mut self) -> Command {
        self.settings.sound_enabled = !self.settings.sound_enabled;
        info!(enabled = self.settings.sound_enabled, "Sound toggled");
        if let Err(e) = self
            .preferences
            .set_sound_enabled(self.settings.sound_enabled)
        {
            warn!(error = %e, "Failed to save sound preference");
        }
        Command::none()
    }

    /// A running automatic sequence stops after its current shot
    pub(crate) fn handle_toggle_manual_mode(&mut self) -> Command {
        self.settings.manual_mode = !self.settings.manual_mode;
        info!(manual = self.settings.manual_mode, "Capture mode toggled");
        Command::none()
    }
}
