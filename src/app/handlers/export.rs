// SPDX-License-Identifier: GPL-3.0-only

//! Download handlers

use crate::app::PhotoBooth;
use crate::app::notifications::Notification;
use crate::app::state::{Command, StripTemplate};
use crate::constants::strip::PHOTOS_PER_STRIP;
use crate::errors::{AppError, AppResult};
use std::path::PathBuf;
use tracing::{error, info};

impl PhotoBooth {
    /// Check the set is complete and hand out what the export needs
    ///
    /// Rejects with [`AppError::InsufficientPhotos`] before anything is
    /// rendered.
    pub fn request_download(&mut self, template: StripTemplate) -> AppResult<Command> {
        let count = self.photos.len();
        if count < PHOTOS_PER_STRIP {
            return Err(AppError::InsufficientPhotos {
                needed: PHOTOS_PER_STRIP - count,
            });
        }

        info!(%template, "Download requested");
        self.settings.template = template;
        self.notify(Notification::download_started());
        Ok(Command::Export {
            photos: self.photos.photos().to_vec(),
            template,
        })
    }

    pub(crate) fn handle_download(&mut self, template: StripTemplate) -> Command {
        match self.request_download(template) {
            Ok(command) => command,
            Err(e) => {
                info!(error = %e, "Download rejected");
                self.notify(Notification::from_error(&e));
                Command::none()
            }
        }
    }

    pub(crate) fn handle_export_finished(&mut self, result: Result<PathBuf, AppError>) -> Command {
        match result {
            Ok(path) => self.notify(Notification::download_succeeded(&path)),
            Err(e) => {
                error!(error = %e, "Strip export failed");
                self.notify(Notification::from_error(&e));
            }
        }
        Command::none()
    }
}
