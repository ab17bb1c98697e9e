// SPDX-License-Identifier: GPL-3.0-only

//! Photo set handlers

use crate::app::PhotoBooth;
use crate::app::notifications::Notification;
use crate::app::state::{Command, View};
use tracing::{info, warn};

impl PhotoBooth {
    pub(crate) fn handle_delete_photo(&mut self, index: usize) -> Command {
        match self.photos.remove_at(index) {
            Ok(_) => {
                info!(index, remaining = self.photos.len(), "Photo deleted");
                self.retarget_retake(index);
                self.persist_photos();
                self.notify(Notification::photo_deleted(index));
                self.set_view(View::Camera);
            }
            Err(e) => warn!(error = %e, "Delete ignored"),
        }
        Command::none()
    }

    /// Keep a pending retake pointed at the same photo after `deleted` is gone
    fn retarget_retake(&mut self, deleted: usize) {
        let Some(target) = self.session.retake_index else {
            return;
        };
        if deleted == target {
            info!(index = target, "Photo being retaken was deleted");
            self.abort_sequence();
        } else if deleted < target {
            self.session.retake_index = Some(target - 1);
        }
    }

    pub(crate) fn handle_reset(&mut self) -> Command {
        self.abort_sequence();
        self.photos.clear();
        self.persist_photos();
        self.set_view(View::Camera);
        info!("Photo strip reset");
        self.notify(Notification::photos_cleared());
        Command::none()
    }
}
