// SPDX-License-Identifier: GPL-3.0-only

//! Persisted user preferences

use super::KeyValueStore;
use crate::constants::storage_keys;
use crate::errors::AppResult;
use std::sync::Arc;
use tracing::warn;

/// Sound preference stored as `"true"` / `"false"`
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Sound cues are on unless explicitly turned off
    pub fn sound_enabled(&self) -> bool {
        match self.store.get(storage_keys::SOUND) {
            Ok(None) => true,
            Ok(Some(value)) => match value.trim() {
                "true" => true,
                "false" => false,
                other => {
                    warn!(value = other, "Unreadable sound preference, using default");
                    true
                }
            },
            Err(err) => {
                warn!(error = %err, "Failed to read sound preference");
                true
            }
        }
    }

    pub fn set_sound_enabled(&self, enabled: bool) -> AppResult<()> {
        self.store
            .set(storage_keys::SOUND, if enabled { "true" } else { "false" })
    }
}
