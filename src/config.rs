// SPDX-License-Identifier: GPL-3.0-only

//! Persistent user configuration
//!
//! Stored as pretty-printed JSON at `<config dir>/photobooth/config.json`.
//! Missing fields take their defaults, so older files keep loading after new
//! settings are added.

use crate::app::{FilterType, StripTemplate};
use crate::backends::camera::{CameraBackendType, CameraSource};
use crate::constants::{formats, product};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Camera backend to use (v4l2, file or pattern)
    pub backend: CameraBackendType,
    /// V4L2 device node
    pub device_path: PathBuf,
    /// Image file or directory for the file backend
    pub source_path: Option<PathBuf>,
    /// Requested capture width
    pub capture_width: u32,
    /// Requested capture height
    pub capture_height: u32,
    /// Mirror camera preview horizontally (selfie mode)
    pub mirror_preview: bool,
    /// Filter selected at startup
    pub default_filter: FilterType,
    /// Template selected at startup
    pub default_template: StripTemplate,
    /// Start in manual capture mode
    pub manual_capture: bool,
    /// Where exported strips go (defaults to the download directory)
    pub output_dir: Option<PathBuf>,
    /// Where the photo set and preferences are kept
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: CameraBackendType::default(),
            device_path: PathBuf::from(formats::DEFAULT_V4L2_DEVICE),
            source_path: None,
            capture_width: formats::DEFAULT_CAPTURE_WIDTH,
            capture_height: formats::DEFAULT_CAPTURE_HEIGHT,
            mirror_preview: true, // Default to mirrored (selfie mode)
            default_filter: FilterType::default(),
            default_template: StripTemplate::default(),
            manual_capture: false,
            output_dir: None,
            data_dir: None,
        }
    }
}

impl Config {
    /// Load the user's configuration, falling back to defaults
    ///
    /// A missing file is normal on first run. An unreadable one is logged and
    /// ignored rather than preventing startup.
    pub fn load() -> Self {
        let path = match Self::config_path() {
            Ok(path) => path,
            Err(err) => {
                warn!(error = %err, "No configuration directory, using defaults");
                return Self::default();
            }
        };

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Ignoring unreadable configuration");
                Self::default()
            }
        }
    }

    /// Load from an explicit path; a missing file yields the defaults
    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No configuration file");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save to the user's configuration file
    pub fn save(&self) -> AppResult<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save to an explicit path, creating parent directories
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> AppResult<PathBuf> {
        let base = dirs::config_dir()
            .ok_or_else(|| AppError::Config("Configuration directory not found".into()))?;
        Ok(base.join(product::ID).join("config.json"))
    }

    /// Directory receiving exported strips
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .or_else(dirs::download_dir)
            .or_else(dirs::picture_dir)
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Directory holding the persisted photo set and preferences
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(product::ID)
        })
    }

    /// Frame source described by this configuration
    pub fn camera_source(&self) -> CameraSource {
        match self.backend {
            CameraBackendType::V4l2 => CameraSource::V4l2 {
                device: self.device_path.clone(),
                width: self.capture_width,
                height: self.capture_height,
            },
            CameraBackendType::File => match &self.source_path {
                Some(path) => CameraSource::File(path.clone()),
                None => {
                    warn!("File backend selected without a source path, using test pattern");
                    self.pattern_source()
                }
            },
            CameraBackendType::Pattern => self.pattern_source(),
        }
    }

    fn pattern_source(&self) -> CameraSource {
        CameraSource::Pattern {
            width: self.capture_width,
            height: self.capture_height,
        }
    }
}
