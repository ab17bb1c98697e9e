// SPDX-License-Identifier: GPL-3.0-only

//! Booth state, messages and commands

use crate::errors::AppError;
use crate::storage::Photo;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Pixel filter baked into a photo at capture time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    /// No filter applied
    #[default]
    Normal,
    /// Channel average
    Grayscale,
    /// Classic sepia matrix
    Sepia,
    /// Negative
    Invert,
    /// Gaussian blur
    Blur,
    /// Faded warm color matrix
    Vintage,
    /// High contrast black & white
    Noir,
    /// Blue channel only, boosted
    Blueprint,
    /// Four tinted quadrants
    PopArt,
}

/// Grouping used when presenting filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterCategory {
    Basic,
    Advanced,
}

impl FilterType {
    /// All filters in presentation order
    pub const ALL: [FilterType; 9] = [
        FilterType::Normal,
        FilterType::Grayscale,
        FilterType::Sepia,
        FilterType::Invert,
        FilterType::Blur,
        FilterType::Vintage,
        FilterType::Noir,
        FilterType::Blueprint,
        FilterType::PopArt,
    ];

    /// Stable lowercase identifier
    pub fn id(&self) -> &'static str {
        match self {
            FilterType::Normal => "normal",
            FilterType::Grayscale => "grayscale",
            FilterType::Sepia => "sepia",
            FilterType::Invert => "invert",
            FilterType::Blur => "blur",
            FilterType::Vintage => "vintage",
            FilterType::Noir => "noir",
            FilterType::Blueprint => "blueprint",
            FilterType::PopArt => "popart",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            FilterType::Normal => "Normal",
            FilterType::Grayscale => "Grayscale",
            FilterType::Sepia => "Sepia",
            FilterType::Invert => "Invert",
            FilterType::Blur => "Blur",
            FilterType::Vintage => "Vintage",
            FilterType::Noir => "Film Noir",
            FilterType::Blueprint => "Blueprint",
            FilterType::PopArt => "Pop Art",
        }
    }

    pub fn category(&self) -> FilterCategory {
        match self {
            FilterType::Normal
            | FilterType::Grayscale
            | FilterType::Sepia
            | FilterType::Invert
            | FilterType::Blur => FilterCategory::Basic,
            FilterType::Vintage | FilterType::Noir | FilterType::Blueprint | FilterType::PopArt => {
                FilterCategory::Advanced
            }
        }
    }

    /// Next filter, wrapping around
    pub fn next(self) -> Self {
        let pos = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(pos + 1) % Self::ALL.len()]
    }

    /// Previous filter, wrapping around
    pub fn previous(self) -> Self {
        let pos = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(pos + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl std::fmt::Display for FilterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for FilterType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.id() == wanted)
            .ok_or_else(|| format!("unknown filter '{}'", s))
    }
}

/// Composite layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StripTemplate {
    /// Single column on white
    #[default]
    Classic,
    /// 2x2 grid on a soft gradient
    Modern,
    /// Aged paper with sepia photos
    Vintage,
    /// Instant-film frames with captions
    Polaroid,
}

impl StripTemplate {
    pub const ALL: [StripTemplate; 4] = [
        StripTemplate::Classic,
        StripTemplate::Modern,
        StripTemplate::Vintage,
        StripTemplate::Polaroid,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            StripTemplate::Classic => "classic",
            StripTemplate::Modern => "modern",
            StripTemplate::Vintage => "vintage",
            StripTemplate::Polaroid => "polaroid",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            StripTemplate::Classic => "Classic",
            StripTemplate::Modern => "Modern",
            StripTemplate::Vintage => "Vintage",
            StripTemplate::Polaroid => "Polaroid",
        }
    }

    /// Next template, wrapping around
    pub fn next(self) -> Self {
        let pos = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(pos + 1) % Self::ALL.len()]
    }
}

impl std::fmt::Display for StripTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for StripTemplate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.id() == wanted)
            .ok_or_else(|| format!("unknown template '{}'", s))
    }
}

/// Capture sequencer state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    /// Seconds left before the shot
    Countdown(u8),
    Capturing,
    /// Pause after a shot before the next countdown
    Cooldown,
}

impl CaptureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, CaptureState::Idle)
    }
}

impl std::fmt::Display for CaptureState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureState::Idle => write!(f, "Idle"),
            CaptureState::Countdown(n) => write!(f, "Countdown({})", n),
            CaptureState::Capturing => write!(f, "Capturing"),
            CaptureState::Cooldown => write!(f, "Cooldown"),
        }
    }
}

/// Sequencer bookkeeping, owned by the booth
#[derive(Debug, Clone, Default)]
pub struct CaptureSession {
    pub state: CaptureState,
    /// Photo index being retaken
    pub retake_index: Option<usize>,
    /// One manual shot, no automatic continuation
    pub single_shot: bool,
    /// Bumped on every abort; timers from older epochs are ignored
    pub epoch: u64,
    /// When the last photo landed, for the manual trigger guard
    pub last_capture: Option<tokio::time::Instant>,
}

impl CaptureSession {
    /// Drop back to idle and invalidate pending timers
    pub fn abort(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        self.state = CaptureState::Idle;
        self.retake_index = None;
        self.single_shot = false;
    }
}

/// Camera availability as seen by the booth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraStatus {
    #[default]
    Off,
    Starting,
    Ready,
    Unavailable,
}

/// Which screen the presentation layer should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Camera,
    Strip,
}

/// User-adjustable settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoothSettings {
    pub filter: FilterType,
    pub template: StripTemplate,
    pub sound_enabled: bool,
    pub manual_mode: bool,
    pub mirror_preview: bool,
}

impl Default for BoothSettings {
    fn default() -> Self {
        Self {
            filter: FilterType::default(),
            template: StripTemplate::default(),
            sound_enabled: true,
            manual_mode: false,
            mirror_preview: true,
        }
    }
}

/// Inputs to [`PhotoBooth::update`](super::PhotoBooth::update)
///
/// - **Presentation calls**: what a user can ask for
/// - **Completions**: results of work the booth scheduled
#[derive(Debug, Clone)]
pub enum Message {
    // ===== Presentation calls =====
    /// Start a full automatic sequence
    StartSequence,
    /// Keyboard shortcut: full sequence, or one shot in manual mode
    TriggerCapture,
    /// Turn the camera on or off
    ToggleCamera,
    ToggleSound,
    ToggleManualMode,
    SelectFilter(FilterType),
    SelectTemplate(StripTemplate),
    /// Retake the photo at an index
    Retake(usize),
    /// Delete the photo at an index
    DeletePhoto(usize),
    /// Clear the strip
    Reset,
    /// Render and save the strip
    Download(StripTemplate),

    // ===== Completions =====
    /// Camera activation finished
    CameraActivated(Result<(), AppError>),
    /// The source stopped delivering frames
    CameraLost(String),
    /// One countdown second elapsed
    CountdownTick { epoch: u64 },
    /// Post-capture pause elapsed
    CooldownElapsed { epoch: u64 },
    /// Strip export finished
    ExportFinished(Result<PathBuf, AppError>),
}

/// Work the runtime performs on the booth's behalf
#[derive(Debug)]
pub enum Command {
    None,
    /// Deliver `message` after `after`
    Delay { after: Duration, message: Message },
    /// Activate the camera off the loop, answer with `CameraActivated`
    ActivateCamera,
    /// Render and save the strip, answer with `ExportFinished`
    Export {
        photos: Vec<Photo>,
        template: StripTemplate,
    },
    Batch(Vec<Command>),
}

impl Command {
    pub fn none() -> Self {
        Command::None
    }

    pub fn delay(after: Duration, message: Message) -> Self {
        Command::Delay { after, message }
    }

    /// Combine commands, dropping empty ones
    pub fn batch(commands: impl IntoIterator<Item = Command>) -> Self {
        let mut commands: Vec<Command> = commands
            .into_iter()
            .filter(|c| !matches!(c, Command::None))
            .collect();
        match commands.len() {
            0 => Command::None,
            1 => commands.remove(0),
            _ => Command::Batch(commands),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Command::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_ids_roundtrip() {
        for filter in FilterType::ALL {
            assert_eq!(filter.id().parse::<FilterType>().unwrap(), filter);
            let json = serde_json::to_string(&filter).unwrap();
            assert_eq!(json, format!("\"{}\"", filter.id()));
        }
        assert_eq!("PopArt".parse::<FilterType>().unwrap(), FilterType::PopArt);
        assert!("sparkle".parse::<FilterType>().is_err());
    }

    #[test]
    fn test_filter_cycle_wraps() {
        assert_eq!(FilterType::PopArt.next(), FilterType::Normal);
        assert_eq!(FilterType::Normal.previous(), FilterType::PopArt);
        assert_eq!(FilterType::Noir.display_name(), "Film Noir");
        assert_eq!(FilterType::Blur.category(), FilterCategory::Basic);
        assert_eq!(FilterType::Vintage.category(), FilterCategory::Advanced);
    }

    #[test]
    fn test_template_ids() {
        assert_eq!(StripTemplate::Polaroid.next(), StripTemplate::Classic);
        assert_eq!(
            "modern".parse::<StripTemplate>().unwrap(),
            StripTemplate::Modern
        );
    }

    #[test]
    fn test_batch_flattens() {
        assert!(Command::batch([Command::none(), Command::none()]).is_none());
        assert!(matches!(
            Command::batch([Command::none(), Command::ActivateCamera]),
            Command::ActivateCamera
        ));
    }

    #[test]
    fn test_abort_bumps_epoch() {
        let mut session = CaptureSession {
            state: CaptureState::Countdown(2),
            retake_index: Some(1),
            ..Default::default()
        };
        session.abort();
        assert_eq!(session.epoch, 1);
        assert_eq!(session.state, CaptureState::Idle);
        assert_eq!(session.retake_index, None);
    }
}
