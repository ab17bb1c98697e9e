// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for headless booth sessions
//!
//! This module provides command-line functionality for:
//! - Capturing a strip and retaking single photos
//! - Managing the saved photo set
//! - Exporting strips
//! - Listing filters and templates

use photobooth::app::{
    BoothEvent, BoothRuntime, BoothSettings, CameraStatus, CaptureState, FilterCategory,
    Notification, PhotoBooth,
};
use photobooth::backends::camera::CameraBackendManager;
use photobooth::constants::strip::PHOTOS_PER_STRIP;
use photobooth::pipelines::strip::StripRenderer;
use photobooth::storage::{FileStore, KeyValueStore};
use photobooth::{Config, FilterType, Message, StripTemplate};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Booth over the saved photo set, driven by a fresh runtime
struct Session {
    runtime: BoothRuntime,
    events: UnboundedReceiver<BoothEvent>,
    /// Last failure reported through a notification
    failure: Option<Notification>,
}

impl Session {
    fn open(config: &Config, output: Option<PathBuf>) -> Self {
        let camera = CameraBackendManager::new(&config.camera_source());
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.resolved_data_dir()));
        let (booth, events) = PhotoBooth::new(camera, store, BoothSettings::from_config(config));

        let output_dir = output.unwrap_or_else(|| config.resolved_output_dir());
        let runtime = BoothRuntime::new(booth, StripRenderer::new(), output_dir);
        Self {
            runtime,
            events,
            failure: None,
        }
    }

    fn booth(&self) -> &PhotoBooth {
        self.runtime.booth()
    }

    fn send(&mut self, message: Message) {
        self.runtime.dispatch(message);
        self.report();
    }

    /// Run until nothing is pending, printing events as they come
    async fn settle(&mut self) {
        loop {
            self.report();
            if !self.runtime.next().await {
                break;
            }
        }
        self.report();
    }

    async fn start_camera(&mut self) -> CliResult {
        self.runtime.start();
        self.settle().await;
        if self.booth().camera_status() != CameraStatus::Ready {
            return Err("Camera unavailable".into());
        }
        println!("Camera: {}", self.booth().camera().backend_type());
        Ok(())
    }

    fn report(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                BoothEvent::Notify(notification) => {
                    println!("{}", notification);
                    if notification.kind.is_error() {
                        self.failure = Some(notification);
                    }
                }
                BoothEvent::StateChanged(CaptureState::Countdown(n)) => println!("  {}...", n),
                BoothEvent::StateChanged(_) | BoothEvent::Cue(_) | BoothEvent::ViewChanged(_) => {}
            }
        }
    }

    fn finish(mut self) -> CliResult {
        self.report();
        match self.failure.take() {
            Some(failure) => Err(failure.description.into()),
            None => Ok(()),
        }
    }
}

fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
}

/// Capture a full strip, optionally exporting it straight away
pub fn capture(
    config: &Config,
    filter: Option<FilterType>,
    template: Option<StripTemplate>,
    output: Option<PathBuf>,
) -> CliResult {
    runtime()?.block_on(async {
        let mut session = Session::open(config, output);
        session.start_camera().await?;

        if let Some(filter) = filter {
            session.send(Message::SelectFilter(filter));
        }
        if session.booth().settings().manual_mode {
            session.send(Message::ToggleManualMode);
        }
        info!(filter = %session.booth().settings().filter, "Headless capture");

        session.send(Message::StartSequence);
        session.settle().await;

        if let Some(template) = template {
            session.send(Message::Download(template));
            session.settle().await;
        }
        session.finish()
    })
}

/// Retake one photo (zero-based index)
pub fn retake(config: &Config, index: usize, filter: Option<FilterType>) -> CliResult {
    runtime()?.block_on(async {
        let mut session = Session::open(config, None);
        let count = session.booth().photo_count();
        if index >= count {
            return Err(format!("No photo at position {} (strip has {})", index + 1, count).into());
        }
        session.start_camera().await?;

        if let Some(filter) = filter {
            session.send(Message::SelectFilter(filter));
        }
        session.send(Message::Retake(index));
        session.settle().await;
        session.finish()
    })
}

pub fn delete(config: &Config, index: usize) -> CliResult {
    runtime()?.block_on(async {
        let mut session = Session::open(config, None);
        let count = session.booth().photo_count();
        if index >= count {
            return Err(format!("No photo at position {} (strip has {})", index + 1, count).into());
        }
        session.send(Message::DeletePhoto(index));
        session.finish()
    })
}

pub fn clear(config: &Config) -> CliResult {
    runtime()?.block_on(async {
        let mut session = Session::open(config, None);
        session.send(Message::Reset);
        session.finish()
    })
}

pub fn status(config: &Config) -> CliResult {
    runtime()?.block_on(async {
        let session = Session::open(config, None);
        let booth = session.booth();
        let settings = booth.settings();

        println!("Photos:   {}/{}", booth.photo_count(), PHOTOS_PER_STRIP);
        for (i, photo) in booth.photos().iter().enumerate() {
            println!("  [{}] {} ({} bytes)", i + 1, photo.mime(), photo.bytes().len());
        }
        println!("Camera:   {}", config.camera_source());
        println!("Filter:   {}", settings.filter.display_name());
        println!("Template: {}", settings.template.display_name());
        println!(
            "Capture:  {}",
            if settings.manual_mode {
                "manual"
            } else {
                "automatic"
            }
        );
        println!(
            "Sound:    {}",
            if settings.sound_enabled { "on" } else { "off" }
        );
        println!("Data:     {}", config.resolved_data_dir().display());
        println!("Output:   {}", config.resolved_output_dir().display());
        Ok(())
    })
}

/// Render and save the strip from the saved photos
pub fn export(config: &Config, template: StripTemplate, output: Option<PathBuf>) -> CliResult {
    runtime()?.block_on(async {
        let mut session = Session::open(config, output);
        session.send(Message::Download(template));
        session.settle().await;
        session.finish()
    })
}

pub fn list_filters() {
    for category in [FilterCategory::Basic, FilterCategory::Advanced] {
        println!(
            "{}:",
            match category {
                FilterCategory::Basic => "Basic",
                FilterCategory::Advanced => "Advanced",
            }
        );
        for filter in FilterType::ALL
            .into_iter()
            .filter(|f| f.category() == category)
        {
            println!("  {:<10} {}", filter.id(), filter.display_name());
        }
    }
}

pub fn list_templates() {
    for template in StripTemplate::ALL {
        println!("  {:<10} {}", template.id(), template.display_name());
    }
}
