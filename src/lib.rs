// SPDX-License-Identifier: MPL-2.0

//! Photobooth - capture four photos, compose them into a strip, save it
//!
//! This library provides the core of a virtual photo booth: a timed
//! multi-shot capture sequence against a live camera, per-pixel filters baked
//! in at capture time, and compositing of the four photos into a decorated
//! strip exported as JPEG.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Session context, capture sequencer and event loop
//! - [`backends`]: Camera backend abstraction (V4L2, image files, test pattern)
//! - [`pipelines`]: Filters, JPEG encoding and strip compositing
//! - [`storage`]: Persisted photo set and preferences
//! - [`config`]: User configuration handling
//! - [`terminal`]: Interactive booth rendered in the terminal
//!
//! # Example
//!
//! ```ignore
//! let camera = CameraBackendManager::new(&config.camera_source());
//! let store = Arc::new(FileStore::new(config.resolved_data_dir()));
//! let (booth, events) = PhotoBooth::new(camera, store, BoothSettings::from_config(&config));
//! let mut runtime = BoothRuntime::new(booth, StripRenderer::new(), config.resolved_output_dir());
//! runtime.start();
//! runtime.dispatch(Message::StartSequence);
//! runtime.settle().await;
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod pipelines;
pub mod storage;
pub mod terminal;

// Re-export commonly used types
pub use app::{BoothRuntime, FilterType, Message, PhotoBooth, StripTemplate};
pub use config::Config;
pub use errors::{AppError, AppResult};
