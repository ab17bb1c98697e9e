// SPDX-License-Identifier: MPL-2.0

//! Backend abstraction layer for frame sources
//!
//! # Architecture
//!
//! The backend layer abstracts hardware access, providing a consistent API
//! regardless of where frames come from:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              Capture Sequencer               │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────┴────────────────────────┐
//! │              Backend Layer                   │
//! │  ┌──────────────────┐  ┌────────────────┐   │
//! │  │     Camera       │  │ Virtual Camera │   │
//! │  │     (V4L2)       │  │ (file/pattern) │   │
//! │  └──────────────────┘  └────────────────┘   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`camera`]: Backend trait, manager and the V4L2 webcam backend
//! - [`virtual_camera`]: Sources that need no hardware

pub mod camera;
pub mod virtual_camera;
