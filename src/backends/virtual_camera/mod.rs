// SPDX-License-Identifier: GPL-3.0-only

//! Virtual camera sources
//!
//! Backends that need no capture hardware. They let the booth run headless
//! (CLI sessions, tests) and give the terminal driver something to show on
//! machines without a webcam.
//!
//! - [`FileSource`]: still images from a file or a directory, one per capture
//! - [`TestPattern`]: a synthetic gradient that drifts over time

mod file_source;
mod test_pattern;

pub use file_source::{FileSource, load_image_as_frame};
pub use test_pattern::TestPattern;
