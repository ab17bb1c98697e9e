// SPDX-License-Identifier: GPL-3.0-only

//! Synthetic gradient source

use crate::backends::camera::CameraBackend;
use crate::backends::camera::types::{
    BackendError, BackendResult, CameraBackendType, CameraFrame,
};
use image::{Rgba, RgbaImage};
use std::time::Instant;
use tracing::info;

/// Diagonal color gradient that drifts one pixel every 20 ms
pub struct TestPattern {
    width: u32,
    height: u32,
    started: Option<Instant>,
}

impl TestPattern {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            started: None,
        }
    }

    fn render(&self, offset: u32) -> RgbaImage {
        let (w, h) = (self.width, self.height);
        let (span_x, span_y) = ((w - 1).max(1), (h - 1).max(1));
        RgbaImage::from_fn(w, h, |x, y| {
            let r = ((x + offset) % w * 255 / span_x) as u8;
            let g = (y * 255 / span_y) as u8;
            let b = (((x + y + offset) / 8) % 2 * 160 + 48) as u8;
            Rgba([r, g, b, 255])
        })
    }
}

impl CameraBackend for TestPattern {
    fn activate(&mut self) -> BackendResult<()> {
        if self.started.is_none() {
            info!(width = self.width, height = self.height, "Test pattern activated");
            self.started = Some(Instant::now());
        }
        Ok(())
    }

    fn deactivate(&mut self) -> BackendResult<()> {
        self.started = None;
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.started.is_some()
    }

    fn capture_frame(&self) -> BackendResult<CameraFrame> {
        let started = self.started.ok_or(BackendError::NotActive)?;
        let offset = (started.elapsed().as_millis() / 20) as u32 % self.width;
        Ok(CameraFrame::from_rgba_image(self.render(offset)))
    }

    fn backend_type(&self) -> CameraBackendType {
        CameraBackendType::Pattern
    }
}
