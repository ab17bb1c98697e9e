// SPDX-License-Identifier: GPL-3.0-only

//! Direct V4L2 webcam capture
//!
//! A capture thread owns the device and a memory-mapped stream. It decodes
//! each buffer (MJPEG or packed YUYV) into RGBA and keeps only the most
//! recent frame, which `capture_frame` copies out on demand.

use super::CameraBackend;
use super::types::*;
use crate::constants::{formats, timing};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use v4l::buffer::Type;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::{Format, FourCC};

/// Consecutive dequeue failures before the device is considered lost
const MAX_STREAM_ERRORS: u32 = 30;

/// Video4Linux webcam backend
pub struct V4l2Backend {
    device: PathBuf,
    width: u32,
    height: u32,
    running: Arc<AtomicBool>,
    latest_frame: Arc<Mutex<Option<CameraFrame>>>,
    thread_handle: Option<std::thread::JoinHandle<()>>,
}

impl V4l2Backend {
    pub fn new(device: PathBuf, width: u32, height: u32) -> Self {
        Self {
            device,
            width,
            height,
            running: Arc::new(AtomicBool::new(false)),
            latest_frame: Arc::new(Mutex::new(None)),
            thread_handle: None,
        }
    }

    fn stop_thread(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            match handle.join() {
                Ok(()) => debug!("V4L2 capture thread stopped"),
                Err(_) => warn!("V4L2 capture thread panicked"),
            }
        }
        *self
            .latest_frame
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl CameraBackend for V4l2Backend {
    fn activate(&mut self) -> BackendResult<()> {
        if self.is_active() {
            return Ok(());
        }
        // A previous thread may have exited on its own after losing the device
        self.stop_thread();

        info!(device = %self.device.display(), width = self.width, height = self.height, "Opening V4L2 device");

        let (ready_tx, ready_rx) = mpsc::channel();
        self.running.store(true, Ordering::SeqCst);

        let device = self.device.clone();
        let (width, height) = (self.width, self.height);
        let running = Arc::clone(&self.running);
        let latest = Arc::clone(&self.latest_frame);

        self.thread_handle = Some(std::thread::spawn(move || {
            capture_loop(&device, width, height, running, latest, ready_tx);
        }));

        match ready_rx.recv_timeout(timing::CAMERA_START_TIMEOUT) {
            Ok(Ok(())) => {
                info!("V4L2 device streaming");
                Ok(())
            }
            Ok(Err(err)) => {
                self.stop_thread();
                Err(err)
            }
            Err(_) => {
                self.stop_thread();
                Err(BackendError::Other(format!(
                    "No frame from {} within {:?}",
                    self.device.display(),
                    timing::CAMERA_START_TIMEOUT
                )))
            }
        }
    }

    fn deactivate(&mut self) -> BackendResult<()> {
        if self.thread_handle.is_some() {
            info!(device = %self.device.display(), "Releasing V4L2 device");
        }
        self.stop_thread();
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.thread_handle.is_some() && self.running.load(Ordering::SeqCst)
    }

    fn capture_frame(&self) -> BackendResult<CameraFrame> {
        if self.thread_handle.is_none() {
            return Err(BackendError::NotActive);
        }
        if !self.running.load(Ordering::SeqCst) {
            // Capture thread gave up on the device
            return Err(BackendError::DeviceNotFound(format!(
                "{} stopped streaming",
                self.device.display()
            )));
        }
        self.latest_frame
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(BackendError::NotActive)
    }

    fn backend_type(&self) -> CameraBackendType {
        CameraBackendType::V4l2
    }
}

impl Drop for V4l2Backend {
    fn drop(&mut self) {
        self.stop_thread();
    }
}

/// Capture loop running in a separate thread
///
/// Reports the outcome of opening the device (first decoded frame or the
/// failure) through `ready`, then keeps `latest` current until stopped.
fn capture_loop(
    device: &std::path::Path,
    width: u32,
    height: u32,
    running: Arc<AtomicBool>,
    latest: Arc<Mutex<Option<CameraFrame>>>,
    ready: mpsc::Sender<BackendResult<()>>,
) {
    let context = device.display().to_string();

    let dev = match Device::with_path(device) {
        Ok(dev) => dev,
        Err(e) => {
            running.store(false, Ordering::SeqCst);
            let _ = ready.send(Err(BackendError::from_io(&context, &e)));
            return;
        }
    };

    let format = match negotiate_format(&dev, width, height) {
        Ok(format) => format,
        Err(err) => {
            running.store(false, Ordering::SeqCst);
            let _ = ready.send(Err(err));
            return;
        }
    };

    let mut stream = match Stream::with_buffers(&dev, Type::VideoCapture, formats::V4L2_BUFFER_COUNT) {
        Ok(stream) => stream,
        Err(e) => {
            running.store(false, Ordering::SeqCst);
            let _ = ready.send(Err(BackendError::from_io(&context, &e)));
            return;
        }
    };

    let mut ready = Some(ready);
    let mut errors = 0u32;

    while running.load(Ordering::SeqCst) {
        let (buf, meta) = match stream.next() {
            Ok(frame) => frame,
            Err(e) => {
                errors += 1;
                warn!(error = %e, errors, "Failed to dequeue V4L2 buffer");
                if errors >= MAX_STREAM_ERRORS {
                    error!(device = %context, "V4L2 device lost");
                    if let Some(tx) = ready.take() {
                        let _ = tx.send(Err(BackendError::from_io(&context, &e)));
                    }
                    break;
                }
                continue;
            }
        };
        errors = 0;

        let used = (meta.bytesused as usize).min(buf.len());
        let frame = match decode_buffer(&buf[..used], &format) {
            Ok(frame) => frame,
            Err(err) => {
                debug!(error = %err, "Dropping undecodable frame");
                continue;
            }
        };

        *latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(frame);

        if let Some(tx) = ready.take() {
            let _ = tx.send(Ok(()));
        }
    }

    running.store(false, Ordering::SeqCst);
    info!(device = %context, "V4L2 capture loop stopped");
}

/// Ask for MJPEG, fall back to YUYV
fn negotiate_format(dev: &Device, width: u32, height: u32) -> BackendResult<Format> {
    let mjpg = FourCC::new(b"MJPG");
    let yuyv = FourCC::new(b"YUYV");

    for fourcc in [mjpg, yuyv] {
        match dev.set_format(&Format::new(width, height, fourcc)) {
            Ok(actual) if actual.fourcc == mjpg || actual.fourcc == yuyv => {
                info!(
                    width = actual.width,
                    height = actual.height,
                    fourcc = %actual.fourcc,
                    "V4L2 format configured"
                );
                return Ok(actual);
            }
            Ok(actual) => debug!(requested = %fourcc, got = %actual.fourcc, "Format not accepted"),
            Err(e) => debug!(requested = %fourcc, error = %e, "Failed to set format"),
        }
    }

    Err(BackendError::FormatNotSupported(
        "device offers neither MJPEG nor YUYV".into(),
    ))
}

fn decode_buffer(buf: &[u8], format: &Format) -> BackendResult<CameraFrame> {
    if format.fourcc == FourCC::new(b"MJPG") {
        let image = image::load_from_memory_with_format(buf, image::ImageFormat::Jpeg)
            .map_err(|e| BackendError::Other(format!("MJPEG decode failed: {}", e)))?;
        return Ok(CameraFrame::from_rgba_image(image.to_rgba8()));
    }

    let expected = (format.width * format.height * 2) as usize;
    if buf.len() < expected {
        return Err(BackendError::Other(format!(
            "Short YUYV buffer: {} < {}",
            buf.len(),
            expected
        )));
    }
    let rgba = yuyv_to_rgba(&buf[..expected], format.width, format.height);
    Ok(CameraFrame {
        width: format.width,
        height: format.height,
        stride: format.width * 4,
        data: Arc::from(rgba.into_boxed_slice()),
        captured_at: Instant::now(),
    })
}

/// Convert YUYV (YUV 4:2:2) to RGBA
///
/// YUYV format: Y0 U0 Y1 V0 - each 4-byte group encodes 2 pixels.
/// Uses BT.601 coefficients.
pub fn yuyv_to_rgba(data: &[u8], width: u32, height: u32) -> Vec<u8> {
    let pixel_count = (width * height) as usize;
    let mut rgba = Vec::with_capacity(pixel_count * 4);

    for chunk in data.chunks_exact(4) {
        let y0 = chunk[0] as f32;
        let u = chunk[1] as f32 - 128.0;
        let y1 = chunk[2] as f32;
        let v = chunk[3] as f32 - 128.0;

        for y in [y0, y1] {
            let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
            let g = (y - 0.344 * u - 0.714 * v).clamp(0.0, 255.0) as u8;
            let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;
            rgba.extend_from_slice(&[r, g, b, 255]);
        }
    }

    rgba.truncate(pixel_count * 4);
    rgba
}
