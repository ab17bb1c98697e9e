// SPDX-License-Identifier: GPL-3.0-only

//! Frames from still image files
//!
//! A single file yields the same frame on every capture. A directory is
//! scanned once on activation; its images (sorted by name) are handed out in
//! turn, one per capture, wrapping around at the end.

use crate::backends::camera::CameraBackend;
use crate::backends::camera::types::{
    BackendError, BackendResult, CameraBackendType, CameraFrame,
};
use crate::constants::file_formats;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Load an image file as an RGBA frame
pub fn load_image_as_frame(path: &Path) -> BackendResult<CameraFrame> {
    debug!(path = %path.display(), "Loading image file");

    let img = image::open(path).map_err(|e| match e {
        image::ImageError::IoError(io) => BackendError::from_io(&path.display().to_string(), &io),
        other => BackendError::Other(format!(
            "Failed to load image '{}': {}",
            path.display(),
            other
        )),
    })?;

    Ok(CameraFrame::from_rgba_image(img.to_rgba8()))
}

/// Image file or directory used as a camera
pub struct FileSource {
    path: PathBuf,
    frames: Vec<CameraFrame>,
    next: AtomicUsize,
}

impl FileSource {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            frames: Vec::new(),
            next: AtomicUsize::new(0),
        }
    }

    fn image_paths(&self) -> BackendResult<Vec<PathBuf>> {
        if !self.path.is_dir() {
            return Ok(vec![self.path.clone()]);
        }

        let entries = std::fs::read_dir(&self.path)
            .map_err(|e| BackendError::from_io(&self.path.display().to_string(), &e))?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.is_file()
                    && p.extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(file_formats::is_image_extension)
            })
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(BackendError::DeviceNotFound(format!(
                "No images in {}",
                self.path.display()
            )));
        }
        Ok(paths)
    }
}

impl CameraBackend for FileSource {
    fn activate(&mut self) -> BackendResult<()> {
        if self.is_active() {
            return Ok(());
        }

        let mut frames = Vec::new();
        for path in self.image_paths()? {
            match load_image_as_frame(&path) {
                Ok(frame) => frames.push(frame),
                // A bad file in a directory is skipped; a bad single file is fatal
                Err(err) if self.path.is_dir() => {
                    warn!(path = %path.display(), error = %err, "Skipping unreadable image")
                }
                Err(err) => return Err(err),
            }
        }
        if frames.is_empty() {
            return Err(BackendError::DeviceNotFound(format!(
                "No readable images in {}",
                self.path.display()
            )));
        }

        info!(path = %self.path.display(), frames = frames.len(), "File source activated");
        self.frames = frames;
        self.next.store(0, Ordering::SeqCst);
        Ok(())
    }

    fn deactivate(&mut self) -> BackendResult<()> {
        self.frames.clear();
        Ok(())
    }

    fn is_active(&self) -> bool {
        !self.frames.is_empty()
    }

    fn capture_frame(&self) -> BackendResult<CameraFrame> {
        if self.frames.is_empty() {
            return Err(BackendError::NotActive);
        }
        let index = self.next.fetch_add(1, Ordering::SeqCst) % self.frames.len();
        let mut frame = self.frames[index].clone();
        frame.captured_at = Instant::now();
        Ok(frame)
    }

    fn backend_type(&self) -> CameraBackendType {
        CameraBackendType::File
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn write_solid(dir: &Path, name: &str, color: [u8; 4]) {
        RgbaImage::from_pixel(8, 6, Rgba(color))
            .save(dir.join(name))
            .unwrap();
    }

    #[test]
    fn test_directory_cycles_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write_solid(dir.path(), "b.png", [0, 255, 0, 255]);
        write_solid(dir.path(), "a.png", [255, 0, 0, 255]);
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut source = FileSource::new(dir.path().to_path_buf());
        source.activate().unwrap();

        let first = source.capture_frame().unwrap().to_rgba_image().unwrap();
        let second = source.capture_frame().unwrap().to_rgba_image().unwrap();
        let third = source.capture_frame().unwrap().to_rgba_image().unwrap();
        assert_eq!(first.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(second.get_pixel(0, 0).0, [0, 255, 0, 255]);
        assert_eq!(third.get_pixel(0, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = FileSource::new(dir.path().join("absent.png"));
        assert!(matches!(
            source.activate(),
            Err(BackendError::DeviceNotFound(_))
        ));
        assert!(!source.is_active());
    }

    #[test]
    fn test_empty_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = FileSource::new(dir.path().to_path_buf());
        assert!(matches!(
            source.activate(),
            Err(BackendError::DeviceNotFound(_))
        ));
    }

    #[test]
    fn test_deactivate_stops_frames() {
        let dir = tempfile::tempdir().unwrap();
        write_solid(dir.path(), "only.png", [1, 2, 3, 255]);
        let mut source = FileSource::new(dir.path().join("only.png"));
        source.activate().unwrap();
        assert!(source.capture_frame().is_ok());

        source.deactivate().unwrap();
        assert_eq!(source.capture_frame().unwrap_err(), BackendError::NotActive);
    }
}
