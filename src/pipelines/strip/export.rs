// SPDX-License-Identifier: GPL-3.0-only

//! Saving rendered strips

use super::{RenderedStrip, StripRenderer};
use crate::app::StripTemplate;
use crate::constants::product;
use crate::errors::{AppError, AppResult};
use crate::pipelines::photo::{EncodingQuality, PhotoEncoder};
use crate::storage::Photo;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// `photobooth-<template>-<YYYY-MM-DD>.jpg`
pub fn strip_filename(template: StripTemplate, date: NaiveDate) -> String {
    format!(
        "{}-{}-{}.jpg",
        product::ID,
        template.id(),
        date.format("%Y-%m-%d")
    )
}

/// Encode at maximum JPEG quality and write into `output_dir`
///
/// The directory is created if missing. An existing file with the same name
/// is overwritten.
pub async fn export_strip(strip: &RenderedStrip, output_dir: &Path) -> AppResult<PathBuf> {
    let encoded = PhotoEncoder::with_quality(EncodingQuality::Maximum)
        .encode_jpeg_async(strip.image.clone())
        .await?;

    tokio::fs::create_dir_all(output_dir).await.map_err(|e| {
        AppError::ExportFailed(format!(
            "Failed to create {}: {}",
            output_dir.display(),
            e
        ))
    })?;

    let path = output_dir.join(strip_filename(strip.template, strip.date));
    let size = encoded.len();
    let target = path.clone();
    tokio::task::spawn_blocking(move || write_replacing(&target, &encoded))
        .await
        .map_err(|e| AppError::ExportFailed(format!("Save task failed: {}", e)))?
        .map_err(|e| AppError::ExportFailed(format!("Failed to save strip: {}", e)))?;

    info!(path = %path.display(), size, "Photo strip saved");
    Ok(path)
}

/// Write through a sibling temp file so a failed save never leaves a
/// truncated strip under the final name
fn write_replacing(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("jpg.part");
    let result = std::fs::write(&tmp, bytes).and_then(|()| std::fs::rename(&tmp, path));
    if result.is_err() {
        if let Err(e) = std::fs::remove_file(&tmp) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %tmp.display(), error = %e, "Failed to remove partial strip");
            }
        }
    }
    result
}

/// Render and save in one go
pub async fn render_and_export(
    renderer: &StripRenderer,
    photos: &[Photo],
    template: StripTemplate,
    output_dir: &Path,
) -> AppResult<PathBuf> {
    let strip = renderer.render(photos, template).await?;
    export_strip(&strip, output_dir).await
}
