// SPDX-License-Identifier: GPL-3.0-only

//! Photo strip compositing
//!
//! ```text
//! 4 × Photo ──decode (parallel)──▶ 4 × RGBA ─┐
//!                                            ├─▶ composite ─▶ RenderedStrip ─▶ JPEG file
//! template ──▶ layout ──▶ SVG decoration ────┘
//! ```
//!
//! Decoding fans out to blocking workers and is joined before compositing.
//! The join keeps index order regardless of which decode finishes first, so
//! slot `i` always shows photo `i`.

pub mod decoration;
pub mod export;
pub mod layout;

pub use export::{export_strip, strip_filename};
pub use layout::{Rect, StripLayout};

use crate::app::{FilterType, StripTemplate};
use crate::constants::strip::PHOTOS_PER_STRIP;
use crate::errors::{AppError, AppResult};
use crate::pipelines::photo::apply_filter;
use crate::storage::Photo;
use chrono::NaiveDate;
use futures::FutureExt;
use futures::future::{BoxFuture, try_join_all};
use image::imageops::FilterType as ResizeFilter;
use image::{DynamicImage, RgbaImage};
use std::sync::Arc;
use tracing::{debug, info};

/// Turns an encoded photo into pixels
pub trait PhotoDecoder: Send + Sync {
    fn decode(&self, photo: Photo) -> BoxFuture<'static, AppResult<RgbaImage>>;
}

/// Decodes with the `image` crate on a blocking worker
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDecoder;

impl PhotoDecoder for ImageDecoder {
    fn decode(&self, photo: Photo) -> BoxFuture<'static, AppResult<RgbaImage>> {
        async move {
            tokio::task::spawn_blocking(move || {
                image::load_from_memory(photo.bytes())
                    .map(|img| img.to_rgba8())
                    .map_err(|e| AppError::ExportFailed(format!("Failed to decode photo: {}", e)))
            })
            .await
            .map_err(|e| AppError::ExportFailed(format!("Decode task error: {}", e)))?
        }
        .boxed()
    }
}

/// A composited strip ready for export
#[derive(Debug, Clone)]
pub struct RenderedStrip {
    pub image: RgbaImage,
    pub template: StripTemplate,
    pub date: NaiveDate,
}

/// Composes four photos into a strip
#[derive(Clone)]
pub struct StripRenderer {
    decoder: Arc<dyn PhotoDecoder>,
    fontdb: Arc<usvg::fontdb::Database>,
}

impl StripRenderer {
    /// Renderer using system fonts and the default decoder
    pub fn new() -> Self {
        Self::with_decoder(Arc::new(ImageDecoder))
    }

    pub fn with_decoder(decoder: Arc<dyn PhotoDecoder>) -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        debug!(faces = db.len(), "Loaded fonts for strip text");
        Self {
            decoder,
            fontdb: Arc::new(db),
        }
    }

    /// Render dated today
    pub async fn render(
        &self,
        photos: &[Photo],
        template: StripTemplate,
    ) -> AppResult<RenderedStrip> {
        self.render_on(photos, template, chrono::Local::now().date_naive())
            .await
    }

    /// Render with an explicit date
    pub async fn render_on(
        &self,
        photos: &[Photo],
        template: StripTemplate,
        date: NaiveDate,
    ) -> AppResult<RenderedStrip> {
        if photos.len() < PHOTOS_PER_STRIP {
            return Err(AppError::InsufficientPhotos {
                needed: PHOTOS_PER_STRIP - photos.len(),
            });
        }
        if photos.len() > PHOTOS_PER_STRIP {
            return Err(AppError::ExportFailed(format!(
                "A strip holds {} photos, got {}",
                PHOTOS_PER_STRIP,
                photos.len()
            )));
        }

        info!(%template, %date, "Rendering photo strip");

        let decoded = try_join_all(photos.iter().cloned().map(|p| self.decoder.decode(p))).await?;

        let fontdb = Arc::clone(&self.fontdb);
        let image = tokio::task::spawn_blocking(move || compose(template, date, decoded, &fontdb))
            .await
            .map_err(|e| AppError::ExportFailed(format!("Compositing task error: {}", e)))??;

        Ok(RenderedStrip {
            image,
            template,
            date,
        })
    }
}

impl Default for StripRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StripRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripRenderer")
            .field("font_faces", &self.fontdb.len())
            .finish_non_exhaustive()
    }
}

/// Date as printed under the title
pub fn display_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

fn compose(
    template: StripTemplate,
    date: NaiveDate,
    photos: Vec<RgbaImage>,
    fontdb: &Arc<usvg::fontdb::Database>,
) -> AppResult<RgbaImage> {
    let layout = StripLayout::for_template(template);
    let svg = decoration::build_svg(template, &layout, &display_date(date));
    let mut canvas = decoration::rasterize(&svg, fontdb)?;

    for (photo, slot) in photos.into_iter().zip(layout.slots.iter()) {
        let mut fitted = fill_slot(photo, slot);
        if template == StripTemplate::Vintage {
            fitted = apply_filter(&fitted, FilterType::Sepia);
        }
        image::imageops::overlay(&mut canvas, &fitted, slot.x as i64, slot.y as i64);
    }

    Ok(canvas)
}

/// Scale to cover the slot, cropping the overflow evenly on both sides
fn fill_slot(photo: RgbaImage, slot: &Rect) -> RgbaImage {
    if photo.dimensions() == (slot.width, slot.height) {
        return photo;
    }
    DynamicImage::ImageRgba8(photo)
        .resize_to_fill(slot.width, slot.height, ResizeFilter::Triangle)
        .to_rgba8()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_fill_slot_crops_center() {
        // 40x10 image: left quarter red, middle green, right quarter blue
        let photo = RgbaImage::from_fn(40, 10, |x, _| match x {
            0..10 => Rgba([255, 0, 0, 255]),
            30..40 => Rgba([0, 0, 255, 255]),
            _ => Rgba([0, 255, 0, 255]),
        });
        let fitted = fill_slot(photo, &Rect::new(0, 0, 20, 20));
        assert_eq!(fitted.dimensions(), (20, 20));
        // Scaled 2x to 80x20 then cropped to the middle 20 columns: all green
        let p = fitted.get_pixel(10, 10).0;
        assert!(p[1] > 200 && p[0] < 40 && p[2] < 40, "{p:?}");
    }

    #[test]
    fn test_display_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(display_date(date), "3/7/2026");
    }
}
