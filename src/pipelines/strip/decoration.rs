// SPDX-License-Identifier: GPL-3.0-only

//! Background, borders and text as an SVG layer
//!
//! Everything except the photos is described as SVG and rasterized with
//! resvg. Photos are composited on top afterwards, so borders are drawn as
//! rectangles slightly larger than their slot.

use super::layout::{Rect, StripLayout};
use crate::app::StripTemplate;
use crate::constants::product;
use crate::errors::{AppError, AppResult};
use image::{Rgba, RgbaImage};
use std::fmt::Write as _;
use std::sync::Arc;

/// Text and color choices for one template
struct Style {
    font_family: &'static str,
    title_size: u32,
    date_size: u32,
    title_fill: &'static str,
    date_fill: &'static str,
    border: u32,
    border_fill: &'static str,
}

fn style_for(template: StripTemplate) -> Style {
    match template {
        StripTemplate::Classic => Style {
            font_family: "Arial, Helvetica, sans-serif",
            title_size: 40,
            date_size: 30,
            title_fill: "#000000",
            date_fill: "#000000",
            border: 5,
            border_fill: "#000000",
        },
        StripTemplate::Modern => Style {
            font_family: "Helvetica, Arial, sans-serif",
            title_size: 44,
            date_size: 26,
            title_fill: "#111827",
            date_fill: "#6b7280",
            border: 1,
            border_fill: "#e5e7eb",
        },
        StripTemplate::Vintage => Style {
            font_family: "Georgia, 'Times New Roman', serif",
            title_size: 42,
            date_size: 28,
            title_fill: "#78350f",
            date_fill: "#92400e",
            border: 3,
            border_fill: "#fde68a",
        },
        StripTemplate::Polaroid => Style {
            font_family: "Arial, Helvetica, sans-serif",
            title_size: 40,
            date_size: 28,
            title_fill: "#1f2937",
            date_fill: "#6b7280",
            border: 0,
            border_fill: "#ffffff",
        },
    }
}

/// Build the decoration SVG for a layout
pub fn build_svg(template: StripTemplate, layout: &StripLayout, date_text: &str) -> String {
    let style = style_for(template);
    let (w, h) = (layout.width, layout.height);
    let mut svg = String::with_capacity(4096);

    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );

    match template {
        StripTemplate::Classic => {
            let _ = write!(svg, r##"<rect width="{w}" height="{h}" fill="#ffffff"/>"##);
        }
        StripTemplate::Modern => {
            svg.push_str(
                r##"<defs><linearGradient id="bg" x1="0" y1="0" x2="1" y2="1"><stop offset="0" stop-color="#f9fafb"/><stop offset="1" stop-color="#e5e7eb"/></linearGradient></defs>"##,
            );
            let _ = write!(svg, r#"<rect width="{w}" height="{h}" fill="url(#bg)"/>"#);
        }
        StripTemplate::Vintage => {
            let _ = write!(svg, r##"<rect width="{w}" height="{h}" fill="#fdf6e3"/>"##);
            let _ = write!(
                svg,
                r##"<rect x="20" y="20" width="{}" height="{}" fill="none" stroke="#d97706" stroke-width="6"/>"##,
                w - 40,
                h - 40
            );
            let _ = write!(
                svg,
                r##"<rect x="34" y="34" width="{}" height="{}" fill="none" stroke="#f59e0b" stroke-width="1.5"/>"##,
                w - 68,
                h - 68
            );
        }
        StripTemplate::Polaroid => {
            let _ = write!(svg, r##"<rect width="{w}" height="{h}" fill="#f5f5f4"/>"##);
            svg.push_str(
                r#"<defs><filter id="shadow" x="-10%" y="-10%" width="120%" height="130%"><feGaussianBlur stdDeviation="8"/></filter></defs>"#,
            );
        }
    }

    let cx = w / 2;
    let _ = write!(
        svg,
        r#"<text x="{cx}" y="{}" text-anchor="middle" font-family="{}" font-weight="bold" font-size="{}" fill="{}">{}</text>"#,
        layout.title_y,
        style.font_family,
        style.title_size,
        style.title_fill,
        escape_xml(product::STRIP_TITLE)
    );
    let _ = write!(
        svg,
        r#"<text x="{cx}" y="{}" text-anchor="middle" font-family="{}" font-size="{}" fill="{}">{}</text>"#,
        layout.date_y,
        style.font_family,
        style.date_size,
        style.date_fill,
        escape_xml(date_text)
    );

    if let Some(frames) = &layout.frames {
        for (i, frame) in frames.iter().enumerate() {
            push_polaroid_card(&mut svg, frame, &layout.slots[i], i + 1);
        }
    } else if style.border > 0 {
        for slot in &layout.slots {
            push_rect(&mut svg, &outset(slot, style.border), style.border_fill);
        }
    }

    svg.push_str("</svg>");
    svg
}

fn push_polaroid_card(svg: &mut String, frame: &Rect, photo: &Rect, number: usize) {
    let _ = write!(
        svg,
        r##"<rect x="{}" y="{}" width="{}" height="{}" fill="#000000" fill-opacity="0.25" filter="url(#shadow)"/>"##,
        frame.x + 4,
        frame.y + 8,
        frame.width,
        frame.height
    );
    push_rect(svg, frame, "#ffffff");

    // Caption centered in the strip of card below the photo
    let caption_y = (photo.y + photo.height + frame.y + frame.height) / 2 + 10;
    let _ = write!(
        svg,
        r##"<text x="{}" y="{}" text-anchor="middle" font-family="'Comic Sans MS', 'Segoe Print', cursive" font-size="28" fill="#374151">Photo {}</text>"##,
        frame.x + frame.width / 2,
        caption_y,
        number
    );
}

fn push_rect(svg: &mut String, rect: &Rect, fill: &str) {
    let _ = write!(
        svg,
        r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
        rect.x, rect.y, rect.width, rect.height, fill
    );
}

fn outset(rect: &Rect, by: u32) -> Rect {
    Rect::new(
        rect.x.saturating_sub(by),
        rect.y.saturating_sub(by),
        rect.width + 2 * by,
        rect.height + 2 * by,
    )
}

/// Escape text content for inclusion in SVG
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Rasterize an SVG document into a straight-alpha RGBA image
pub fn rasterize(svg: &str, fontdb: &Arc<usvg::fontdb::Database>) -> AppResult<RgbaImage> {
    let opts = usvg::Options {
        fontdb: Arc::clone(fontdb),
        ..Default::default()
    };
    let tree = usvg::Tree::from_str(svg, &opts)
        .map_err(|e| AppError::ExportFailed(format!("Invalid strip decoration: {}", e)))?;

    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| AppError::ExportFailed("Failed to allocate strip canvas".into()))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );

    // tiny-skia pixels are premultiplied
    let mut image = RgbaImage::new(size.width(), size.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    Ok(image)
}
