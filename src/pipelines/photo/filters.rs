// SPDX-License-Identifier: MPL-2.0

//! CPU pixel filters applied at capture time
//!
//! Every filter except `normal` and `blur` is a per-pixel kernel looked up in
//! a dispatch table. Kernels work on f32 channels in 0..=255; results are
//! rounded and clamped when stored. Alpha is never touched.

use crate::app::FilterType;
use crate::constants::filters as params;
use image::RgbaImage;

/// Position information a kernel may need
#[derive(Debug, Clone, Copy)]
struct PixelContext {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

type PixelKernel = fn([f32; 3], PixelContext) -> [f32; 3];

/// Apply a filter to an RGBA image, returning a new image
pub fn apply_filter(image: &RgbaImage, filter: FilterType) -> RgbaImage {
    match filter {
        FilterType::Normal => image.clone(),
        FilterType::Blur => blur(image),
        other => match kernel_for(other) {
            Some(kernel) => map_pixels(image, kernel),
            None => image.clone(),
        },
    }
}

fn kernel_for(filter: FilterType) -> Option<PixelKernel> {
    let kernel: PixelKernel = match filter {
        FilterType::Grayscale => grayscale,
        FilterType::Sepia => sepia,
        FilterType::Invert => invert,
        FilterType::Vintage => vintage,
        FilterType::Noir => noir,
        FilterType::Blueprint => blueprint,
        FilterType::PopArt => popart,
        FilterType::Normal | FilterType::Blur => return None,
    };
    Some(kernel)
}

fn map_pixels(image: &RgbaImage, kernel: PixelKernel) -> RgbaImage {
    let (width, height) = image.dimensions();
    let mut output = image.clone();

    for (x, y, pixel) in output.enumerate_pixels_mut() {
        let [r, g, b, _] = pixel.0;
        let ctx = PixelContext {
            x,
            y,
            width,
            height,
        };
        let [r2, g2, b2] = kernel([r as f32, g as f32, b as f32], ctx);
        pixel.0[0] = store(r2);
        pixel.0[1] = store(g2);
        pixel.0[2] = store(b2);
    }

    output
}

/// Round and clamp a channel value
#[inline]
fn store(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

fn grayscale([r, g, b]: [f32; 3], _: PixelContext) -> [f32; 3] {
    let avg = (r + g + b) / 3.0;
    [avg, avg, avg]
}

fn sepia([r, g, b]: [f32; 3], _: PixelContext) -> [f32; 3] {
    [
        0.393 * r + 0.769 * g + 0.189 * b,
        0.349 * r + 0.686 * g + 0.168 * b,
        0.272 * r + 0.534 * g + 0.131 * b,
    ]
}

fn invert([r, g, b]: [f32; 3], _: PixelContext) -> [f32; 3] {
    [255.0 - r, 255.0 - g, 255.0 - b]
}

fn vintage([r, g, b]: [f32; 3], _: PixelContext) -> [f32; 3] {
    [
        0.9 * r + 0.05 * g + 0.05 * b,
        0.1 * r + 0.8 * g + 0.1 * b,
        0.1 * r + 0.1 * g + 0.7 * b,
    ]
}

fn noir([r, g, b]: [f32; 3], _: PixelContext) -> [f32; 3] {
    let avg = (r + g + b) / 3.0;
    let v = ((avg - 128.0) * params::NOIR_CONTRAST + 128.0).clamp(0.0, 255.0);
    [v, v, v]
}

fn blueprint([_, _, b]: [f32; 3], _: PixelContext) -> [f32; 3] {
    [0.0, 0.0, (b * 1.5).min(255.0)]
}

fn popart([r, g, b]: [f32; 3], ctx: PixelContext) -> [f32; 3] {
    let left = (ctx.x as f32) < ctx.width as f32 / 2.0;
    let top = (ctx.y as f32) < ctx.height as f32 / 2.0;
    match (top, left) {
        (true, true) => [r * 1.5, g * 0.5, b * 0.5],
        (true, false) => [r * 0.5, g * 0.5, b * 1.5],
        (false, true) => [r * 0.5, g * 1.5, b * 0.5],
        (false, false) => [r * 1.2, g * 1.2, b * 0.5],
    }
}

/// Gaussian blur of the color channels; alpha is copied back unchanged
fn blur(image: &RgbaImage) -> RgbaImage {
    let mut blurred = image::imageops::blur(image, params::BLUR_SIGMA);
    for (out, src) in blurred.pixels_mut().zip(image.pixels()) {
        out.0[3] = src.0[3];
    }
    blurred
}
