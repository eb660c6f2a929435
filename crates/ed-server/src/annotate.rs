//! Stand-in annotation: outlines the region a detector would search.
//!
//! `scaleFactor` sets how far the outline is inset from the image border and
//! `minNeighbors` its thickness in pixels.

use std::io::Cursor;

use ed_core::ParamSnapshot;
use image::{ImageFormat, ImageResult, Rgba, RgbaImage};

pub const OUTLINE: Rgba<u8> = Rgba([0, 0, 255, 255]);

const MAX_THICKNESS: u32 = 32;

/// Decode `bytes`, draw the outline and re-encode as PNG.
pub fn annotate(bytes: &[u8], params: &ParamSnapshot) -> ImageResult<Vec<u8>> {
    let mut img = image::load_from_memory(bytes)?.to_rgba8();

    let scale_factor = params.get("scaleFactor").copied().unwrap_or(1.1);
    let min_neighbors = params.get("minNeighbors").copied().unwrap_or(4.0);

    let shorter = img.width().min(img.height()) as f64;
    // Out-of-range values are accepted; an inset past the centre just draws nothing.
    let inset = ((scale_factor - 1.0).max(0.0) * shorter / 4.0).min(shorter / 2.0) as u32;
    let thickness = (min_neighbors.round().max(1.0) as u32).min(MAX_THICKNESS);

    draw_outline(&mut img, inset, thickness);

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}

fn draw_outline(img: &mut RgbaImage, inset: u32, thickness: u32) {
    let (width, height) = img.dimensions();
    if inset.saturating_mul(2) >= width || inset.saturating_mul(2) >= height {
        return;
    }

    let (left, top) = (inset, inset);
    let (right, bottom) = (width - inset, height - inset);

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let inside = x >= left && x < right && y >= top && y < bottom;
        let on_edge = x < left + thickness
            || x + thickness >= right
            || y < top + thickness
            || y + thickness >= bottom;

        if inside && on_edge {
            *pixel = OUTLINE;
        }
    }
}
