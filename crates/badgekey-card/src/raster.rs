//! Rasterization of a [`CardLayout`] into a grayscale PNG.

use crate::error::{RenderError, Result};
use crate::font::{ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH, is_set};
use crate::layout::{CardLayout, Element, aligned_x, shade};
use crate::qr::QrMatrix;
use badgekey_core::{PixelSize, RasterImage, constants::MAX_CAPTURE_DIMENSION_PX};
use image::imageops::{self, FilterType};
use image::{GrayImage, ImageFormat, Luma};
use std::io::Cursor;
use tracing::debug;

/// Paint the layout at its design size.
pub fn paint(layout: &CardLayout) -> GrayImage {
    let size = layout.size();
    let mut canvas = GrayImage::from_pixel(size.width, size.height, Luma([shade::WHITE]));

    for element in layout.elements() {
        match element {
            Element::Ellipse {
                cx,
                cy,
                rx,
                ry,
                shade,
            } => fill_ellipse(&mut canvas, *cx, *cy, *rx, *ry, *shade),
            Element::Rect {
                x,
                y,
                width,
                height,
                shade,
            } => fill_rect(&mut canvas, *x, *y, *width, *height, *shade),
            Element::Text {
                x,
                y,
                scale,
                align,
                shade,
                text,
            } => {
                let left = aligned_x(*x, text.chars().count(), *scale, *align);
                draw_text(&mut canvas, left, *y, *scale, *shade, text);
            }
            Element::Qr { x, y, size, matrix } => draw_qr(&mut canvas, *x, *y, *size, matrix),
        }
    }

    canvas
}

/// Rasterize the layout at `target` size and encode it as PNG.
///
/// # Errors
///
/// Returns `RenderError::InvalidSize` if `target` is empty or exceeds the
/// maximum capture dimension, and `RenderError::ImageEncoding` if PNG
/// encoding fails.
///
/// # Examples
///
/// ```
/// use badgekey_card::{CardLayout, rasterize};
/// use badgekey_core::{PixelSize, ScanId, ScanRecord, VisitorRecord};
/// use chrono::Local;
///
/// let record = ScanRecord::new(VisitorRecord::new("1", "Dewi"), Local::now(), ScanId::new(1));
/// let layout = CardLayout::for_record(&record).unwrap();
///
/// let image = rasterize(&layout, PixelSize::card()).unwrap();
/// assert_eq!(&image.png[1..4], b"PNG");
/// ```
pub fn rasterize(layout: &CardLayout, target: PixelSize) -> Result<RasterImage> {
    if target.is_empty()
        || target.width > MAX_CAPTURE_DIMENSION_PX
        || target.height > MAX_CAPTURE_DIMENSION_PX
    {
        return Err(RenderError::InvalidSize { size: target });
    }

    let mut canvas = paint(layout);
    if target != layout.size() {
        canvas = imageops::resize(&canvas, target.width, target.height, FilterType::Triangle);
    }

    let mut png = Vec::new();
    canvas.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

    debug!(size = %target, bytes = png.len(), "Card rasterized");
    Ok(RasterImage::new(target, png))
}

fn fill_rect(canvas: &mut GrayImage, x: i32, y: i32, width: u32, height: u32, shade: u8) {
    let (cw, ch) = (i64::from(canvas.width()), i64::from(canvas.height()));
    let x0 = i64::from(x).clamp(0, cw);
    let y0 = i64::from(y).clamp(0, ch);
    let x1 = (i64::from(x) + i64::from(width)).clamp(0, cw);
    let y1 = (i64::from(y) + i64::from(height)).clamp(0, ch);

    for py in y0..y1 {
        for px in x0..x1 {
            canvas.put_pixel(px as u32, py as u32, Luma([shade]));
        }
    }
}

fn fill_ellipse(canvas: &mut GrayImage, cx: i32, cy: i32, rx: u32, ry: u32, shade: u8) {
    if rx == 0 || ry == 0 {
        return;
    }

    let ch = i64::from(canvas.height());
    let top = (i64::from(cy) - i64::from(ry)).max(0);
    let bottom = (i64::from(cy) + i64::from(ry)).min(ch - 1);

    for py in top..=bottom {
        let dy = (py - i64::from(cy)) as f64 / f64::from(ry);
        let half = (f64::from(rx) * (1.0 - dy * dy).max(0.0).sqrt()).round() as i64;
        let left = i64::from(cx) - half;
        let span = (2 * half + 1) as u32;
        fill_rect(canvas, left as i32, py as i32, span, 1, shade);
    }
}

fn draw_text(canvas: &mut GrayImage, left: i32, top: i32, scale: u32, shade: u8, text: &str) {
    let step = (ADVANCE * scale) as i32;
    for (i, c) in text.chars().enumerate() {
        let origin = left + i as i32 * step;
        for row in 0..GLYPH_HEIGHT {
            for col in 0..GLYPH_WIDTH {
                if is_set(c, col, row) {
                    fill_rect(
                        canvas,
                        origin + (col * scale) as i32,
                        top + (row * scale) as i32,
                        scale,
                        scale,
                        shade,
                    );
                }
            }
        }
    }
}

fn draw_qr(canvas: &mut GrayImage, x: i32, y: i32, size: u32, matrix: &QrMatrix) {
    let modules = matrix.width() as u32;
    if modules == 0 {
        return;
    }

    // Whole-pixel modules, centered in the box.
    let module = (size / modules).max(1);
    let offset = ((size.saturating_sub(module * modules)) / 2) as i32;

    for my in 0..modules {
        for mx in 0..modules {
            if matrix.is_dark(mx as usize, my as usize) {
                fill_rect(
                    canvas,
                    x + offset + (mx * module) as i32,
                    y + offset + (my * module) as i32,
                    module,
                    module,
                    shade::BLACK,
                );
            }
        }
    }
}
