//! Software rasterizer: an RGBA pixel surface that scene nodes paint onto,
//! encoded to PNG when done.

use std::io::Cursor;

use crate::cells::TextOrientation;
use crate::color::Rgb;
use crate::error::{Result, TlviewError};
use crate::layout::dimensions::CHAR_ADVANCE_RATIO;

use super::backend::RenderBackend;
use super::font::{self, CELL_COLS, GLYPH_COLS, GLYPH_ROWS};
use super::scene::{Direction, LineNode, RectNode, TextAlign, TextNode};

/// Largest surface side accepted, matching common browser canvas limits.
pub const MAX_CANVAS_DIMENSION: u32 = 32_767;
/// Largest surface area accepted (16384 x 16384).
pub const MAX_CANVAS_AREA: u64 = 268_435_456;

/// RGBA8 pixel surface addressed in logical pixels.
pub struct RasterCanvas {
    width: u32,
    height: u32,
    /// Device pixels per logical pixel.
    scale: f32,
    buf: Vec<u8>,
}

impl RasterCanvas {
    /// Allocate a surface of `logical_width` x `logical_height` at `scale`,
    /// cleared to `background`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn new(logical_width: f32, logical_height: f32, scale: f32, background: Rgb) -> Result<Self> {
        if scale.is_nan() || scale <= 0.0 || !logical_width.is_finite() || !logical_height.is_finite() {
            return Err(TlviewError::ExportBackendFailure(format!(
                "invalid surface {logical_width}x{logical_height} at scale {scale}"
            )));
        }
        let width = (logical_width.max(0.0) * scale).ceil() as u64;
        let height = (logical_height.max(0.0) * scale).ceil() as u64;
        if width == 0 || height == 0 {
            return Err(TlviewError::ExportBackendFailure(
                "surface has no area".to_string(),
            ));
        }
        if width > u64::from(MAX_CANVAS_DIMENSION)
            || height > u64::from(MAX_CANVAS_DIMENSION)
            || width * height > MAX_CANVAS_AREA
        {
            return Err(TlviewError::ExportBackendFailure(format!(
                "surface {width}x{height} exceeds canvas limits"
            )));
        }
        let (width, height) = (width as u32, height as u32);
        let pixels = (width as usize) * (height as usize);
        let rgba = background.to_rgba();
        let mut buf = Vec::with_capacity(pixels * 4);
        for _ in 0..pixels {
            buf.extend_from_slice(&rgba);
        }
        Ok(Self {
            width,
            height,
            scale,
            buf,
        })
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// RGBA of a device pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let idx = self.index(x, y)?;
        let px = self.buf.get(idx..idx + 4)?;
        Some([*px.first()?, *px.get(1)?, *px.get(2)?, *px.get(3)?])
    }

    /// Raw RGBA8 bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Encode the surface as PNG.
    pub fn encode_png(self) -> Result<Vec<u8>> {
        let (width, height) = (self.width, self.height);
        let image = image::RgbaImage::from_raw(width, height, self.buf).ok_or_else(|| {
            TlviewError::ExportBackendFailure("pixel buffer size mismatch".to_string())
        })?;
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, image::ImageFormat::Png)?;
        Ok(out.into_inner())
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 4)
    }

    #[inline]
    fn put(&mut self, x: u32, y: u32, color: Rgb) {
        if let Some(idx) = self.index(x, y) {
            if let Some(px) = self.buf.get_mut(idx..idx + 4) {
                px.copy_from_slice(&color.to_rgba());
            }
        }
    }

    /// Device-pixel range covering logical `[start, start + len)`, clipped
    /// to `limit`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn device_span(&self, start: f32, len: f32, limit: u32) -> (u32, u32) {
        let lo = (start * self.scale).round().max(0.0);
        let hi = ((start + len) * self.scale).round().max(0.0);
        let lo = (lo as u32).min(limit);
        let hi = (hi as u32).min(limit);
        (lo, hi.max(lo))
    }

    /// Logical coordinate of a device pixel's center.
    #[allow(clippy::cast_precision_loss)]
    fn logical(&self, device: u32) -> f32 {
        (device as f32 + 0.5) / self.scale
    }
}

/// Whether logical point (`px`, `py`) falls outside the rounded corners of a
/// rectangle.
fn outside_corner(rect: &RectNode, px: f32, py: f32) -> bool {
    let r = rect.radius.min(rect.width / 2.0).min(rect.height / 2.0);
    if r <= 0.0 {
        return false;
    }
    let cx = if px < rect.x + r {
        rect.x + r
    } else if px > rect.x + rect.width - r {
        rect.x + rect.width - r
    } else {
        return false;
    };
    let cy = if py < rect.y + r {
        rect.y + r
    } else if py > rect.y + rect.height - r {
        rect.y + rect.height - r
    } else {
        return false;
    };
    let (dx, dy) = (px - cx, py - cy);
    dx * dx + dy * dy > r * r
}

impl RenderBackend for RasterCanvas {
    fn fill_rect(&mut self, rect: &RectNode) {
        let (x0, x1) = self.device_span(rect.x, rect.width, self.width);
        let (y0, y1) = self.device_span(rect.y, rect.height, self.height);
        for y in y0..y1 {
            let ly = self.logical(y);
            for x in x0..x1 {
                if !outside_corner(rect, self.logical(x), ly) {
                    self.put(x, y, rect.fill);
                }
            }
        }
    }

    fn line(&mut self, line: &LineNode) {
        let (w, h) = match line.direction {
            Direction::Horizontal => (line.length, 1.0),
            Direction::Vertical => (1.0, line.length),
        };
        let (x0, x1) = self.device_span(line.x, w, self.width);
        let (y0, y1) = self.device_span(line.y, h, self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                self.put(x, y, line.color);
            }
        }
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn text(&mut self, text: &TextNode) {
        let chars: Vec<char> = text.text.chars().collect();
        if chars.is_empty() || text.size <= 0.0 {
            return;
        }
        // One glyph pixel; a character cell is CELL_COLS of them, which makes
        // the advance match the width the layout reserves per character.
        let unit = text.size * CHAR_ADVANCE_RATIO / CELL_COLS as f32;
        let advance = unit * CELL_COLS as f32;
        let run = advance * chars.len() as f32;
        let thickness = unit * GLYPH_ROWS as f32;

        // Run-local frame: `u` along the reading direction, `v` down the glyph.
        let (left, top, box_w, box_h) = match text.orientation {
            TextOrientation::Horizontal => {
                let start = match text.align {
                    TextAlign::Start => text.x,
                    TextAlign::Middle => text.x - run / 2.0,
                };
                (start, text.y - thickness / 2.0, run, thickness)
            }
            TextOrientation::Vertical => (
                text.x - thickness / 2.0,
                text.y - run / 2.0,
                thickness,
                run,
            ),
        };

        let (x0, x1) = self.device_span(left, box_w, self.width);
        let (y0, y1) = self.device_span(top, box_h, self.height);
        for y in y0..y1 {
            let ly = self.logical(y);
            for x in x0..x1 {
                let lx = self.logical(x);
                let (u, v) = match text.orientation {
                    TextOrientation::Horizontal => (lx - left, ly - top),
                    // Rotated 90° counterclockwise: text reads bottom to top.
                    TextOrientation::Vertical => (top + box_h - ly, lx - left),
                };
                if u < 0.0 || v < 0.0 {
                    continue;
                }
                let index = (u / advance) as usize;
                let Some(&ch) = chars.get(index) else {
                    continue;
                };
                let col = ((u - index as f32 * advance) / unit) as u32;
                let row = (v / unit) as u32;
                if col < GLYPH_COLS && font::is_set(font::glyph(ch), col, row) {
                    self.put(x, y, text.color);
                }
            }
        }
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::color::palette;

    const RED: Rgb = Rgb::new(255, 0, 0);

    fn canvas(w: f32, h: f32, scale: f32) -> RasterCanvas {
        RasterCanvas::new(w, h, scale, palette::WHITE).unwrap()
    }

    fn count(c: &RasterCanvas, color: Rgb) -> usize {
        c.as_bytes()
            .chunks_exact(4)
            .filter(|px| *px == color.to_rgba())
            .count()
    }

    #[test]
    fn test_supersampled_dimensions() {
        let c = canvas(320.0, 192.0, 2.0);
        assert_eq!((c.width(), c.height()), (640, 384));
        assert_eq!(c.pixel(0, 0), Some([255, 255, 255, 255]));
        assert_eq!(c.pixel(640, 0), None);
    }

    #[test]
    fn test_rejects_oversized_surface() {
        let err = RasterCanvas::new(20_000.0, 10.0, 2.0, palette::WHITE)
            .err()
            .unwrap();
        assert!(matches!(err, TlviewError::ExportBackendFailure(_)));
        assert!(RasterCanvas::new(0.0, 10.0, 2.0, palette::WHITE).is_err());
        assert!(RasterCanvas::new(10.0, 10.0, 0.0, palette::WHITE).is_err());
    }

    #[test]
    fn test_fill_rect_scaled() {
        let mut c = canvas(10.0, 10.0, 2.0);
        c.fill_rect(&RectNode {
            x: 1.0,
            y: 1.0,
            width: 3.0,
            height: 2.0,
            fill: RED,
            radius: 0.0,
            title: None,
        });
        assert_eq!(count(&c, RED), 6 * 4);
        assert_eq!(c.pixel(2, 2), Some(RED.to_rgba()));
        assert_eq!(c.pixel(1, 1), Some(palette::WHITE.to_rgba()));
    }

    #[test]
    fn test_rounded_corners_skip_pixels() {
        let mut c = canvas(20.0, 20.0, 1.0);
        c.fill_rect(&RectNode {
            x: 0.0,
            y: 0.0,
            width: 20.0,
            height: 20.0,
            fill: RED,
            radius: 6.0,
            title: None,
        });
        assert_eq!(c.pixel(0, 0), Some(palette::WHITE.to_rgba()));
        assert_eq!(c.pixel(10, 10), Some(RED.to_rgba()));
        assert!(count(&c, RED) < 400);
    }

    #[test]
    fn test_lines() {
        let mut c = canvas(10.0, 10.0, 1.0);
        c.line(&LineNode {
            x: 0.0,
            y: 4.0,
            length: 10.0,
            direction: Direction::Horizontal,
            color: RED,
        });
        c.line(&LineNode {
            x: 2.0,
            y: 0.0,
            length: 10.0,
            direction: Direction::Vertical,
            color: RED,
        });
        assert_eq!(count(&c, RED), 19);
    }

    fn text_node(orientation: TextOrientation) -> TextNode {
        TextNode {
            x: 50.0,
            y: 50.0,
            text: "HI".to_string(),
            size: 12.0,
            color: RED,
            orientation,
            align: TextAlign::Middle,
            bold: false,
        }
    }

    /// Bounding box of painted pixels as (min_x, min_y, max_x, max_y).
    fn ink_bounds(c: &RasterCanvas) -> (u32, u32, u32, u32) {
        let mut b = (u32::MAX, u32::MAX, 0, 0);
        for y in 0..c.height() {
            for x in 0..c.width() {
                if c.pixel(x, y) == Some(RED.to_rgba()) {
                    b = (b.0.min(x), b.1.min(y), b.2.max(x), b.3.max(y));
                }
            }
        }
        b
    }

    #[test]
    fn test_horizontal_text_is_wide() {
        let mut c = canvas(100.0, 100.0, 1.0);
        c.text(&text_node(TextOrientation::Horizontal));
        let (x0, y0, x1, y1) = ink_bounds(&c);
        assert!(x1 - x0 > y1 - y0);
    }

    #[test]
    fn test_vertical_text_is_tall() {
        let mut c = canvas(100.0, 100.0, 1.0);
        c.text(&text_node(TextOrientation::Vertical));
        let (x0, y0, x1, y1) = ink_bounds(&c);
        assert!(y1 - y0 > x1 - x0);
        // Centered on (50, 50).
        assert!(x0 < 50 && x1 > 45);
        assert!(y0 < 50 && y1 > 50);
    }

    #[test]
    fn test_png_round_trip_dimensions() {
        let c = canvas(40.0, 30.0, 2.0);
        let png = c.encode_png().unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (80, 60));
    }
}
