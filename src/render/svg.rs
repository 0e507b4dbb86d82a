//! SVG serialization of a scene.

use std::fmt::Write as _;

use crate::cells::TextOrientation;
use crate::color::Rgb;

use super::backend::RenderBackend;
use super::scene::{Direction, LineNode, RectNode, TextAlign, TextNode};

pub const FONT_FAMILY: &str = "Sarabun, sans-serif";

/// Accumulates SVG markup for one document.
pub struct SvgWriter {
    width: f32,
    height: f32,
    body: String,
}

impl SvgWriter {
    pub fn new(width: f32, height: f32, background: Rgb) -> Self {
        let mut body = String::new();
        let _ = writeln!(
            body,
            r#"<rect x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
            num(width),
            num(height),
            background.to_hex()
        );
        Self {
            width,
            height,
            body,
        }
    }

    /// Finish the document.
    pub fn into_markup(self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n{body}</svg>\n",
            w = num(self.width),
            h = num(self.height),
            body = self.body,
        )
    }
}

impl RenderBackend for SvgWriter {
    fn fill_rect(&mut self, rect: &RectNode) {
        let radius = if rect.radius > 0.0 {
            format!(r#" rx="{}""#, num(rect.radius))
        } else {
            String::new()
        };
        let open = format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}"{radius} fill="{}""#,
            num(rect.x),
            num(rect.y),
            num(rect.width),
            num(rect.height),
            rect.fill.to_hex(),
        );
        let _ = match &rect.title {
            Some(title) => writeln!(self.body, "{open}><title>{}</title></rect>", escape(title)),
            None => writeln!(self.body, "{open}/>"),
        };
    }

    fn line(&mut self, line: &LineNode) {
        let (x2, y2) = match line.direction {
            Direction::Horizontal => (line.x + line.length, line.y),
            Direction::Vertical => (line.x, line.y + line.length),
        };
        // Stroke centered on the half pixel so it covers exactly one row or column.
        let (ox, oy) = match line.direction {
            Direction::Horizontal => (0.0, 0.5),
            Direction::Vertical => (0.5, 0.0),
        };
        let _ = writeln!(
            self.body,
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="1"/>"#,
            num(line.x + ox),
            num(line.y + oy),
            num(x2 + ox),
            num(y2 + oy),
            line.color.to_hex(),
        );
    }

    fn text(&mut self, text: &TextNode) {
        let anchor = match (text.orientation, text.align) {
            (TextOrientation::Vertical, _) | (_, TextAlign::Middle) => "middle",
            (TextOrientation::Horizontal, TextAlign::Start) => "start",
        };
        let transform = match text.orientation {
            TextOrientation::Horizontal => String::new(),
            TextOrientation::Vertical => {
                format!(r#" transform="rotate(-90 {} {})""#, num(text.x), num(text.y))
            }
        };
        let weight = if text.bold { r#" font-weight="bold""# } else { "" };
        let _ = writeln!(
            self.body,
            r#"<text x="{}" y="{}" font-family="{FONT_FAMILY}" font-size="{}"{weight} fill="{}" text-anchor="{anchor}" dominant-baseline="central"{transform}>{}</text>"#,
            num(text.x),
            num(text.y),
            num(text.size),
            text.color.to_hex(),
            escape(&text.text),
        );
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn width(&self) -> u32 {
        self.width.max(0.0).ceil() as u32
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn height(&self) -> u32 {
        self.height.max(0.0).ceil() as u32
    }
}

/// Format a coordinate with at most two decimals and no trailing zeros.
fn num(v: f32) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
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
    use test_case::test_case;

    #[test_case(160.0, "160" ; "integral")]
    #[test_case(26.666_666, "26.67" ; "rounded")]
    #[test_case(0.5, "0.5" ; "half")]
    #[test_case(-0.001, "0" ; "negative zero")]
    fn test_num(v: f32, expected: &str) {
        assert_eq!(num(v), expected);
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a & "b">"#), "&lt;a &amp; &quot;b&quot;&gt;");
    }

    #[test]
    fn test_document_header() {
        let svg = SvgWriter::new(320.0, 64.0, palette::WHITE).into_markup();
        assert!(svg.starts_with(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="320" height="64" viewBox="0 0 320 64">"#
        ));
        assert!(svg.contains(r##"fill="#FFFFFF""##));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_swatch_with_title() {
        let mut w = SvgWriter::new(100.0, 100.0, palette::WHITE);
        w.fill_rect(&RectNode {
            x: 10.0,
            y: 5.0,
            width: 20.0,
            height: 30.0,
            fill: Rgb::new(0x22, 0xC5, 0x5E),
            radius: 4.0,
            title: Some("Aerato - Step 1".to_string()),
        });
        let svg = w.into_markup();
        assert!(svg.contains(
            r##"<rect x="10" y="5" width="20" height="30" rx="4" fill="#22C55E"><title>Aerato - Step 1</title></rect>"##
        ));
    }

    #[test]
    fn test_vertical_text_is_rotated() {
        let mut w = SvgWriter::new(100.0, 100.0, palette::WHITE);
        w.text(&TextNode {
            x: 40.0,
            y: 50.0,
            text: "Jazz".to_string(),
            size: 14.0,
            color: palette::TEXT,
            orientation: TextOrientation::Vertical,
            align: TextAlign::Middle,
            bold: false,
        });
        let svg = w.into_markup();
        assert!(svg.contains(r#"transform="rotate(-90 40 50)""#));
        assert!(svg.contains(">Jazz</text>"));
        assert!(svg.contains(r#"font-family="Sarabun, sans-serif""#));
    }
}
