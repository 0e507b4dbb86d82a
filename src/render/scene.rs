//! The realized visual tree of a timeline.
//!
//! A [`Scene`] is a flat, ordered list of drawable nodes in logical pixels.
//! The on-screen presentation, the SVG writer and the rasterizer all consume
//! the same scene, which is what keeps exports identical to the screen.

use crate::cells::{CellContent, TextOrientation};
use crate::color::{palette, Rgb};
use crate::layout::{CellRect, GridLayout};

use super::backend::RenderBackend;

/// Horizontal padding of the label column (Tailwind `p-4`).
pub const LABEL_PADDING: f32 = 16.0;
/// Swatches fill this fraction of their cell's width...
pub const SWATCH_WIDTH_RATIO: f32 = 0.9;
/// ...and this fraction of its height.
pub const SWATCH_HEIGHT_RATIO: f32 = 0.8;
pub const SWATCH_RADIUS: f32 = 4.0;
pub const BORDER_WIDTH: f32 = 1.0;

/// Text anchoring along the reading direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    /// `x` is where the text starts.
    Start,
    /// `x`/`y` is the center of the run.
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RectNode {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub fill: Rgb,
    pub radius: f32,
    /// Hover text.
    pub title: Option<String>,
}

/// An axis-aligned 1 px rule.
#[derive(Debug, Clone, PartialEq)]
pub struct LineNode {
    pub x: f32,
    pub y: f32,
    pub length: f32,
    pub direction: Direction,
    pub color: Rgb,
}

/// A single run of text, vertically centered on `y` (horizontal text) or
/// horizontally centered on `x` (vertical text).
#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub size: f32,
    pub color: Rgb,
    pub orientation: TextOrientation,
    pub align: TextAlign,
    pub bold: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Rect(RectNode),
    Line(LineNode),
    Text(TextNode),
}

/// Drawable nodes plus the canvas they live on.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f32,
    pub height: f32,
    pub background: Rgb,
    pub nodes: Vec<Node>,
}

impl Scene {
    /// Realize a grid into a scene `width` px wide. The scene is never
    /// narrower than the grid itself.
    pub fn build(grid: &GridLayout, width: f32) -> Self {
        let width = width.max(grid.total_width());
        let height = grid.total_height();
        #[allow(clippy::cast_precision_loss)]
        let font = grid.font_size_px as f32;
        let mut nodes = Vec::new();
        let last_row = grid.rows.len().saturating_sub(1);

        for (i, row) in grid.rows.iter().enumerate() {
            let label = grid.label_rect(i);
            push_label(&mut nodes, &label, &row.label, row.label_orientation, font);
            nodes.push(Node::Line(LineNode {
                x: label.x + label.width - BORDER_WIDTH,
                y: label.y,
                length: label.height,
                direction: Direction::Vertical,
                color: palette::BORDER,
            }));

            for cell in &row.cells {
                let rect = grid.cell_rect(i, cell);
                nodes.push(Node::Line(LineNode {
                    x: rect.x,
                    y: rect.y,
                    length: rect.height,
                    direction: Direction::Vertical,
                    color: palette::BORDER,
                }));
                if let Some(descriptor) = &cell.content {
                    push_content(&mut nodes, &rect, &descriptor.content, descriptor.tooltip.clone(), font);
                }
            }

            if i < last_row {
                nodes.push(Node::Line(LineNode {
                    x: 0.0,
                    y: label.y + label.height - BORDER_WIDTH,
                    length: width,
                    direction: Direction::Horizontal,
                    color: palette::BORDER,
                }));
            }
        }

        Self {
            width,
            height,
            background: palette::WHITE,
            nodes,
        }
    }

    /// Paint nodes onto a backend in order, asking `proceed` before each one.
    /// Returns false if `proceed` stopped it before the last node.
    pub fn paint(
        &self,
        backend: &mut dyn RenderBackend,
        mut proceed: impl FnMut() -> bool,
    ) -> bool {
        for node in &self.nodes {
            if !proceed() {
                return false;
            }
            backend.draw(node);
        }
        true
    }
}

fn push_label(
    nodes: &mut Vec<Node>,
    rect: &CellRect,
    label: &str,
    orientation: TextOrientation,
    font: f32,
) {
    if label.is_empty() {
        return;
    }
    let (x, align) = match orientation {
        TextOrientation::Horizontal => (rect.x + LABEL_PADDING, TextAlign::Start),
        TextOrientation::Vertical => (rect.x + rect.width / 2.0, TextAlign::Middle),
    };
    nodes.push(Node::Text(TextNode {
        x,
        y: rect.y + rect.height / 2.0,
        text: label.to_string(),
        size: font,
        color: palette::TEXT,
        orientation,
        align,
        bold: true,
    }));
}

fn push_content(
    nodes: &mut Vec<Node>,
    rect: &CellRect,
    content: &CellContent,
    tooltip: Option<String>,
    font: f32,
) {
    let cx = rect.x + rect.width / 2.0;
    let cy = rect.y + rect.height / 2.0;
    match content {
        CellContent::Text { text, orientation } => nodes.push(Node::Text(TextNode {
            x: cx,
            y: cy,
            text: text.clone(),
            size: font,
            color: palette::TEXT,
            orientation: *orientation,
            align: TextAlign::Middle,
            bold: false,
        })),
        CellContent::Swatch { color } => {
            let width = rect.width * SWATCH_WIDTH_RATIO;
            let height = rect.height * SWATCH_HEIGHT_RATIO;
            nodes.push(Node::Rect(RectNode {
                x: cx - width / 2.0,
                y: cy - height / 2.0,
                width,
                height,
                fill: *color,
                radius: SWATCH_RADIUS,
                title: tooltip,
            }));
        }
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
    use crate::color::FeatureColorMap;
    use crate::config::LayoutConfig;
    use crate::layout::{layout, LayoutDescriptor};
    use crate::types::{CellValue, Matrix};

    fn grid() -> GridLayout {
        let m = Matrix::from_rows(vec![
            vec!["Duration".into(), "10".into(), "20".into()],
            vec!["Temperature".into(), "38".into(), "39".into()],
            vec!["Aerato".into(), "1".into(), CellValue::Empty],
        ]);
        let config = LayoutConfig::default().with_export_width(960).unwrap();
        match layout(&m, &config, &FeatureColorMap::default()) {
            LayoutDescriptor::Grid(g) => g,
            LayoutDescriptor::Empty(_) => panic!("expected grid"),
        }
    }

    fn swatches(scene: &Scene) -> Vec<&RectNode> {
        scene
            .nodes
            .iter()
            .filter_map(|n| match n {
                Node::Rect(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    fn texts(scene: &Scene) -> Vec<&str> {
        scene
            .nodes
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) => Some(t.text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_scene_dimensions() {
        let g = grid();
        let scene = Scene::build(&g, 0.0);
        assert_eq!(scene.width, 960.0);
        assert_eq!(scene.height, 192.0);
        assert_eq!(Scene::build(&g, 1500.0).width, 1500.0);
    }

    #[test]
    fn test_scene_contents() {
        let scene = Scene::build(&grid(), 0.0);
        assert_eq!(
            texts(&scene),
            vec!["Duration", "10s", "20s", "Temperature", "38°", "39°", "Aerato"]
        );
        let rects = swatches(&scene);
        assert_eq!(rects.len(), 1);
        let swatch = rects[0];
        assert_eq!(swatch.width, 360.0);
        assert_eq!(swatch.x, 180.0);
        assert_eq!(swatch.title.as_deref(), Some("Aerato - Step 1"));
    }

    #[derive(Default)]
    struct Recorder {
        drawn: Vec<Node>,
    }

    impl RenderBackend for Recorder {
        fn fill_rect(&mut self, rect: &RectNode) {
            self.drawn.push(Node::Rect(rect.clone()));
        }

        fn line(&mut self, line: &LineNode) {
            self.drawn.push(Node::Line(line.clone()));
        }

        fn text(&mut self, text: &TextNode) {
            self.drawn.push(Node::Text(text.clone()));
        }

        fn width(&self) -> u32 {
            0
        }

        fn height(&self) -> u32 {
            0
        }
    }

    #[test]
    fn test_paint_in_order() {
        let scene = Scene::build(&grid(), 0.0);
        let mut recorder = Recorder::default();
        assert!(scene.paint(&mut recorder, || true));
        assert_eq!(recorder.drawn, scene.nodes);
    }

    #[test]
    fn test_paint_stops_when_asked() {
        let scene = Scene::build(&grid(), 0.0);
        let mut recorder = Recorder::default();
        let mut budget = 3;
        let finished = scene.paint(&mut recorder, || {
            budget -= 1;
            budget >= 0
        });
        assert!(!finished);
        assert_eq!(recorder.drawn, scene.nodes[..3].to_vec());
    }

    #[test]
    fn test_no_separator_after_last_row() {
        let scene = Scene::build(&grid(), 0.0);
        let separators = scene
            .nodes
            .iter()
            .filter(|n| matches!(n, Node::Line(l) if l.direction == Direction::Horizontal))
            .count();
        assert_eq!(separators, 2);
    }
}
