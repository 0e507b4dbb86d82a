//! Render backend trait for pluggable rendering implementations.
//!
//! This module defines the `RenderBackend` trait that abstracts drawing
//! operations, allowing the raster and SVG backends to paint the same scene
//! interchangeably.

use super::scene::{LineNode, Node, RectNode, TextNode};

/// Trait for render backends
///
/// Coordinates are logical pixels; a backend applies its own device scale.
pub trait RenderBackend {
    /// Draw a filled rectangle
    fn fill_rect(&mut self, rect: &RectNode);

    /// Draw a 1 px axis-aligned rule
    fn line(&mut self, line: &LineNode);

    /// Draw a run of text
    fn text(&mut self, text: &TextNode);

    /// Draw any scene node
    fn draw(&mut self, node: &Node) {
        match node {
            Node::Rect(r) => self.fill_rect(r),
            Node::Line(l) => self.line(l),
            Node::Text(t) => self.text(t),
        }
    }

    /// Get the device width
    fn width(&self) -> u32;

    /// Get the device height
    fn height(&self) -> u32;
}
