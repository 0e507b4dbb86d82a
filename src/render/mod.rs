//! Rendering engine with pluggable backends.
//!
//! This module provides:
//! - The backend-agnostic [`Scene`] built from a grid layout
//! - A software rasterizer producing PNG bytes
//! - An SVG writer

pub mod backend;
pub mod font;
pub mod raster;
pub mod scene;
pub mod svg;

pub use backend::RenderBackend;
pub use raster::{RasterCanvas, MAX_CANVAS_DIMENSION};
pub use scene::{Direction, LineNode, Node, RectNode, Scene, TextAlign, TextNode};
pub use svg::SvgWriter;

/// Device pixels per logical pixel for raster output.
pub const RASTER_SCALE: f32 = 2.0;
