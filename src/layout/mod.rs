//! Layout engine for the timeline grid.
//!
//! This module handles:
//! - Column widths and row heights from configuration and content
//! - Classifying rows and rendering each step cell into a descriptor
//! - Pre-computing cell positions for drawing and hit testing
//! - Horizontal scroll state of the on-screen view

pub mod dimensions;
mod grid;
mod viewport;

pub use dimensions::{column_width, row_height, suggested_export_width};
pub use grid::{
    layout, CellLayout, CellRect, EmptyLayout, EmptyReason, GridLayout, Hit, LayoutDescriptor,
    RowLayout, EMPTY_MESSAGE,
};
pub use viewport::Viewport;
