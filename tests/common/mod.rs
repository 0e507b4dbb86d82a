//! Common test utilities for tlview integration tests.
//!
//! Provides a small matrix builder and helpers for unwrapping layouts.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_possible_truncation,
    clippy::cast_lossless
)]

use tlview::{layout, CellValue, FeatureColorMap, GridLayout, LayoutConfig, LayoutDescriptor, Matrix};

/// Builder for a matrix, one feature row at a time.
#[derive(Default)]
pub struct MatrixBuilder {
    rows: Vec<Vec<CellValue>>,
}

impl MatrixBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row: the label followed by one value per step.
    #[must_use]
    pub fn row<V: Into<CellValue> + Clone>(mut self, label: &str, values: &[V]) -> Self {
        let mut row = vec![CellValue::from(label)];
        row.extend(values.iter().cloned().map(Into::into));
        self.rows.push(row);
        self
    }

    pub fn build(self) -> Matrix {
        Matrix::try_from_rows(self.rows).expect("builder rows must be rectangular")
    }
}

/// Parse a matrix from JSON, as a host would send it.
pub fn matrix_json(json: &str) -> Matrix {
    serde_json::from_str(json).expect("valid matrix JSON")
}

/// The sample program used across tests: two steps, one generic feature.
pub fn sample_program() -> Matrix {
    matrix_json(r#"[["Duration", "10", "20"], ["Temperature", "38", "39"], ["Aerato", "1", "0"]]"#)
}

/// Lay out with default colors and unwrap the grid.
pub fn grid(matrix: &Matrix, config: &LayoutConfig) -> GridLayout {
    match layout(matrix, config, &FeatureColorMap::default()) {
        LayoutDescriptor::Grid(grid) => grid,
        LayoutDescriptor::Empty(empty) => panic!("expected a grid, got {:?}", empty.reason),
    }
}

/// Config with the export width the viewer would suggest for `matrix`.
pub fn suggested_config(matrix: &Matrix) -> LayoutConfig {
    LayoutConfig::default()
        .with_suggested_export_width(tlview::layout::suggested_export_width(matrix.step_count()))
}

pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}
