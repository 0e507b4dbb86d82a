//! Timeline layout: rows, step columns and per-cell descriptors.
//!
//! Positions are computed once per layout pass, so hit testing and scene
//! building are simple lookups.

use serde::{Deserialize, Serialize};

use super::dimensions::{column_width, column_width_for, longest_text_len, row_height};
use crate::cells::{self, CellDescriptor, TextOrientation};
use crate::classify::{classify, RoleKind};
use crate::color::FeatureColorMap;
use crate::config::{LayoutConfig, FIXED_COLUMN_WIDTH_PX};
use crate::error::Result;
use crate::types::{Matrix, Row};

/// Message shown in place of the timeline when there is nothing to lay out.
pub const EMPTY_MESSAGE: &str = "Upload an Excel file to see the timeline";

/// Result of a layout pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LayoutDescriptor {
    /// Nothing to draw; the presentation shows a placeholder instead.
    Empty(EmptyLayout),
    Grid(GridLayout),
}

/// Why a layout has no grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmptyReason {
    NoRows,
    NoColumns,
    /// Only the label column is present.
    NoSteps,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyLayout {
    pub reason: EmptyReason,
    pub message: String,
}

impl EmptyLayout {
    fn new(reason: EmptyReason) -> Self {
        Self {
            reason,
            message: EMPTY_MESSAGE.to_string(),
        }
    }
}

/// Computed timeline grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridLayout {
    pub font_size_px: u32,
    pub step_count: usize,
    pub fixed_column_width: f32,
    /// Shared width of every step column.
    pub column_width: f32,
    /// Left edges: label column, then each step column, then the final edge.
    pub col_positions: Vec<f32>,
    /// Top edge of each row, then the final edge.
    pub row_positions: Vec<f32>,
    pub rows: Vec<RowLayout>,
}

/// One laid-out feature row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowLayout {
    pub index: usize,
    pub label: String,
    pub role: RoleKind,
    pub height: f32,
    pub label_orientation: TextOrientation,
    pub cells: Vec<CellLayout>,
}

/// One step cell, or a merged run of steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellLayout {
    /// First step covered.
    pub step: usize,
    /// Number of steps covered (more than 1 only for a merged Music row).
    pub span: usize,
    /// None when the cell shows no mark.
    pub content: Option<CellDescriptor>,
}

/// Rectangle representing a cell's bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// What lies under a point of the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit<'a> {
    pub row: usize,
    /// None over the label column.
    pub step: Option<usize>,
    pub cell: Option<&'a CellLayout>,
}

impl Hit<'_> {
    pub fn tooltip(&self) -> Option<&str> {
        self.cell
            .and_then(|c| c.content.as_ref())
            .and_then(|d| d.tooltip.as_deref())
    }
}

/// Lay out a matrix.
///
/// Never fails: an empty matrix, or one with no step columns, yields
/// [`LayoutDescriptor::Empty`].
pub fn layout(matrix: &Matrix, config: &LayoutConfig, colors: &FeatureColorMap) -> LayoutDescriptor {
    if matrix.row_count() == 0 {
        return LayoutDescriptor::Empty(EmptyLayout::new(EmptyReason::NoRows));
    }
    if matrix.column_count() == 0 {
        return LayoutDescriptor::Empty(EmptyLayout::new(EmptyReason::NoColumns));
    }
    let step_count = matrix.step_count();
    let Ok(col_width) = column_width(config, step_count) else {
        return LayoutDescriptor::Empty(EmptyLayout::new(EmptyReason::NoSteps));
    };

    let rows: Vec<RowLayout> = matrix
        .rows()
        .map(|row| layout_row(row, config, colors))
        .collect();

    let grid = GridLayout::assemble(config.font_size_px(), step_count, col_width, rows);
    tracing::debug!(
        rows = grid.rows.len(),
        steps = step_count,
        column_width = col_width,
        height = grid.total_height(),
        "layout computed"
    );
    LayoutDescriptor::Grid(grid)
}

fn layout_row(row: Row<'_>, config: &LayoutConfig, colors: &FeatureColorMap) -> RowLayout {
    let label = row.label();
    let role = classify(row.index, &label);
    let steps = row.steps();
    let height = row_height(config, role, longest_text_len(steps));

    let cells = if role == RoleKind::Music && config.merge_music_row() {
        // A merged Music row shows the first step's value across all steps.
        let first = steps.first().cloned().unwrap_or_default();
        vec![CellLayout {
            step: 0,
            span: steps.len(),
            content: cells::render(role, &first, 0, &label, colors),
        }]
    } else {
        steps
            .iter()
            .enumerate()
            .map(|(step, value)| CellLayout {
                step,
                span: 1,
                content: cells::render(role, value, step, &label, colors),
            })
            .collect()
    };

    let label_orientation = if role == RoleKind::Aroma {
        TextOrientation::Vertical
    } else {
        TextOrientation::Horizontal
    };

    RowLayout {
        index: row.index,
        label: label.into_owned(),
        role,
        height,
        label_orientation,
        cells,
    }
}

impl LayoutDescriptor {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Empty(_))
    }

    pub fn as_grid(&self) -> Option<&GridLayout> {
        match self {
            Self::Grid(grid) => Some(grid),
            Self::Empty(_) => None,
        }
    }

    /// Natural width of the content (0 for a placeholder).
    pub fn total_width(&self) -> f32 {
        self.as_grid().map_or(0.0, GridLayout::total_width)
    }

    /// Natural height of the content (0 for a placeholder).
    pub fn total_height(&self) -> f32 {
        self.as_grid().map_or(0.0, GridLayout::total_height)
    }
}

impl GridLayout {
    #[allow(clippy::cast_precision_loss)]
    fn assemble(font_size_px: u32, step_count: usize, column_width: f32, rows: Vec<RowLayout>) -> Self {
        let fixed = FIXED_COLUMN_WIDTH_PX as f32;
        let mut col_positions = Vec::with_capacity(step_count + 2);
        col_positions.push(0.0);
        for step in 0..=step_count {
            // Direct product instead of a running sum keeps edges exact.
            col_positions.push(fixed + column_width * step as f32);
        }

        let mut row_positions = Vec::with_capacity(rows.len() + 1);
        let mut y: f32 = 0.0;
        for row in &rows {
            row_positions.push(y);
            y += row.height;
        }
        row_positions.push(y); // Final edge

        Self {
            font_size_px,
            step_count,
            fixed_column_width: fixed,
            column_width,
            col_positions,
            row_positions,
            rows,
        }
    }

    /// Re-flow the step columns for a different total width. Row heights do
    /// not depend on width and are kept.
    pub fn with_width(&self, total_width: u32) -> Result<Self> {
        let col_width = column_width_for(total_width, self.step_count)?;
        Ok(Self::assemble(
            self.font_size_px,
            self.step_count,
            col_width,
            self.rows.clone(),
        ))
    }

    /// Get total width of the grid
    pub fn total_width(&self) -> f32 {
        self.col_positions.last().copied().unwrap_or(0.0)
    }

    /// Get total height of the grid
    pub fn total_height(&self) -> f32 {
        self.row_positions.last().copied().unwrap_or(0.0)
    }

    /// Bounds of the label cell of a row.
    pub fn label_rect(&self, row: usize) -> CellRect {
        let y = self.row_positions.get(row).copied().unwrap_or(0.0);
        CellRect {
            x: 0.0,
            y,
            width: self.fixed_column_width,
            height: self.row_height(row),
        }
    }

    /// Bounds of a (possibly merged) cell.
    pub fn cell_rect(&self, row: usize, cell: &CellLayout) -> CellRect {
        let x = self.step_x(cell.step);
        let end = self.step_x(cell.step + cell.span);
        let y = self.row_positions.get(row).copied().unwrap_or(0.0);
        CellRect {
            x,
            y,
            width: end - x,
            height: self.row_height(row),
        }
    }

    /// Left edge of a step column (or the final edge for `step_count`).
    pub fn step_x(&self, step: usize) -> f32 {
        self.col_positions
            .get(step + 1)
            .copied()
            .unwrap_or_else(|| self.total_width())
    }

    pub fn row_height(&self, row: usize) -> f32 {
        self.rows.get(row).map_or(0.0, |r| r.height)
    }

    /// Find row at y position (binary search)
    pub fn row_at_y(&self, y: f32) -> Option<usize> {
        find_band(&self.row_positions, y)
    }

    /// Find column at x position: 0 is the label column, `n + 1` is step `n`.
    pub fn col_at_x(&self, x: f32) -> Option<usize> {
        find_band(&self.col_positions, x)
    }

    /// Row, step and cell under a point in grid coordinates.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<Hit<'_>> {
        let row = self.row_at_y(y)?;
        let col = self.col_at_x(x)?;
        let step = col.checked_sub(1);
        let cell = step.and_then(|s| {
            self.rows
                .get(row)?
                .cells
                .iter()
                .find(|c| s >= c.step && s < c.step + c.span)
        });
        Some(Hit { row, step, cell })
    }

    /// Labels of the rows painted with per-feature colors; these are the
    /// features whose color a host should let the user pick.
    pub fn color_editable_features(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for row in &self.rows {
            let label = row.label.as_str();
            if row.role == RoleKind::Generic
                && !label.trim().is_empty()
                && !out.iter().any(|l| l.eq_ignore_ascii_case(label))
            {
                out.push(label);
            }
        }
        out
    }
}

/// Index of the band `[edges[i], edges[i + 1])` containing `v`, or None
/// outside the edges.
fn find_band(edges: &[f32], v: f32) -> Option<usize> {
    let last = edges.len().checked_sub(1)?;
    let first = *edges.first()?;
    let end = *edges.last()?;
    if v < first || v >= end {
        return None;
    }
    let i = match edges.binary_search_by(|pos| pos.partial_cmp(&v).unwrap_or(std::cmp::Ordering::Equal)) {
        Ok(i) => i,
        Err(i) => i.saturating_sub(1),
    };
    Some(i.min(last.saturating_sub(1)))
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
    use crate::cells::CellContent;
    use crate::types::CellValue;

    fn matrix(rows: &[&[&str]]) -> Matrix {
        Matrix::from_rows(
            rows.iter()
                .map(|r| r.iter().map(|&v| CellValue::from(v)).collect())
                .collect(),
        )
    }

    fn grid(m: &Matrix, config: &LayoutConfig) -> GridLayout {
        match layout(m, config, &FeatureColorMap::default()) {
            LayoutDescriptor::Grid(g) => g,
            LayoutDescriptor::Empty(e) => panic!("unexpected placeholder: {:?}", e.reason),
        }
    }

    #[test]
    fn test_positions() {
        let m = matrix(&[
            &["Duration", "10", "20"],
            &["Temperature", "38", "39"],
            &["Aerato", "1", "0"],
        ]);
        let config = LayoutConfig::default().with_export_width(960).unwrap();
        let g = grid(&m, &config);
        assert_eq!(g.column_width, 400.0);
        assert_eq!(g.col_positions, vec![0.0, 160.0, 560.0, 960.0]);
        assert_eq!(g.row_positions, vec![0.0, 64.0, 128.0, 192.0]);
        assert_eq!(g.total_width(), 960.0);
        assert_eq!(g.total_height(), 192.0);
    }

    #[test]
    fn test_placeholders() {
        let config = LayoutConfig::default();
        let colors = FeatureColorMap::default();
        let d = layout(&Matrix::default(), &config, &colors);
        assert!(matches!(
            d,
            LayoutDescriptor::Empty(EmptyLayout {
                reason: EmptyReason::NoRows,
                ..
            })
        ));
        let d = layout(&Matrix::from_rows(vec![vec![]]), &config, &colors);
        assert!(matches!(
            d,
            LayoutDescriptor::Empty(EmptyLayout {
                reason: EmptyReason::NoColumns,
                ..
            })
        ));
        let d = layout(&matrix(&[&["Duration"]]), &config, &colors);
        assert!(matches!(
            d,
            LayoutDescriptor::Empty(EmptyLayout {
                reason: EmptyReason::NoSteps,
                ..
            })
        ));
        assert!(d.is_placeholder());
        assert_eq!(d.total_width(), 0.0);
    }

    #[test]
    fn test_music_row_merged() {
        let m = matrix(&[
            &["Duration", "10", "20", "30"],
            &["Temperature", "38", "39", "40"],
            &["Musica", "Bolero", "", ""],
        ]);
        let g = grid(&m, &LayoutConfig::default());
        let music = &g.rows[2];
        assert_eq!(music.role, RoleKind::Music);
        assert_eq!(music.cells.len(), 1);
        assert_eq!(music.cells[0].span, 3);
        let rect = g.cell_rect(2, &music.cells[0]);
        assert_eq!(rect.x, 160.0);
        assert_eq!(rect.width, g.total_width() - 160.0);
    }

    #[test]
    fn test_music_row_unmerged() {
        let m = matrix(&[
            &["Duration", "10", "20"],
            &["Temperature", "38", "39"],
            &["Music", "Bolero", "Jazz"],
        ]);
        let config = LayoutConfig::default().with_merge_music_row(false);
        let g = grid(&m, &config);
        let cells = &g.rows[2].cells;
        assert_eq!(cells.len(), 2);
        assert!(cells.iter().all(|c| c.span == 1));
        assert!(matches!(
            &cells[1].content,
            Some(CellDescriptor {
                content: CellContent::Text { text, .. },
                ..
            }) if text == "Jazz"
        ));
    }

    #[test]
    fn test_aroma_label_rotated() {
        let m = matrix(&[
            &["Duration", "10"],
            &["Temperature", "38"],
            &["Aroma", "Lavanda"],
            &["Aerato", "1"],
        ]);
        let g = grid(&m, &LayoutConfig::default());
        assert_eq!(g.rows[2].label_orientation, TextOrientation::Vertical);
        assert_eq!(g.rows[3].label_orientation, TextOrientation::Horizontal);
    }

    #[test]
    fn test_hit_test() {
        let m = matrix(&[
            &["Duration", "10", "20"],
            &["Temperature", "38", "39"],
            &["Aerato", "1", "0"],
        ]);
        let config = LayoutConfig::default().with_export_width(960).unwrap();
        let g = grid(&m, &config);

        let hit = g.hit_test(200.0, 150.0).unwrap();
        assert_eq!(hit.row, 2);
        assert_eq!(hit.step, Some(0));
        assert_eq!(hit.tooltip(), Some("Aerato - Step 1"));

        let hit = g.hit_test(600.0, 150.0).unwrap();
        assert_eq!(hit.step, Some(1));
        assert_eq!(hit.tooltip(), None);

        let hit = g.hit_test(10.0, 10.0).unwrap();
        assert_eq!(hit.step, None);

        assert!(g.hit_test(960.0, 10.0).is_none());
        assert!(g.hit_test(10.0, 192.0).is_none());
        assert!(g.hit_test(-1.0, 10.0).is_none());
    }

    #[test]
    fn test_with_width_keeps_heights() {
        let m = matrix(&[
            &["Duration", "10", "20"],
            &["Temperature", "38", "39"],
            &["Aroma", "Lavanda e rosmarino", ""],
        ]);
        let g = grid(&m, &LayoutConfig::default());
        let wide = g.with_width(2160).unwrap();
        assert_eq!(wide.column_width, 1000.0);
        assert_eq!(wide.total_width(), 2160.0);
        assert_eq!(wide.row_positions, g.row_positions);
    }

    #[test]
    fn test_color_editable_features() {
        let m = matrix(&[
            &["Aerato", "10"],
            &["Temperature", "38"],
            &["Pioggia interna", "1"],
            &["Musica", "x"],
            &["Colore", "#fff"],
            &["aerato", "1"],
            &["", "1"],
            &["Nebulizzazione", "0"],
        ]);
        let g = grid(&m, &LayoutConfig::default());
        assert_eq!(
            g.color_editable_features(),
            vec!["Pioggia interna", "aerato", "Nebulizzazione"]
        );
    }
}
