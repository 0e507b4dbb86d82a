//! Horizontal scroll state of the on-screen timeline.
//!
//! The timeline scrolls sideways only; every row is always visible.

use super::GridLayout;

/// Visible window onto the timeline content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Horizontal scroll position in content coordinates
    pub scroll_x: f32,
    /// Viewport width in pixels
    pub width: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0)
    }
}

impl Viewport {
    pub fn new(width: f32) -> Self {
        Self {
            scroll_x: 0.0,
            width: width.max(0.0),
        }
    }

    /// Width the live content occupies: the container fills the viewport
    /// and grows to fit wider content.
    pub fn content_width(&self, grid: &GridLayout) -> f32 {
        self.width.max(grid.total_width())
    }

    /// Largest valid scroll offset for the grid.
    pub fn max_scroll_x(&self, grid: &GridLayout) -> f32 {
        (grid.total_width() - self.width).max(0.0)
    }

    /// Scroll to `x`, clamped to the content.
    pub fn set_scroll(&mut self, x: f32, grid: &GridLayout) {
        self.scroll_x = x.clamp(0.0, self.max_scroll_x(grid));
    }

    pub fn reset_scroll(&mut self) {
        self.scroll_x = 0.0;
    }

    /// Visible step range (inclusive) at the current scroll position, or
    /// None when only the label column is in view.
    pub fn visible_steps(&self, grid: &GridLayout) -> Option<(usize, usize)> {
        if grid.step_count == 0 {
            return None;
        }
        let last_step = grid.step_count - 1;
        let left = self.scroll_x.max(grid.fixed_column_width);
        let right = self.scroll_x + self.width;
        if right <= grid.fixed_column_width || left >= grid.total_width() {
            return None;
        }
        let start = grid.col_at_x(left).map_or(0, |c| c.saturating_sub(1));
        let end = grid
            .col_at_x(right)
            .map_or(last_step, |c| c.saturating_sub(1));
        Some((start.min(last_step), end.min(last_step)))
    }

    /// Convert content coordinates to screen coordinates
    pub fn to_screen(&self, x: f32, y: f32) -> (f32, f32) {
        (x - self.scroll_x, y)
    }

    /// Convert screen coordinates to content coordinates
    pub fn to_content(&self, screen_x: f32, screen_y: f32) -> (f32, f32) {
        (screen_x + self.scroll_x, screen_y)
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

    /// 10 steps of 100 px each after the 160 px label column.
    fn grid() -> GridLayout {
        let mut row: Vec<CellValue> = vec!["Duration".into()];
        row.extend((0..10).map(|i| CellValue::Number(f64::from(i))));
        let m = Matrix::from_rows(vec![row]);
        let config = LayoutConfig::default().with_export_width(1160).unwrap();
        match layout(&m, &config, &FeatureColorMap::default()) {
            LayoutDescriptor::Grid(g) => g,
            LayoutDescriptor::Empty(_) => panic!("expected grid"),
        }
    }

    #[test]
    fn test_scroll_clamped() {
        let g = grid();
        let mut vp = Viewport::new(500.0);
        vp.set_scroll(10_000.0, &g);
        assert_eq!(vp.scroll_x, 660.0);
        vp.set_scroll(-5.0, &g);
        assert_eq!(vp.scroll_x, 0.0);
    }

    #[test]
    fn test_visible_steps() {
        let g = grid();
        let mut vp = Viewport::new(500.0);
        assert_eq!(vp.visible_steps(&g), Some((0, 3)));
        vp.set_scroll(400.0, &g);
        assert_eq!(vp.visible_steps(&g), Some((2, 7)));
        vp.set_scroll(660.0, &g);
        assert_eq!(vp.visible_steps(&g), Some((5, 9)));
    }

    #[test]
    fn test_label_only_view() {
        let g = grid();
        let vp = Viewport::new(100.0);
        assert_eq!(vp.visible_steps(&g), None);
    }

    #[test]
    fn test_content_width_fills_viewport() {
        let g = grid();
        assert_eq!(Viewport::new(2000.0).content_width(&g), 2000.0);
        assert_eq!(Viewport::new(500.0).content_width(&g), 1160.0);
    }

    #[test]
    fn test_coordinate_round_trip() {
        let mut vp = Viewport::new(500.0);
        vp.set_scroll(120.0, &grid());
        assert_eq!(vp.to_screen(300.0, 5.0), (180.0, 5.0));
        assert_eq!(vp.to_content(180.0, 5.0), (300.0, 5.0));
    }
}
