//! `TimelineView`: the stateful entry point for hosts.
//!
//! This module ties together:
//! - The loaded matrix and the current configuration and feature colors
//! - The horizontal scroll state of the on-screen presentation
//! - Layout recomputation after every accepted change
//! - Exports, which snapshot the current state when started

use tracing::{debug, info};

use crate::color::FeatureColorMap;
use crate::config::LayoutConfig;
use crate::error::Result;
use crate::export::{Artifact, ExportFormat, ExportHandle, ExportRenderer, ExportRequest};
use crate::layout::{layout, suggested_export_width, LayoutDescriptor, Viewport};
use crate::render::Scene;
use crate::types::Matrix;

/// A timeline being viewed and edited.
#[derive(Debug, Clone)]
pub struct TimelineView {
    matrix: Matrix,
    config: LayoutConfig,
    colors: FeatureColorMap,
    viewport: Viewport,
    descriptor: LayoutDescriptor,
    renderer: ExportRenderer,
}

impl Default for TimelineView {
    fn default() -> Self {
        Self::new(Viewport::default().width)
    }
}

impl TimelineView {
    /// An empty view whose on-screen container is `viewport_width` px wide.
    pub fn new(viewport_width: f32) -> Self {
        Self::with_settings(viewport_width, LayoutConfig::default(), FeatureColorMap::default())
    }

    pub fn with_settings(viewport_width: f32, config: LayoutConfig, colors: FeatureColorMap) -> Self {
        let matrix = Matrix::default();
        let descriptor = layout(&matrix, &config, &colors);
        Self {
            matrix,
            config,
            colors,
            viewport: Viewport::new(viewport_width),
            descriptor,
            renderer: ExportRenderer::new(),
        }
    }

    /// Replace the matrix. The suggested export width is applied unless the
    /// user chose one, and scrolling returns to the start.
    pub fn load_matrix(&mut self, matrix: Matrix) {
        let suggested = suggested_export_width(matrix.step_count());
        self.config = self.config.with_suggested_export_width(suggested);
        self.matrix = matrix;
        self.viewport.reset_scroll();
        self.relayout();
        info!(
            rows = self.matrix.row_count(),
            steps = self.matrix.step_count(),
            export_width = self.config.export_width_px(),
            "Loaded matrix"
        );
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn colors(&self) -> &FeatureColorMap {
        &self.colors
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Current layout.
    pub fn layout(&self) -> &LayoutDescriptor {
        &self.descriptor
    }

    /// Export width advised for the loaded matrix.
    pub fn suggested_export_width(&self) -> u32 {
        suggested_export_width(self.matrix.step_count())
    }

    pub fn set_font_size(&mut self, px: u32) -> Result<()> {
        self.config = self.config.with_font_size(px)?;
        self.relayout();
        Ok(())
    }

    pub fn set_regular_row_height(&mut self, px: u32) -> Result<()> {
        self.config = self.config.with_regular_row_height(px)?;
        self.relayout();
        Ok(())
    }

    pub fn set_special_row_padding(&mut self, px: u32) -> Result<()> {
        self.config = self.config.with_special_row_padding(px)?;
        self.relayout();
        Ok(())
    }

    /// Set the export width. The choice survives later matrix loads.
    pub fn set_export_width(&mut self, px: u32) -> Result<()> {
        self.config = self.config.with_export_width(px)?;
        self.relayout();
        Ok(())
    }

    /// Drop a user-chosen export width in favor of the suggestion.
    pub fn reset_export_width(&mut self) {
        self.config = self
            .config
            .with_export_width_reset(self.suggested_export_width());
        self.relayout();
    }

    pub fn set_feature_color(&mut self, feature: &str, color_hex: &str) -> Result<()> {
        self.colors.set(feature, color_hex)?;
        self.relayout();
        Ok(())
    }

    pub fn set_merge_music_row(&mut self, merge: bool) {
        self.config = self.config.with_merge_music_row(merge);
        self.relayout();
    }

    /// Resize the on-screen container.
    pub fn resize(&mut self, viewport_width: f32) {
        self.viewport.width = viewport_width.max(0.0);
        self.clamp_scroll();
    }

    /// Scroll to an absolute offset, clamped to the content.
    pub fn set_scroll(&mut self, x: f32) {
        match self.descriptor.as_grid() {
            Some(grid) => self.viewport.set_scroll(x, grid),
            None => self.viewport.reset_scroll(),
        }
    }

    pub fn scroll_by(&mut self, dx: f32) {
        self.set_scroll(self.viewport.scroll_x + dx);
    }

    /// The realized on-screen scene, or None while showing the placeholder.
    pub fn visual_tree(&self) -> Option<Scene> {
        self.descriptor
            .as_grid()
            .map(|grid| Scene::build(grid, self.viewport.content_width(grid)))
    }

    /// Hover text for a point in viewport coordinates.
    pub fn tooltip_at(&self, screen_x: f32, screen_y: f32) -> Option<String> {
        let grid = self.descriptor.as_grid()?;
        let (x, y) = self.viewport.to_content(screen_x, screen_y);
        grid.hit_test(x, y)?.tooltip().map(str::to_string)
    }

    /// Labels of the rows whose color the host should offer to change.
    pub fn color_editable_features(&self) -> Vec<&str> {
        self.descriptor
            .as_grid()
            .map(|grid| grid.color_editable_features())
            .unwrap_or_default()
    }

    /// Export the current state and wait for the artifact.
    ///
    /// Raster output uses the configured export width; vector output
    /// serializes the on-screen scene as it is.
    pub fn export(&self, format: ExportFormat) -> Result<Artifact> {
        match format {
            ExportFormat::Raster => {
                self.renderer
                    .export(format, &self.descriptor, self.config.export_width_px())
            }
            ExportFormat::Vector => match self.visual_tree() {
                Some(scene) => self.renderer.export_scene(&scene),
                None => self.renderer.export(format, &self.descriptor, 0),
            },
        }
    }

    /// Start an export in the background from a snapshot of the current
    /// state. Later edits do not affect it.
    pub fn spawn_export(&self, format: ExportFormat) -> ExportHandle {
        let descriptor = self.descriptor.clone();
        self.renderer.spawn_export(match format {
            ExportFormat::Raster => ExportRequest::Raster {
                descriptor,
                width: self.config.export_width_px(),
            },
            ExportFormat::Vector => ExportRequest::Vector {
                descriptor,
                width: self.live_width(),
            },
        })
    }

    /// Off-screen export targets currently alive.
    pub fn live_export_targets(&self) -> usize {
        self.renderer.live_targets()
    }

    fn live_width(&self) -> f32 {
        self.descriptor
            .as_grid()
            .map_or(0.0, |grid| self.viewport.content_width(grid))
    }

    fn relayout(&mut self) {
        self.descriptor = layout(&self.matrix, &self.config, &self.colors);
        self.clamp_scroll();
        debug!(
            placeholder = self.descriptor.is_placeholder(),
            width = self.descriptor.total_width(),
            height = self.descriptor.total_height(),
            "Recomputed layout"
        );
    }

    fn clamp_scroll(&mut self) {
        self.set_scroll(self.viewport.scroll_x);
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
    use crate::config::WidthSource;
    use crate::error::TlviewError;
    use crate::types::CellValue;

    fn matrix(steps: usize) -> Matrix {
        let mut duration: Vec<CellValue> = vec!["Duration".into()];
        let mut temperature: Vec<CellValue> = vec!["Temperature".into()];
        let mut aerato: Vec<CellValue> = vec!["Aerato".into()];
        for i in 0..steps {
            duration.push(CellValue::Number(10.0));
            temperature.push(CellValue::Number(38.0));
            aerato.push(if i % 2 == 0 { "1".into() } else { "0".into() });
        }
        Matrix::from_rows(vec![duration, temperature, aerato])
    }

    #[test]
    fn test_load_applies_suggested_width() {
        let mut view = TimelineView::new(1280.0);
        view.load_matrix(matrix(2));
        assert_eq!(view.config().export_width_px(), 320);
        assert_eq!(view.config().export_width_source(), WidthSource::Suggested);
        assert_eq!(view.layout().total_width(), 320.0);
    }

    #[test]
    fn test_user_width_survives_reload() {
        let mut view = TimelineView::new(1280.0);
        view.set_export_width(1000).unwrap();
        view.load_matrix(matrix(30));
        assert_eq!(view.config().export_width_px(), 1000);
        view.reset_export_width();
        assert_eq!(view.config().export_width_px(), 160 + 30 * 80);
    }

    #[test]
    fn test_rejected_setter_keeps_layout() {
        let mut view = TimelineView::new(1280.0);
        view.load_matrix(matrix(2));
        let before = view.layout().clone();
        let err = view.set_font_size(25).unwrap_err();
        assert!(matches!(err, TlviewError::InvalidConfigValue { field: "fontSizePx", .. }));
        assert_eq!(view.config().font_size_px(), 14);
        assert_eq!(view.layout(), &before);
    }

    #[test]
    fn test_load_resets_scroll() {
        let mut view = TimelineView::new(500.0);
        view.load_matrix(matrix(20));
        view.set_scroll(300.0);
        assert_eq!(view.viewport().scroll_x, 300.0);
        view.load_matrix(matrix(20));
        assert_eq!(view.viewport().scroll_x, 0.0);
    }

    #[test]
    fn test_tooltip_follows_scroll() {
        let mut view = TimelineView::new(500.0);
        view.load_matrix(matrix(20));
        // Row 2 starts at y = 128; step 0 spans x 160..240.
        assert_eq!(view.tooltip_at(200.0, 150.0).as_deref(), Some("Aerato - Step 1"));
        view.set_scroll(160.0);
        // Content x 360 is step 2.
        assert_eq!(view.tooltip_at(200.0, 150.0).as_deref(), Some("Aerato - Step 3"));
        assert_eq!(view.tooltip_at(200.0, 10.0), None);
    }

    #[test]
    fn test_vector_export_matches_live_width() {
        let mut view = TimelineView::new(1280.0);
        view.load_matrix(matrix(2));
        let artifact = view.export(ExportFormat::Vector).unwrap();
        assert_eq!(artifact.logical_width, 1280.0);
        assert_eq!(artifact.filename, "timeline.svg");
    }

    #[test]
    fn test_spawned_vector_export_keeps_fractional_width() {
        let mut view = TimelineView::new(1000.5);
        view.load_matrix(matrix(2));
        let sync = view.export(ExportFormat::Vector).unwrap();
        let spawned = view.spawn_export(ExportFormat::Vector).wait().unwrap();
        assert_eq!(sync.logical_width, 1000.5);
        assert_eq!(spawned.logical_width, sync.logical_width);
        assert_eq!(spawned.bytes, sync.bytes);
    }

    #[test]
    fn test_export_snapshots_state() {
        let mut view = TimelineView::new(1280.0);
        view.load_matrix(matrix(2));
        view.set_feature_color("aerato", "#FF0000").unwrap();
        let handle = view.spawn_export(ExportFormat::Vector);
        view.set_feature_color("aerato", "#00FF00").unwrap();
        let svg = String::from_utf8(handle.wait().unwrap().bytes).unwrap();
        assert!(svg.contains("#FF0000"));
        assert!(!svg.contains("#00FF00"));
    }

    #[test]
    fn test_placeholder_export_fails() {
        let view = TimelineView::default();
        assert!(view.layout().is_placeholder());
        assert!(matches!(
            view.export(ExportFormat::Vector),
            Err(TlviewError::ExportBackendFailure(_))
        ));
        assert_eq!(view.live_export_targets(), 0);
    }
}
