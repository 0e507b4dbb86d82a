//! Export tests for tlview
//!
//! Tests for raster and vector artifacts: dimensions, content, scroll
//! independence, failure reporting, release of off-screen targets and
//! background exports.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use tlview::{
    layout, ExportFormat, ExportRenderer, ExportRequest, FeatureColorMap, LayoutConfig, TimelineView,
    TlviewError,
};

fn decode(bytes: &[u8]) -> image::RgbaImage {
    image::load_from_memory(bytes).unwrap().to_rgba8()
}

#[test]
fn test_raster_is_twice_target_width() {
    let m = common::sample_program();
    let descriptor = layout(&m, &common::suggested_config(&m), &FeatureColorMap::default());
    let renderer = ExportRenderer::new();
    for width in [320_u32, 800, 1920] {
        let artifact = renderer.export(ExportFormat::Raster, &descriptor, width).unwrap();
        assert_eq!(artifact.logical_width, width as f32);
        assert_eq!(artifact.scale, 2.0);
        let img = decode(&artifact.bytes);
        assert_eq!(img.width(), width * 2);
        assert_eq!(img.height(), 192 * 2);
    }
    assert_eq!(renderer.live_targets(), 0);
}

#[test]
fn test_raster_background_is_opaque_white() {
    let m = common::sample_program();
    let descriptor = layout(&m, &common::suggested_config(&m), &FeatureColorMap::default());
    let artifact = ExportRenderer::new()
        .export(ExportFormat::Raster, &descriptor, 800)
        .unwrap();
    let img = decode(&artifact.bytes);
    assert_eq!(img.get_pixel(img.width() - 3, 3).0, [255, 255, 255, 255]);
    assert!(img.pixels().all(|p| p.0[3] == 255));
}

#[test]
fn test_raster_paints_swatch() {
    let m = common::sample_program();
    let descriptor = layout(&m, &common::suggested_config(&m), &FeatureColorMap::default());
    let artifact = ExportRenderer::new()
        .export(ExportFormat::Raster, &descriptor, 320)
        .unwrap();
    let img = decode(&artifact.bytes);
    let aerato = FeatureColorMap::default().get("aerato").to_rgba();
    // Center of (row 2, step 0) and (row 2, step 1), in device pixels.
    assert_eq!(img.get_pixel(200 * 2, 160 * 2).0, aerato);
    assert_eq!(img.get_pixel(280 * 2, 160 * 2).0, [255, 255, 255, 255]);
}

#[test]
fn test_raster_ignores_scroll_position() {
    let m = common::MatrixBuilder::new()
        .row("Duration", &["10"; 20])
        .row("Temperature", &["38"; 20])
        .row("Aerato", &["1"; 20])
        .build();
    let mut view = TimelineView::new(400.0);
    view.load_matrix(m);
    let before = view.export(ExportFormat::Raster).unwrap();
    view.set_scroll(500.0);
    assert_eq!(view.viewport().scroll_x, 500.0);
    let after = view.export(ExportFormat::Raster).unwrap();
    assert_eq!(before.bytes, after.bytes);
    assert_eq!(after.logical_width, 1760.0);
}

#[test]
fn test_vector_preserves_live_width() {
    let m = common::sample_program();
    let mut view = TimelineView::new(1000.0);
    view.load_matrix(m);
    let scene = view.visual_tree().unwrap();
    assert_eq!(scene.width, 1000.0);

    let artifact = view.export(ExportFormat::Vector).unwrap();
    assert_eq!(artifact.logical_width, 1000.0);
    assert_eq!(artifact.mime_type, "image/svg+xml");
    let svg = String::from_utf8(artifact.bytes).unwrap();
    assert!(svg.contains(r#"width="1000" height="192""#));
    assert!(svg.contains("<title>Aerato - Step 1</title>"));
    assert!(svg.contains(">10s</text>"));
    assert!(!svg.contains("Aerato - Step 2"));
}

#[test]
fn test_backend_failure_is_reported_and_releases_target() {
    let m = common::sample_program();
    let descriptor = layout(&m, &common::suggested_config(&m), &FeatureColorMap::default());
    let renderer = ExportRenderer::new();
    let err = renderer
        .export(ExportFormat::Raster, &descriptor, 50_000)
        .unwrap_err();
    assert!(matches!(err, TlviewError::ExportBackendFailure(_)));
    assert_eq!(renderer.live_targets(), 0);
    // A retry with corrected input succeeds.
    assert!(renderer.export(ExportFormat::Raster, &descriptor, 800).is_ok());
}

#[test]
fn test_placeholder_cannot_be_exported() {
    let descriptor = layout(
        &tlview::Matrix::default(),
        &LayoutConfig::default(),
        &FeatureColorMap::default(),
    );
    for format in [ExportFormat::Raster, ExportFormat::Vector] {
        let err = ExportRenderer::new().export(format, &descriptor, 800).unwrap_err();
        assert!(matches!(err, TlviewError::ExportBackendFailure(_)));
    }
}

#[test]
fn test_background_export() {
    let m = common::sample_program();
    let descriptor = layout(&m, &common::suggested_config(&m), &FeatureColorMap::default());
    let renderer = ExportRenderer::new();
    let handle = renderer.spawn_export(ExportRequest::Raster { descriptor, width: 800 });
    let artifact = handle.wait().unwrap();
    assert_eq!(artifact.filename, "timeline.png");
    assert_eq!(decode(&artifact.bytes).width(), 1600);
    assert_eq!(renderer.live_targets(), 0);
}

#[test]
fn test_raster_narrower_than_label_column_fails() {
    let m = common::sample_program();
    let descriptor = layout(&m, &common::suggested_config(&m), &FeatureColorMap::default());
    let renderer = ExportRenderer::new();
    let err = renderer
        .export(ExportFormat::Raster, &descriptor, 100)
        .unwrap_err();
    assert!(matches!(err, TlviewError::ExportBackendFailure(_)));
    assert_eq!(renderer.live_targets(), 0);
}
