//! Configuration and setter tests for tlview
//!
//! Tests for range validation, the user/suggested export width policy,
//! feature color edits and configuration JSON.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use test_case::test_case;
use tlview::error::Bound;
use tlview::{CellContent, LayoutConfig, TimelineView, TlviewError, WidthSource};

#[test]
fn test_font_size_25_is_rejected() {
    let mut view = TimelineView::new(1280.0);
    view.load_matrix(common::sample_program());
    let err = view.set_font_size(25).unwrap_err();
    match err {
        TlviewError::InvalidConfigValue {
            field,
            value,
            bound,
        } => {
            assert_eq!(field, "fontSizePx");
            assert_eq!(value, 25);
            assert_eq!(bound, Bound::Between(1, 20));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(view.config().font_size_px(), 14);
    assert_eq!(
        err_message(LayoutConfig::default().with_font_size(25)),
        "Invalid value 25 for fontSizePx: must be between 1 and 20"
    );
}

fn err_message(result: tlview::Result<LayoutConfig>) -> String {
    result.unwrap_err().to_string()
}

#[test_case(0, false)]
#[test_case(1, true)]
#[test_case(20, true)]
#[test_case(21, false)]
fn test_font_size_bounds(px: u32, ok: bool) {
    assert_eq!(LayoutConfig::default().with_font_size(px).is_ok(), ok);
}

#[test_case(29, false)]
#[test_case(30, true)]
#[test_case(200, true)]
#[test_case(201, false)]
fn test_row_height_bounds(px: u32, ok: bool) {
    assert_eq!(LayoutConfig::default().with_regular_row_height(px).is_ok(), ok);
}

#[test_case(9, false)]
#[test_case(10, true)]
#[test_case(100, true)]
#[test_case(101, false)]
fn test_padding_bounds(px: u32, ok: bool) {
    assert_eq!(LayoutConfig::default().with_special_row_padding(px).is_ok(), ok);
}

#[test]
fn test_export_width_floor() {
    let err = LayoutConfig::default().with_export_width(799).unwrap_err();
    assert!(matches!(
        err,
        TlviewError::InvalidConfigValue {
            bound: Bound::AtLeast(800),
            ..
        }
    ));
    let config = LayoutConfig::default().with_export_width(800).unwrap();
    assert_eq!(config.export_width_source(), WidthSource::User);
}

#[test]
fn test_setters_relayout() {
    let mut view = TimelineView::new(1280.0);
    view.load_matrix(common::sample_program());
    view.set_regular_row_height(100).unwrap();
    assert_eq!(view.layout().total_height(), 300.0);
    view.set_export_width(1000).unwrap();
    assert_eq!(view.layout().total_width(), 1000.0);
}

#[test]
fn test_feature_color_edit() {
    let mut view = TimelineView::new(1280.0);
    view.load_matrix(common::sample_program());
    assert!(view.set_feature_color("aerato", "not a color").is_err());
    view.set_feature_color("Aerato", "#0F0").unwrap();
    let grid = view.layout().as_grid().unwrap();
    assert_eq!(
        grid.rows[2].cells[0].content.as_ref().unwrap().content,
        CellContent::Swatch {
            color: tlview::Rgb::new(0, 255, 0)
        }
    );
    assert_eq!(view.color_editable_features(), vec!["Aerato"]);
}

#[test]
fn test_config_json_defaults() {
    let config: LayoutConfig = serde_json::from_str(r#"{"fontSizePx": 12}"#).unwrap();
    assert_eq!(config.font_size_px(), 12);
    assert_eq!(config.regular_row_height_px(), 64);
    assert_eq!(config.export_width_px(), 1920);
    assert!(config.merge_music_row());
}

#[test]
fn test_config_json_validates() {
    assert!(serde_json::from_str::<LayoutConfig>(r#"{"fontSizePx": 40}"#).is_err());
    assert!(serde_json::from_str::<LayoutConfig>(r#"{"exportWidthPx": 500}"#).is_err());
    assert!(serde_json::from_str::<LayoutConfig>(r#"{"fontSize": 12}"#).is_err());
}
