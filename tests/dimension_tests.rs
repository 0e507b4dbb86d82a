//! Column and row dimension tests for tlview
//!
//! Tests for the shared step column width, the suggested export width, and
//! content-driven heights of rotated-text rows.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_lossless
)]

mod common;

use test_case::test_case;
use tlview::config::{FIXED_COLUMN_WIDTH_PX, MIN_EXPORT_WIDTH_PX};
use tlview::layout::{column_width, row_height, suggested_export_width};
use tlview::{LayoutConfig, RoleKind, TlviewError};

#[test_case(1)]
#[test_case(2)]
#[test_case(7)]
#[test_case(23)]
#[test_case(240)]
fn test_columns_fill_export_width(steps: usize) {
    for width in [800_u32, 1001, 1920, 4096] {
        let config = LayoutConfig::default().with_export_width(width).unwrap();
        let col = column_width(&config, steps).unwrap();
        let total = col * steps as f32 + FIXED_COLUMN_WIDTH_PX as f32;
        assert!((total - width as f32).abs() < 0.5, "{steps} steps at {width}: {total}");
    }
}

#[test]
fn test_zero_steps_is_an_error() {
    let err = column_width(&LayoutConfig::default(), 0).unwrap_err();
    assert!(matches!(err, TlviewError::ZeroStepCount));
}

#[test_case(0, 1920 ; "no steps keeps the default")]
#[test_case(1, 240)]
#[test_case(2, 320)]
#[test_case(30, 2560)]
fn test_suggested_export_width(steps: usize, expected: u32) {
    assert_eq!(suggested_export_width(steps), expected);
}

#[test]
fn test_suggestion_may_fall_below_user_floor() {
    assert!(suggested_export_width(2) < MIN_EXPORT_WIDTH_PX);
    let config = LayoutConfig::default().with_suggested_export_width(suggested_export_width(2));
    assert_eq!(config.export_width_px(), 320);
    assert_eq!(column_width(&config, 2).unwrap(), 80.0);
}

#[test]
fn test_rotated_rows_grow_monotonically() {
    let config = LayoutConfig::default();
    let floor = (config.font_size_px() * 4 + config.special_row_padding_px()) as f32;
    for role in [RoleKind::Music, RoleKind::Aroma] {
        let mut previous = 0.0;
        for len in 0..60 {
            let h = row_height(&config, role, len);
            assert!(h >= floor, "{role:?} len {len}: {h} < {floor}");
            assert!(h >= previous, "{role:?} shrank at len {len}");
            previous = h;
        }
    }
}

#[test]
fn test_other_rows_use_regular_height() {
    let config = LayoutConfig::default().with_regular_row_height(90).unwrap();
    for role in [
        RoleKind::Duration,
        RoleKind::Temperature,
        RoleKind::Color,
        RoleKind::Generic,
    ] {
        assert_eq!(row_height(&config, role, 500), 90.0);
    }
}

#[test]
fn test_music_row_height_from_longest_value() {
    let m = common::MatrixBuilder::new()
        .row("Duration", &["10", "20"])
        .row("Temperature", &["38", "39"])
        .row("Musica", &["Jazz", "Ambient Chillout"])
        .build();
    let config = common::suggested_config(&m);
    let grid = common::grid(&m, &config);
    // 16 characters at 14 px: 16 * 14 * 0.7 + 20.
    assert!(common::approx_eq(grid.rows[2].height, 176.8));
    assert!(common::approx_eq(grid.total_height(), 64.0 + 64.0 + 176.8));
}
