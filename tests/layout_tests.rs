//! Layout tests for tlview
//!
//! Tests for the layout descriptor: placeholders, per-role cell content,
//! the merged Music row, positions, hit testing and idempotence.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use tlview::layout::{EmptyReason, EMPTY_MESSAGE};
use tlview::{
    layout, CellContent, CellValue, FeatureColorMap, LayoutConfig, LayoutDescriptor, Matrix,
    RoleKind, TextOrientation,
};

#[test]
fn test_sample_program() {
    let m = common::sample_program();
    assert_eq!(m.step_count(), 2);
    let config = common::suggested_config(&m);
    assert_eq!(config.export_width_px(), 320);

    let grid = common::grid(&m, &config);
    let aerato = &grid.rows[2];
    assert_eq!(aerato.role, RoleKind::Generic);
    assert_eq!(aerato.height, 64.0);

    let first = aerato.cells[0].content.as_ref().unwrap();
    let expected = FeatureColorMap::default().get("aerato");
    assert_eq!(first.content, CellContent::Swatch { color: expected });
    assert_eq!(first.tooltip.as_deref(), Some("Aerato - Step 1"));
    assert_eq!(aerato.cells[1].content, None);
}

#[test]
fn test_duration_and_temperature_text() {
    let m = common::sample_program();
    let grid = common::grid(&m, &common::suggested_config(&m));
    let texts = |row: usize| -> Vec<String> {
        grid.rows[row]
            .cells
            .iter()
            .map(|c| match &c.content.as_ref().unwrap().content {
                CellContent::Text { text, .. } => text.clone(),
                CellContent::Swatch { .. } => panic!("expected text"),
            })
            .collect()
    };
    assert_eq!(texts(0), vec!["10s", "20s"]);
    assert_eq!(texts(1), vec!["38°", "39°"]);
}

#[test]
fn test_zero_rows_is_placeholder() {
    let descriptor = layout(
        &Matrix::default(),
        &LayoutConfig::default(),
        &FeatureColorMap::default(),
    );
    match descriptor {
        LayoutDescriptor::Empty(empty) => {
            assert_eq!(empty.reason, EmptyReason::NoRows);
            assert_eq!(empty.message, EMPTY_MESSAGE);
        }
        LayoutDescriptor::Grid(_) => panic!("expected placeholder"),
    }
}

#[test]
fn test_label_only_matrix_is_placeholder() {
    let m = common::matrix_json(r#"[["Duration"], ["Temperature"]]"#);
    let descriptor = layout(&m, &LayoutConfig::default(), &FeatureColorMap::default());
    assert!(descriptor.is_placeholder());
    assert_eq!(descriptor.total_width(), 0.0);
}

#[test]
fn test_placeholder_serializes_with_kind() {
    let descriptor = layout(
        &Matrix::default(),
        &LayoutConfig::default(),
        &FeatureColorMap::default(),
    );
    let json = serde_json::to_value(&descriptor).unwrap();
    assert_eq!(json["kind"], "empty");
    assert_eq!(json["reason"], "noRows");
}

#[test]
fn test_music_row_merges_by_default() {
    let m = common::MatrixBuilder::new()
        .row("Duration", &["10", "20", "30"])
        .row("Temperature", &["38", "39", "40"])
        .row("Music", &["Jazz", "Rock", ""])
        .build();
    let config = common::suggested_config(&m);
    let grid = common::grid(&m, &config);
    let music = &grid.rows[2];
    assert_eq!(music.cells.len(), 1);
    assert_eq!((music.cells[0].step, music.cells[0].span), (0, 3));
    let rect = grid.cell_rect(2, &music.cells[0]);
    assert_eq!(rect.x, 160.0);
    assert_eq!(rect.width, 240.0);
    assert_eq!(
        music.cells[0].content.as_ref().unwrap().content,
        CellContent::Text {
            text: "Jazz".to_string(),
            orientation: TextOrientation::Vertical,
        }
    );

    let split = common::grid(&m, &config.with_merge_music_row(false));
    assert_eq!(split.rows[2].cells.len(), 3);
    assert_eq!(split.rows[2].cells[2].content, None);
}

#[test]
fn test_aroma_label_is_rotated() {
    let m = common::MatrixBuilder::new()
        .row("Duration", &["10"])
        .row("Temperature", &["38"])
        .row("Aroma", &["Lavender"])
        .row("Musica", &["Jazz"])
        .build();
    let grid = common::grid(&m, &common::suggested_config(&m));
    assert_eq!(grid.rows[2].label_orientation, TextOrientation::Vertical);
    assert_eq!(grid.rows[3].label_orientation, TextOrientation::Horizontal);
}

#[test]
fn test_color_row_swatches() {
    let m = common::MatrixBuilder::new()
        .row("Duration", &["10", "20", "30"])
        .row("Temperature", &["38", "39", "40"])
        .row("Colore", &["#F00", "red", ""])
        .build();
    let grid = common::grid(&m, &common::suggested_config(&m));
    let cells = &grid.rows[2].cells;
    let first = cells[0].content.as_ref().unwrap();
    assert_eq!(
        first.content,
        CellContent::Swatch {
            color: tlview::Rgb::new(255, 0, 0)
        }
    );
    assert_eq!(first.tooltip.as_deref(), Some("Colore - Step 1"));
    assert_eq!(cells[1].content, None);
    assert_eq!(cells[2].content, None);
}

#[test]
fn test_custom_feature_color() {
    let m = common::sample_program();
    let mut colors = FeatureColorMap::default();
    colors.set("AERATO", "#123456").unwrap();
    let descriptor = layout(&m, &common::suggested_config(&m), &colors);
    let grid = descriptor.as_grid().unwrap();
    assert_eq!(
        grid.rows[2].cells[0].content.as_ref().unwrap().content,
        CellContent::Swatch {
            color: tlview::Rgb::new(0x12, 0x34, 0x56)
        }
    );
}

#[test]
fn test_ragged_rows_are_padded() {
    let m = Matrix::from_rows(vec![
        vec!["Duration".into(), "10".into(), "20".into()],
        vec!["Temperature".into()],
        vec!["Aerato".into(), "1".into(), "1".into(), "1".into()],
    ]);
    let grid = common::grid(&m, &common::suggested_config(&m));
    assert_eq!(grid.step_count, 2);
    assert!(grid.rows.iter().all(|r| r.cells.len() == 2));
    assert!(Matrix::try_from_rows(vec![
        vec![CellValue::from("a"), CellValue::from("b")],
        vec![CellValue::from("c")],
    ])
    .is_err());
}

#[test]
fn test_positions_and_hit_test() {
    let m = common::sample_program();
    let grid = common::grid(&m, &common::suggested_config(&m));
    assert_eq!(grid.col_positions, vec![0.0, 160.0, 240.0, 320.0]);
    assert_eq!(grid.row_positions, vec![0.0, 64.0, 128.0, 192.0]);

    let hit = grid.hit_test(200.0, 150.0).unwrap();
    assert_eq!((hit.row, hit.step), (2, Some(0)));
    assert_eq!(hit.tooltip(), Some("Aerato - Step 1"));

    let label = grid.hit_test(20.0, 150.0).unwrap();
    assert_eq!(label.step, None);
    assert!(grid.hit_test(330.0, 10.0).is_none());
    assert!(grid.hit_test(10.0, 200.0).is_none());
}

#[test]
fn test_with_width_reflows_columns_only() {
    let m = common::sample_program();
    let grid = common::grid(&m, &common::suggested_config(&m));
    let wide = grid.with_width(1920).unwrap();
    assert_eq!(wide.total_width(), 1920.0);
    assert_eq!(wide.column_width, 880.0);
    assert_eq!(wide.row_positions, grid.row_positions);
    assert_eq!(wide.rows, grid.rows);
}

#[test]
fn test_layout_is_idempotent() {
    let m = common::MatrixBuilder::new()
        .row("Duration", &["10", "20", "30"])
        .row("Temperature", &["38", "39", "40"])
        .row("Music", &["Jazz", "", ""])
        .row("Aroma", &["", "Mint", ""])
        .row("Nebulizzazione", &["1", "0", "1"])
        .build();
    let config = common::suggested_config(&m);
    let colors = FeatureColorMap::default();
    let a = layout(&m, &config, &colors);
    let b = layout(&m, &config, &colors);
    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}
