//! Row classification tests for tlview
//!
//! Positional roles for the first two rows, bilingual name aliases for the
//! rest, and the fallback to generic feature rows.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

mod common;

use test_case::test_case;
use tlview::{classify, RoleKind};

#[test_case("Duration")]
#[test_case("Musica")]
#[test_case("")]
#[test_case("anything at all")]
fn test_row_zero_is_duration(label: &str) {
    assert_eq!(classify(0, label), RoleKind::Duration);
}

#[test_case("Temperature")]
#[test_case("Aroma")]
#[test_case("Colore")]
fn test_row_one_is_temperature(label: &str) {
    assert_eq!(classify(1, label), RoleKind::Temperature);
}

#[test_case("musica", RoleKind::Music)]
#[test_case("MUSIC", RoleKind::Music)]
#[test_case("Aroma", RoleKind::Aroma)]
#[test_case("scent", RoleKind::Aroma)]
#[test_case("Colore", RoleKind::Color)]
#[test_case("color", RoleKind::Color)]
#[test_case("  Music  ", RoleKind::Music ; "surrounding whitespace")]
#[test_case("Aerato", RoleKind::Generic)]
#[test_case("Musical", RoleKind::Generic ; "prefix is not an alias")]
#[test_case("", RoleKind::Generic ; "empty label")]
fn test_named_rows(label: &str, expected: RoleKind) {
    for index in [2, 3, 17] {
        assert_eq!(classify(index, label), expected, "row {index}");
    }
}

#[test]
fn test_roles_in_a_laid_out_program() {
    let m = common::MatrixBuilder::new()
        .row("Duration", &["10"])
        .row("Temperature", &["38"])
        .row("Musica", &["Jazz"])
        .row("Scent", &["Lavender"])
        .row("Colore", &["#FF0000"])
        .row("Pioggia interna", &["1"])
        .build();
    let grid = common::grid(&m, &common::suggested_config(&m));
    let roles: Vec<RoleKind> = grid.rows.iter().map(|r| r.role).collect();
    assert_eq!(
        roles,
        vec![
            RoleKind::Duration,
            RoleKind::Temperature,
            RoleKind::Music,
            RoleKind::Aroma,
            RoleKind::Color,
            RoleKind::Generic,
        ]
    );
    assert_eq!(grid.color_editable_features(), vec!["Pioggia interna"]);
}
