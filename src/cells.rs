//! Per-cell render rules.
//!
//! One rule per [`RoleKind`], looked up through [`rule_for`]. Rules are pure:
//! the same role, value and step always produce the same descriptor.

use serde::{Deserialize, Serialize};

use crate::classify::RoleKind;
use crate::color::{FeatureColorMap, Rgb};
use crate::types::CellValue;

/// Direction text is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextOrientation {
    #[default]
    Horizontal,
    /// Rotated 90° counterclockwise, reading bottom to top.
    Vertical,
}

/// What a cell shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CellContent {
    Text {
        text: String,
        orientation: TextOrientation,
    },
    /// A filled, rounded block of color.
    Swatch { color: Rgb },
}

/// Renderable description of one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellDescriptor {
    pub role: RoleKind,
    pub content: CellContent,
    /// Hover label (`"<feature> - Step <n>"`) for swatch cells.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

/// Inputs of a render rule.
pub struct CellContext<'a> {
    pub value: &'a CellValue,
    /// Zero-based step index.
    pub step_index: usize,
    /// Feature name as written in the matrix.
    pub feature: &'a str,
    pub colors: &'a FeatureColorMap,
}

pub type RenderRule = fn(&CellContext<'_>) -> Option<CellDescriptor>;

/// The render rule for a role.
pub fn rule_for(role: RoleKind) -> RenderRule {
    match role {
        RoleKind::Duration => render_duration,
        RoleKind::Temperature => render_temperature,
        RoleKind::Music => render_music,
        RoleKind::Aroma => render_aroma,
        RoleKind::Color => render_color,
        RoleKind::Generic => render_generic,
    }
}

/// Render one step cell. Returns None when the cell shows no mark.
pub fn render(
    role: RoleKind,
    value: &CellValue,
    step_index: usize,
    feature: &str,
    colors: &FeatureColorMap,
) -> Option<CellDescriptor> {
    let ctx = CellContext {
        value,
        step_index,
        feature,
        colors,
    };
    rule_for(role)(&ctx)
}

/// Hover label for a step cell. Steps are numbered from 1 on screen.
pub fn step_tooltip(feature: &str, step_index: usize) -> String {
    format!("{feature} - Step {}", step_index + 1)
}

fn text(role: RoleKind, text: String, orientation: TextOrientation) -> CellDescriptor {
    CellDescriptor {
        role,
        content: CellContent::Text { text, orientation },
        tooltip: None,
    }
}

fn swatch(role: RoleKind, color: Rgb, ctx: &CellContext<'_>) -> CellDescriptor {
    CellDescriptor {
        role,
        content: CellContent::Swatch { color },
        tooltip: Some(step_tooltip(ctx.feature, ctx.step_index)),
    }
}

fn render_duration(ctx: &CellContext<'_>) -> Option<CellDescriptor> {
    Some(text(
        RoleKind::Duration,
        format!("{}s", ctx.value.display()),
        TextOrientation::Horizontal,
    ))
}

fn render_temperature(ctx: &CellContext<'_>) -> Option<CellDescriptor> {
    Some(text(
        RoleKind::Temperature,
        format!("{}°", ctx.value.display()),
        TextOrientation::Horizontal,
    ))
}

fn render_music(ctx: &CellContext<'_>) -> Option<CellDescriptor> {
    rotated_text(RoleKind::Music, ctx)
}

fn render_aroma(ctx: &CellContext<'_>) -> Option<CellDescriptor> {
    rotated_text(RoleKind::Aroma, ctx)
}

fn rotated_text(role: RoleKind, ctx: &CellContext<'_>) -> Option<CellDescriptor> {
    ctx.value.is_marked().then(|| {
        text(
            role,
            ctx.value.display().into_owned(),
            TextOrientation::Vertical,
        )
    })
}

fn render_color(ctx: &CellContext<'_>) -> Option<CellDescriptor> {
    let CellValue::Text(token) = ctx.value else {
        return None;
    };
    let color = Rgb::from_hex(token)?;
    Some(swatch(RoleKind::Color, color, ctx))
}

fn render_generic(ctx: &CellContext<'_>) -> Option<CellDescriptor> {
    ctx.value
        .is_marked()
        .then(|| swatch(RoleKind::Generic, ctx.colors.get(ctx.feature), ctx))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;

    fn colors() -> FeatureColorMap {
        FeatureColorMap::default()
    }

    fn text_of(d: &CellDescriptor) -> (&str, TextOrientation) {
        match &d.content {
            CellContent::Text { text, orientation } => (text.as_str(), *orientation),
            CellContent::Swatch { .. } => panic!("expected text, got swatch"),
        }
    }

    #[test]
    fn test_duration_suffix() {
        let d = render(RoleKind::Duration, &"10".into(), 0, "Duration", &colors()).unwrap();
        assert_eq!(text_of(&d), ("10s", TextOrientation::Horizontal));
        assert_eq!(d.tooltip, None);

        let d = render(
            RoleKind::Duration,
            &CellValue::Number(2.5),
            1,
            "Duration",
            &colors(),
        )
        .unwrap();
        assert_eq!(text_of(&d).0, "2.5s");
    }

    #[test]
    fn test_temperature_degree_marker() {
        let d = render(
            RoleKind::Temperature,
            &CellValue::Number(38.0),
            0,
            "Temperature",
            &colors(),
        )
        .unwrap();
        assert_eq!(text_of(&d).0, "38°");
    }

    #[test]
    fn test_positional_rows_render_even_when_empty() {
        assert!(render(RoleKind::Duration, &CellValue::Empty, 0, "", &colors()).is_some());
        assert!(render(RoleKind::Temperature, &CellValue::Empty, 0, "", &colors()).is_some());
    }

    #[test]
    fn test_music_and_aroma_vertical_text() {
        for role in [RoleKind::Music, RoleKind::Aroma] {
            let d = render(role, &"Vivaldi - Spring".into(), 3, "Musica", &colors()).unwrap();
            assert_eq!(d.role, role);
            assert_eq!(text_of(&d), ("Vivaldi - Spring", TextOrientation::Vertical));
            assert!(render(role, &CellValue::Empty, 3, "Musica", &colors()).is_none());
        }
    }

    #[test]
    fn test_color_token_swatch() {
        let d = render(RoleKind::Color, &"#FF8800".into(), 1, "Colore", &colors()).unwrap();
        assert_eq!(
            d.content,
            CellContent::Swatch {
                color: Rgb::new(0xFF, 0x88, 0x00)
            }
        );
        assert_eq!(d.tooltip.as_deref(), Some("Colore - Step 2"));
    }

    #[test]
    fn test_color_non_token_no_mark() {
        let c = colors();
        assert!(render(RoleKind::Color, &"red".into(), 0, "Colore", &c).is_none());
        assert!(render(RoleKind::Color, &"FF8800".into(), 0, "Colore", &c).is_none());
        assert!(render(RoleKind::Color, &CellValue::Number(1.0), 0, "Colore", &c).is_none());
        assert!(render(RoleKind::Color, &CellValue::Empty, 0, "Colore", &c).is_none());
    }

    #[test]
    fn test_generic_uses_feature_color() {
        let d = render(RoleKind::Generic, &"1".into(), 0, "Aerato", &colors()).unwrap();
        assert_eq!(
            d.content,
            CellContent::Swatch {
                color: Rgb::new(0x38, 0xBD, 0xF8)
            }
        );
        assert_eq!(d.tooltip.as_deref(), Some("Aerato - Step 1"));
    }

    #[test]
    fn test_generic_unknown_feature_fallback() {
        let d = render(RoleKind::Generic, &CellValue::Number(1.0), 0, "Ozono", &colors()).unwrap();
        assert_eq!(
            d.content,
            CellContent::Swatch {
                color: crate::color::palette::FALLBACK_FEATURE
            }
        );
    }

    #[test]
    fn test_generic_off_values_no_mark() {
        let c = colors();
        assert!(render(RoleKind::Generic, &"0".into(), 1, "Aerato", &c).is_none());
        assert!(render(RoleKind::Generic, &CellValue::Number(0.0), 1, "Aerato", &c).is_none());
        assert!(render(RoleKind::Generic, &CellValue::Empty, 1, "Aerato", &c).is_none());
    }
}
