//! Column and row sizing.
//!
//! All step columns share one width derived from the export width. Row
//! heights are fixed except for rows with rotated free text, which grow with
//! their longest value so the text is never clipped.

use crate::classify::RoleKind;
use crate::config::{LayoutConfig, DEFAULT_EXPORT_WIDTH_PX, FIXED_COLUMN_WIDTH_PX, MIN_STEP_WIDTH_PX};
use crate::error::{Result, TlviewError};
use crate::types::CellValue;

/// Approximate advance of one character as a fraction of the font size.
pub const CHAR_ADVANCE_RATIO: f32 = 0.7;

/// Minimum height of a rotated-text row, in multiples of the font size.
pub const ROTATED_MIN_FONT_MULTIPLE: f32 = 4.0;

/// Width of one step column when the whole timeline spans `total_width` px.
pub fn column_width_for(total_width: u32, step_count: usize) -> Result<f32> {
    if step_count == 0 {
        return Err(TlviewError::ZeroStepCount);
    }
    let remaining = total_width.saturating_sub(FIXED_COLUMN_WIDTH_PX);
    #[allow(clippy::cast_precision_loss)]
    Ok(remaining as f32 / step_count as f32)
}

/// Width of one step column for the configured export width.
pub fn column_width(config: &LayoutConfig, step_count: usize) -> Result<f32> {
    column_width_for(config.export_width_px(), step_count)
}

/// Advisory export width giving every step its minimum comfortable width.
pub fn suggested_export_width(step_count: usize) -> u32 {
    if step_count == 0 {
        return DEFAULT_EXPORT_WIDTH_PX;
    }
    let steps = u32::try_from(step_count).unwrap_or(u32::MAX);
    FIXED_COLUMN_WIDTH_PX.saturating_add(steps.saturating_mul(MIN_STEP_WIDTH_PX))
}

/// Height of a row with the given role.
///
/// `longest_text_len` is the character length of the longest stringified
/// step value in the row.
#[allow(clippy::cast_precision_loss)]
pub fn row_height(config: &LayoutConfig, role: RoleKind, longest_text_len: usize) -> f32 {
    if !role.has_rotated_text() {
        return config.regular_row_height_px() as f32;
    }
    let font = config.font_size_px() as f32;
    let text_extent = longest_text_len as f32 * font * CHAR_ADVANCE_RATIO;
    let floor = font * ROTATED_MIN_FONT_MULTIPLE;
    text_extent.max(floor) + config.special_row_padding_px() as f32
}

/// Character length of the longest displayed value (0 if all are empty).
pub fn longest_text_len(values: &[CellValue]) -> usize {
    values.iter().map(CellValue::text_len).max().unwrap_or(0)
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

    #[test]
    fn test_column_width_divides_remaining() {
        let config = LayoutConfig::default().with_export_width(1960).unwrap();
        assert_eq!(column_width(&config, 10).unwrap(), 180.0);
    }

    #[test]
    fn test_column_width_zero_steps() {
        let err = column_width(&LayoutConfig::default(), 0).unwrap_err();
        assert!(matches!(err, TlviewError::ZeroStepCount));
    }

    #[test]
    fn test_column_width_narrower_than_label() {
        assert_eq!(column_width_for(100, 4).unwrap(), 0.0);
    }

    #[test]
    fn test_suggested_export_width() {
        assert_eq!(suggested_export_width(2), 320);
        assert_eq!(suggested_export_width(22), 1920);
        assert_eq!(suggested_export_width(0), DEFAULT_EXPORT_WIDTH_PX);
    }

    #[test]
    fn test_regular_row_height() {
        let config = LayoutConfig::default();
        for role in [
            RoleKind::Duration,
            RoleKind::Temperature,
            RoleKind::Color,
            RoleKind::Generic,
        ] {
            assert_eq!(row_height(&config, role, 500), 64.0);
        }
    }

    #[test]
    fn test_rotated_row_height_floor() {
        let config = LayoutConfig::default();
        // 14 * 4 + 20
        assert_eq!(row_height(&config, RoleKind::Music, 0), 76.0);
        assert_eq!(row_height(&config, RoleKind::Aroma, 3), 76.0);
    }

    #[test]
    fn test_rotated_row_height_grows_with_text() {
        let config = LayoutConfig::default().with_font_size(10).unwrap();
        // 20 chars * 10 * 0.7 = 140, + 20 padding
        assert_eq!(row_height(&config, RoleKind::Aroma, 20), 160.0);
    }

    #[test]
    fn test_longest_text_len() {
        let values = vec![
            CellValue::Empty,
            CellValue::Text("Bach".into()),
            CellValue::Number(1234.5),
        ];
        assert_eq!(longest_text_len(&values), 6);
        assert_eq!(longest_text_len(&[]), 0);
        assert_eq!(longest_text_len(&[CellValue::Text("più".into())]), 3);
    }
}
