//! Layout configuration.
//!
//! `LayoutConfig` is an immutable value: every setter validates its argument
//! and returns a new config, so a rejected value can never leave a
//! half-applied state behind.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{Bound, Result, TlviewError};

/// Width of the feature label column.
pub const FIXED_COLUMN_WIDTH_PX: u32 = 160;

/// Minimum comfortable width of one step column, used for the suggested
/// export width.
pub const MIN_STEP_WIDTH_PX: u32 = 80;

pub const DEFAULT_FONT_SIZE_PX: u32 = 14;
pub const DEFAULT_REGULAR_ROW_HEIGHT_PX: u32 = 64;
pub const DEFAULT_SPECIAL_ROW_PADDING_PX: u32 = 20;
pub const DEFAULT_EXPORT_WIDTH_PX: u32 = 1920;

pub const FONT_SIZE_RANGE: RangeInclusive<u32> = 1..=20;
pub const REGULAR_ROW_HEIGHT_RANGE: RangeInclusive<u32> = 30..=200;
pub const SPECIAL_ROW_PADDING_RANGE: RangeInclusive<u32> = 10..=100;
/// Lower bound for user-entered export widths.
pub const MIN_EXPORT_WIDTH_PX: u32 = 800;

/// Where the current export width came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WidthSource {
    /// Built-in default, no matrix loaded yet.
    Default,
    /// Suggested from the loaded matrix's step count.
    Suggested,
    /// Entered by the user; suggestions no longer replace it.
    User,
}

/// Sizing parameters for the timeline layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "LayoutConfigInput")]
pub struct LayoutConfig {
    font_size_px: u32,
    regular_row_height_px: u32,
    special_row_padding_px: u32,
    export_width_px: u32,
    export_width_source: WidthSource,
    merge_music_row: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            font_size_px: DEFAULT_FONT_SIZE_PX,
            regular_row_height_px: DEFAULT_REGULAR_ROW_HEIGHT_PX,
            special_row_padding_px: DEFAULT_SPECIAL_ROW_PADDING_PX,
            export_width_px: DEFAULT_EXPORT_WIDTH_PX,
            export_width_source: WidthSource::Default,
            merge_music_row: true,
        }
    }
}

impl LayoutConfig {
    pub fn font_size_px(&self) -> u32 {
        self.font_size_px
    }

    pub fn regular_row_height_px(&self) -> u32 {
        self.regular_row_height_px
    }

    pub fn special_row_padding_px(&self) -> u32 {
        self.special_row_padding_px
    }

    pub fn export_width_px(&self) -> u32 {
        self.export_width_px
    }

    pub fn export_width_source(&self) -> WidthSource {
        self.export_width_source
    }

    /// Whether the Music row is drawn as one cell spanning every step.
    pub fn merge_music_row(&self) -> bool {
        self.merge_music_row
    }

    pub fn fixed_column_width_px(&self) -> u32 {
        FIXED_COLUMN_WIDTH_PX
    }

    pub fn min_step_width_px(&self) -> u32 {
        MIN_STEP_WIDTH_PX
    }

    /// Set the font size (1..=20 px).
    pub fn with_font_size(self, px: u32) -> Result<Self> {
        let font_size_px = check_range("fontSizePx", px, FONT_SIZE_RANGE)?;
        Ok(Self {
            font_size_px,
            ..self
        })
    }

    /// Set the height of regular rows (30..=200 px).
    pub fn with_regular_row_height(self, px: u32) -> Result<Self> {
        let regular_row_height_px = check_range("regularRowHeightPx", px, REGULAR_ROW_HEIGHT_RANGE)?;
        Ok(Self {
            regular_row_height_px,
            ..self
        })
    }

    /// Set the padding added to Music/Aroma rows (10..=100 px).
    pub fn with_special_row_padding(self, px: u32) -> Result<Self> {
        let special_row_padding_px =
            check_range("specialRowPaddingPx", px, SPECIAL_ROW_PADDING_RANGE)?;
        Ok(Self {
            special_row_padding_px,
            ..self
        })
    }

    /// Set a user-chosen export width (at least 800 px). The width is then
    /// kept across matrix reloads.
    pub fn with_export_width(self, px: u32) -> Result<Self> {
        if px < MIN_EXPORT_WIDTH_PX {
            tracing::warn!(field = "exportWidthPx", value = px, "rejected config value");
            return Err(TlviewError::InvalidConfigValue {
                field: "exportWidthPx",
                value: i64::from(px),
                bound: Bound::AtLeast(i64::from(MIN_EXPORT_WIDTH_PX)),
            });
        }
        Ok(Self {
            export_width_px: px,
            export_width_source: WidthSource::User,
            ..self
        })
    }

    /// Apply an advisory export width unless the user has chosen one.
    ///
    /// Suggestions are system defaults and are not held to the 800 px floor
    /// that applies to typed-in widths.
    pub fn with_suggested_export_width(self, px: u32) -> Self {
        if self.export_width_source == WidthSource::User {
            return self;
        }
        Self {
            export_width_px: px,
            export_width_source: WidthSource::Suggested,
            ..self
        }
    }

    /// Forget a user-chosen width and go back to the given suggestion.
    pub fn with_export_width_reset(self, suggested_px: u32) -> Self {
        Self {
            export_width_px: suggested_px,
            export_width_source: WidthSource::Suggested,
            ..self
        }
    }

    pub fn with_merge_music_row(self, merge: bool) -> Self {
        Self {
            merge_music_row: merge,
            ..self
        }
    }
}

fn check_range(field: &'static str, value: u32, range: RangeInclusive<u32>) -> Result<u32> {
    if range.contains(&value) {
        return Ok(value);
    }
    tracing::warn!(field, value, "rejected config value");
    Err(TlviewError::InvalidConfigValue {
        field,
        value: i64::from(value),
        bound: Bound::Between(i64::from(*range.start()), i64::from(*range.end())),
    })
}

/// Deserialization shape: every field optional, validated on conversion.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct LayoutConfigInput {
    font_size_px: Option<u32>,
    regular_row_height_px: Option<u32>,
    special_row_padding_px: Option<u32>,
    export_width_px: Option<u32>,
    export_width_source: Option<WidthSource>,
    merge_music_row: Option<bool>,
}

impl TryFrom<LayoutConfigInput> for LayoutConfig {
    type Error = TlviewError;

    fn try_from(input: LayoutConfigInput) -> Result<Self> {
        let mut config = Self::default();
        if let Some(px) = input.font_size_px {
            config = config.with_font_size(px)?;
        }
        if let Some(px) = input.regular_row_height_px {
            config = config.with_regular_row_height(px)?;
        }
        if let Some(px) = input.special_row_padding_px {
            config = config.with_special_row_padding(px)?;
        }
        if let Some(px) = input.export_width_px {
            config = match input.export_width_source {
                // Typed-in widths are validated; system widths round-trip as-is.
                None | Some(WidthSource::User) => config.with_export_width(px)?,
                Some(source) => Self {
                    export_width_px: px,
                    export_width_source: source,
                    ..config
                },
            };
        }
        if let Some(merge) = input.merge_music_row {
            config = config.with_merge_music_row(merge);
        }
        Ok(config)
    }
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
    use test_case::test_case;

    #[test]
    fn test_defaults() {
        let c = LayoutConfig::default();
        assert_eq!(c.font_size_px(), 14);
        assert_eq!(c.regular_row_height_px(), 64);
        assert_eq!(c.special_row_padding_px(), 20);
        assert_eq!(c.export_width_px(), 1920);
        assert_eq!(c.fixed_column_width_px(), 160);
        assert_eq!(c.min_step_width_px(), 80);
        assert!(c.merge_music_row());
        assert_eq!(c.export_width_source(), WidthSource::Default);
    }

    #[test_case(1; "lower bound")]
    #[test_case(12; "middle")]
    #[test_case(20; "upper bound")]
    fn test_font_size_accepted(px: u32) {
        let c = LayoutConfig::default().with_font_size(px).unwrap();
        assert_eq!(c.font_size_px(), px);
    }

    #[test_case(0; "zero")]
    #[test_case(21; "above range")]
    #[test_case(25; "far above range")]
    fn test_font_size_rejected(px: u32) {
        let err = LayoutConfig::default().with_font_size(px).unwrap_err();
        match err {
            TlviewError::InvalidConfigValue {
                field,
                value,
                bound,
            } => {
                assert_eq!(field, "fontSizePx");
                assert_eq!(value, i64::from(px));
                assert_eq!(bound, Bound::Between(1, 20));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_row_height_and_padding_bounds() {
        let c = LayoutConfig::default();
        assert!(c.with_regular_row_height(29).is_err());
        assert_eq!(c.with_regular_row_height(200).unwrap().regular_row_height_px(), 200);
        assert!(c.with_special_row_padding(9).is_err());
        assert!(c.with_special_row_padding(101).is_err());
        assert_eq!(c.with_special_row_padding(10).unwrap().special_row_padding_px(), 10);
    }

    #[test]
    fn test_export_width_floor() {
        let c = LayoutConfig::default();
        let err = c.with_export_width(799).unwrap_err();
        assert!(matches!(
            err,
            TlviewError::InvalidConfigValue {
                bound: Bound::AtLeast(800),
                ..
            }
        ));
        let c = c.with_export_width(800).unwrap();
        assert_eq!(c.export_width_px(), 800);
        assert_eq!(c.export_width_source(), WidthSource::User);
    }

    #[test]
    fn test_suggestion_does_not_replace_user_width() {
        let c = LayoutConfig::default().with_suggested_export_width(320);
        assert_eq!(c.export_width_px(), 320);
        assert_eq!(c.export_width_source(), WidthSource::Suggested);

        let c = c.with_export_width(1000).unwrap().with_suggested_export_width(400);
        assert_eq!(c.export_width_px(), 1000);

        let c = c.with_export_width_reset(400);
        assert_eq!(c.export_width_px(), 400);
        assert_eq!(c.export_width_source(), WidthSource::Suggested);
    }

    #[test]
    fn test_deserialize_partial_json() {
        let c: LayoutConfig = serde_json::from_str(r#"{"fontSizePx": 18}"#).unwrap();
        assert_eq!(c.font_size_px(), 18);
        assert_eq!(c.regular_row_height_px(), 64);
        assert_eq!(c.export_width_source(), WidthSource::Default);

        let c: LayoutConfig = serde_json::from_str(r#"{"exportWidthPx": 1200}"#).unwrap();
        assert_eq!(c.export_width_source(), WidthSource::User);
    }

    #[test]
    fn test_suggested_width_round_trips() {
        let c = LayoutConfig::default().with_suggested_export_width(320);
        let json = serde_json::to_string(&c).unwrap();
        let back: LayoutConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<LayoutConfig>(r#"{"fontSizePx": 25}"#).is_err());
        assert!(serde_json::from_str::<LayoutConfig>(r#"{"fontSize": 12}"#).is_err());
    }
}
