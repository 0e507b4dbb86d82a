//! Color tokens and the per-feature color map.
//!
//! Color cells carry `#RGB` / `#RRGGBB` tokens verbatim (alpha digits are
//! accepted and ignored); generic feature rows are painted with the color
//! registered for their (lower-cased) feature name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TlviewError};

/// RGB color with u8 components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Create a new RGB color.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a color token: a leading `#` followed by 3, 4, 6 or 8 hex digits.
    /// An alpha channel is parsed and dropped. Returns None for anything else,
    /// including tokens without the marker.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().strip_prefix('#')?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            3 | 4 => {
                let digit = |i: usize| -> Option<u8> {
                    let v = u8::from_str_radix(hex.get(i..=i)?, 16).ok()?;
                    Some(v * 17)
                };
                Some(Self::new(digit(0)?, digit(1)?, digit(2)?))
            }
            6 | 8 => {
                let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
                let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
                let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
                Some(Self::new(r, g, b))
            }
            _ => None,
        }
    }

    /// Convert to CSS hex string (#RRGGBB).
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Opaque RGBA bytes for pixel buffers.
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

impl TryFrom<String> for Rgb {
    type Error = TlviewError;

    fn try_from(s: String) -> Result<Self> {
        Self::from_hex(&s).ok_or(TlviewError::InvalidColor(s))
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_hex()
    }
}

/// Colors used by the timeline chrome.
pub mod palette {
    use super::Rgb;

    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);
    /// Cell and label text.
    pub const TEXT: Rgb = Rgb::new(0x00, 0x00, 0x00);
    /// Row separators and column borders (Tailwind gray-200).
    pub const BORDER: Rgb = Rgb::new(0xE5, 0xE7, 0xEB);
    /// Swatch color for features missing from the color map.
    pub const FALLBACK_FEATURE: Rgb = Rgb::new(0x94, 0xA3, 0xB8);
}

/// Built-in features and their seeded colors.
pub const DEFAULT_FEATURE_COLORS: [(&str, Rgb); 7] = [
    ("pioggia interna", Rgb::new(0x0E, 0xA5, 0xE9)),
    ("nebulizzazione", Rgb::new(0x22, 0xD3, 0xEE)),
    ("pioggia esterna", Rgb::new(0x7D, 0xD3, 0xFC)),
    ("aerato", Rgb::new(0x38, 0xBD, 0xF8)),
    ("musica", Rgb::new(0x81, 0x8C, 0xF8)),
    ("aroma", Rgb::new(0x4A, 0xDE, 0x80)),
    ("colore", Rgb::new(0xA7, 0x8B, 0xFA)),
];

/// Lower-cased feature name to swatch color.
///
/// Serializes as a plain `{ "feature": "#RRGGBB" }` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Rgb>", into = "BTreeMap<String, Rgb>")]
pub struct FeatureColorMap {
    colors: BTreeMap<String, Rgb>,
}

impl Default for FeatureColorMap {
    fn default() -> Self {
        Self {
            colors: DEFAULT_FEATURE_COLORS
                .iter()
                .map(|&(name, color)| (name.to_string(), color))
                .collect(),
        }
    }
}

impl FeatureColorMap {
    /// A map with no entries; every feature resolves to the fallback color.
    pub fn empty() -> Self {
        Self {
            colors: BTreeMap::new(),
        }
    }

    /// Color for a feature, falling back to [`palette::FALLBACK_FEATURE`].
    pub fn get(&self, feature: &str) -> Rgb {
        self.lookup(feature).unwrap_or(palette::FALLBACK_FEATURE)
    }

    /// Color for a feature if one is registered.
    pub fn lookup(&self, feature: &str) -> Option<Rgb> {
        self.colors.get(&normalize_key(feature)).copied()
    }

    /// Register a color for a feature. On an invalid token the map is left
    /// unchanged and the error is returned.
    pub fn set(&mut self, feature: &str, color_hex: &str) -> Result<()> {
        let color = Rgb::from_hex(color_hex).ok_or_else(|| {
            tracing::warn!(feature, color_hex, "rejected feature color");
            TlviewError::InvalidColor(color_hex.to_string())
        })?;
        self.colors.insert(normalize_key(feature), color);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Rgb)> {
        self.colors.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl From<BTreeMap<String, Rgb>> for FeatureColorMap {
    fn from(colors: BTreeMap<String, Rgb>) -> Self {
        Self {
            colors: colors
                .into_iter()
                .map(|(k, v)| (normalize_key(&k), v))
                .collect(),
        }
    }
}

impl From<FeatureColorMap> for BTreeMap<String, Rgb> {
    fn from(map: FeatureColorMap) -> Self {
        map.colors
    }
}

fn normalize_key(feature: &str) -> String {
    feature.trim().to_lowercase()
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

    #[test_case("#FF0000", Some(Rgb::new(255, 0, 0)); "six digits")]
    #[test_case("#0ea5e9", Some(Rgb::new(0x0E, 0xA5, 0xE9)); "lowercase")]
    #[test_case("#fff", Some(Rgb::new(255, 255, 255)); "three digits")]
    #[test_case(" #123456 ", Some(Rgb::new(0x12, 0x34, 0x56)); "surrounding whitespace")]
    #[test_case("FF0000", None; "missing marker")]
    #[test_case("#GG0000", None; "non hex digit")]
    #[test_case("#F00A", Some(Rgb::new(255, 0, 0)); "four digits drop alpha")]
    #[test_case("#0ea5e980", Some(Rgb::new(0x0E, 0xA5, 0xE9)); "eight digits drop alpha")]
    #[test_case("#FF000", None; "five digits")]
    #[test_case("#FF0000A", None; "seven digits")]
    #[test_case("#", None; "marker only")]
    #[test_case("#+1+2+3", None; "sign characters")]
    fn test_from_hex(input: &str, expected: Option<Rgb>) {
        assert_eq!(Rgb::from_hex(input), expected);
    }

    #[test]
    fn test_to_hex_uppercase() {
        assert_eq!(Rgb::new(0x0e, 0xa5, 0xe9).to_hex(), "#0EA5E9");
    }

    #[test]
    fn test_serde_as_hex_string() {
        let json = serde_json::to_string(&Rgb::new(1, 2, 3)).unwrap();
        assert_eq!(json, "\"#010203\"");
        let back: Rgb = serde_json::from_str("\"#abc\"").unwrap();
        assert_eq!(back, Rgb::new(0xAA, 0xBB, 0xCC));
        assert!(serde_json::from_str::<Rgb>("\"red\"").is_err());
    }

    #[test]
    fn test_default_map_seeded() {
        let map = FeatureColorMap::default();
        assert_eq!(map.len(), DEFAULT_FEATURE_COLORS.len());
        assert_eq!(map.get("aerato"), Rgb::new(0x38, 0xBD, 0xF8));
        assert_eq!(map.get("Pioggia Interna"), Rgb::new(0x0E, 0xA5, 0xE9));
    }

    #[test]
    fn test_unknown_feature_falls_back() {
        let map = FeatureColorMap::default();
        assert_eq!(map.lookup("ventilazione"), None);
        assert_eq!(map.get("ventilazione"), palette::FALLBACK_FEATURE);
    }

    #[test]
    fn test_set_lowercases_key() {
        let mut map = FeatureColorMap::empty();
        map.set("Aerato", "#112233").unwrap();
        assert_eq!(map.get("aerato"), Rgb::new(0x11, 0x22, 0x33));
        assert_eq!(map.iter().next().map(|(k, _)| k), Some("aerato"));
    }

    #[test]
    fn test_serde_as_object() {
        let map: FeatureColorMap =
            serde_json::from_str(r##"{"Aerato": "#112233", "musica": "#abc"}"##).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.lookup("aerato"), Some(Rgb::new(0x11, 0x22, 0x33)));
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r##"{"aerato":"#112233","musica":"#AABBCC"}"##);
        assert!(serde_json::from_str::<FeatureColorMap>(r#"{"a": "blue"}"#).is_err());
    }

    #[test]
    fn test_set_invalid_leaves_map_unchanged() {
        let mut map = FeatureColorMap::default();
        let before = map.clone();
        let err = map.set("aerato", "blue").unwrap_err();
        assert!(matches!(err, TlviewError::InvalidColor(ref s) if s == "blue"));
        assert_eq!(map, before);
    }
}
