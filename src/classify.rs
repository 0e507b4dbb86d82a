//! Row classification.
//!
//! The first two rows of every program are positional: row 0 is always the
//! step duration and row 1 the temperature, whatever their labels say. Every
//! later row is classified by its feature name, accepting both the Italian and
//! the English spelling.

use serde::{Deserialize, Serialize};

/// Semantic role of a matrix row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoleKind {
    Duration,
    Temperature,
    Music,
    Aroma,
    Color,
    Generic,
}

impl RoleKind {
    /// Rows with their own rendering or sizing rules.
    pub fn is_special(self) -> bool {
        !matches!(self, Self::Generic)
    }

    /// Rows whose free text is drawn rotated, so their height grows with it.
    pub fn has_rotated_text(self) -> bool {
        matches!(self, Self::Music | Self::Aroma)
    }
}

/// Name aliases for rows at index 2 and beyond.
const NAME_ALIASES: [(&str, RoleKind); 6] = [
    ("musica", RoleKind::Music),
    ("music", RoleKind::Music),
    ("aroma", RoleKind::Aroma),
    ("scent", RoleKind::Aroma),
    ("colore", RoleKind::Color),
    ("color", RoleKind::Color),
];

/// Classify a row from its index and label.
pub fn classify(row_index: usize, label: &str) -> RoleKind {
    match row_index {
        0 => RoleKind::Duration,
        1 => RoleKind::Temperature,
        _ => {
            let name = label.trim();
            NAME_ALIASES
                .iter()
                .find(|(alias, _)| name.eq_ignore_ascii_case(alias))
                .map_or(RoleKind::Generic, |&(_, role)| role)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0, "Duration", RoleKind::Duration; "duration by name")]
    #[test_case(0, "Musica", RoleKind::Duration; "index zero beats music")]
    #[test_case(0, "", RoleKind::Duration; "index zero empty label")]
    #[test_case(1, "Temperatura", RoleKind::Temperature; "temperature")]
    #[test_case(1, "colore", RoleKind::Temperature; "index one beats color")]
    #[test_case(2, "Musica", RoleKind::Music; "italian music")]
    #[test_case(5, "MUSIC", RoleKind::Music; "english music uppercase")]
    #[test_case(3, "aroma", RoleKind::Aroma; "aroma")]
    #[test_case(3, "Scent", RoleKind::Aroma; "scent")]
    #[test_case(4, "Colore", RoleKind::Color; "italian color")]
    #[test_case(4, " color ", RoleKind::Color; "padded color")]
    #[test_case(2, "Aerato", RoleKind::Generic; "generic feature")]
    #[test_case(2, "", RoleKind::Generic; "empty label")]
    #[test_case(2, "musical", RoleKind::Generic; "prefix is not a match")]
    fn test_classify(index: usize, label: &str, expected: RoleKind) {
        assert_eq!(classify(index, label), expected);
    }

    #[test]
    fn test_special_roles() {
        assert!(RoleKind::Duration.is_special());
        assert!(RoleKind::Color.is_special());
        assert!(!RoleKind::Generic.is_special());
        assert!(RoleKind::Music.has_rotated_text());
        assert!(RoleKind::Aroma.has_rotated_text());
        assert!(!RoleKind::Color.has_rotated_text());
    }
}
