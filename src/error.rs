//! Structured error types for tlview.
//!
//! Every failure in this crate is local and recoverable: callers retry with
//! corrected input and nothing already on screen is touched.

/// All errors that can occur in tlview layout, configuration and export.
#[derive(Debug, thiserror::Error)]
pub enum TlviewError {
    /// The matrix has no rows or no columns.
    #[error("Matrix is empty")]
    EmptyMatrix,

    /// A configuration value fell outside its documented range.
    #[error("Invalid value {value} for {field}: must be {bound}")]
    InvalidConfigValue {
        field: &'static str,
        value: i64,
        bound: Bound,
    },

    /// A feature color was not a `#RGB` / `#RRGGBB` token, with or without alpha.
    #[error("Invalid color {0:?}: expected #RGB, #RGBA, #RRGGBB or #RRGGBBAA")]
    InvalidColor(String),

    /// Column width requested for a matrix without step columns.
    #[error("Cannot compute column width for zero steps")]
    ZeroStepCount,

    /// Rows of unequal length.
    #[error("Malformed matrix: row {row} has {found} columns, expected {expected}")]
    MalformedMatrix {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Rasterization or serialization failed.
    #[error("Export failed: {0}")]
    ExportBackendFailure(String),

    /// The export was cancelled before it produced an artifact.
    #[error("Export cancelled")]
    ExportCancelled,

    /// JSON (de)serialization error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The range violated by a rejected configuration value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Inclusive range.
    Between(i64, i64),
    /// Inclusive lower bound.
    AtLeast(i64),
}

impl std::fmt::Display for Bound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Between(min, max) => write!(f, "between {min} and {max}"),
            Self::AtLeast(min) => write!(f, "at least {min}"),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TlviewError>;

impl From<image::ImageError> for TlviewError {
    fn from(e: image::ImageError) -> Self {
        Self::ExportBackendFailure(e.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<TlviewError> for wasm_bindgen::JsValue {
    fn from(e: TlviewError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
