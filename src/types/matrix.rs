use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TlviewError};

/// A single cell of the program matrix.
///
/// Color cells are plain `Text` values; they are recognised as colors only
/// when a color row renders them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Stringified value as it is displayed and measured.
    pub fn display(&self) -> Cow<'_, str> {
        match self {
            Self::Empty => Cow::Borrowed(""),
            Self::Number(n) => Cow::Owned(format_number(*n)),
            Self::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }

    /// Whether the cell produces a visible mark.
    ///
    /// Empty cells, blank text and zero (numeric or textual) are unmarked,
    /// so a `0` step in a feature row reads as "off".
    pub fn is_marked(&self) -> bool {
        match self {
            Self::Empty => false,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Text(s) => {
                let t = s.trim();
                !t.is_empty() && t.parse::<f64>().map_or(true, |n| n != 0.0)
            }
        }
    }

    /// Character length of the displayed value.
    pub fn text_len(&self) -> usize {
        self.display().chars().count()
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// Integral values print without a fractional part (`10`, not `10.0`).
#[allow(clippy::cast_possible_truncation)]
fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Rectangular, immutable snapshot of the uploaded program.
///
/// Column 0 holds the feature label, columns 1..N the per-step values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Vec<CellValue>>", into = "Vec<Vec<CellValue>>")]
pub struct Matrix {
    rows: Vec<Vec<CellValue>>,
}

impl Matrix {
    /// Build a matrix, padding short rows with `Empty` and trimming long rows
    /// to the width of row 0.
    pub fn from_rows(mut rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows.first().map_or(0, Vec::len);
        for (index, row) in rows.iter_mut().enumerate() {
            if row.len() != width {
                tracing::warn!(
                    row = index,
                    expected = width,
                    found = row.len(),
                    "ragged matrix row normalized"
                );
                row.resize(width, CellValue::Empty);
            }
        }
        Self { rows }
    }

    /// Build a matrix, rejecting rows whose length differs from row 0.
    pub fn try_from_rows(rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let width = rows.first().map_or(0, Vec::len);
        if let Some((row, found)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != width)
            .map(|(i, r)| (i, r.len()))
        {
            return Err(TlviewError::MalformedMatrix {
                row,
                expected: width,
                found,
            });
        }
        Ok(Self { rows })
    }

    /// Number of rows (features).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns including the label column.
    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Number of step columns.
    pub fn step_count(&self) -> usize {
        self.column_count().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.column_count() == 0
    }

    /// Row view by index.
    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|values| Row::new(index, values))
    }

    /// All rows in order.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows
            .iter()
            .enumerate()
            .map(|(index, values)| Row::new(index, values))
    }
}

impl From<Vec<Vec<CellValue>>> for Matrix {
    fn from(rows: Vec<Vec<CellValue>>) -> Self {
        Self::from_rows(rows)
    }
}

impl From<Matrix> for Vec<Vec<CellValue>> {
    fn from(m: Matrix) -> Self {
        m.rows
    }
}

/// Borrowed view of one matrix row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    pub index: usize,
    /// All cells including the label at column 0.
    pub values: &'a [CellValue],
}

impl<'a> Row<'a> {
    fn new(index: usize, values: &'a [CellValue]) -> Self {
        Self { index, values }
    }

    /// Feature name (stringified column 0).
    pub fn label(&self) -> Cow<'a, str> {
        self.values.first().map_or(Cow::Borrowed(""), CellValue::display)
    }

    /// Per-step values (columns 1..N).
    pub fn steps(&self) -> &'a [CellValue] {
        self.values.get(1..).unwrap_or(&[])
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

    #[test_case(CellValue::Number(10.0), "10"; "integral number")]
    #[test_case(CellValue::Number(38.5), "38.5"; "fractional number")]
    #[test_case(CellValue::Number(-2.0), "-2"; "negative number")]
    #[test_case(CellValue::Text("Jazz".into()), "Jazz"; "text")]
    #[test_case(CellValue::Empty, ""; "empty")]
    fn test_display(value: CellValue, expected: &str) {
        assert_eq!(value.display(), expected);
    }

    #[test_case(CellValue::Empty, false; "empty")]
    #[test_case(CellValue::Text(String::new()), false; "blank text")]
    #[test_case(CellValue::Text("  ".into()), false; "whitespace")]
    #[test_case(CellValue::Text("0".into()), false; "text zero")]
    #[test_case(CellValue::Text("0.0".into()), false; "text zero float")]
    #[test_case(CellValue::Number(0.0), false; "number zero")]
    #[test_case(CellValue::Number(f64::NAN), false; "nan")]
    #[test_case(CellValue::Text("1".into()), true; "text one")]
    #[test_case(CellValue::Number(2.0), true; "number two")]
    #[test_case(CellValue::Text("Vivaldi".into()), true; "free text")]
    fn test_is_marked(value: CellValue, expected: bool) {
        assert_eq!(value.is_marked(), expected);
    }

    #[test]
    fn test_deserialize_mixed_json() {
        let m: Matrix =
            serde_json::from_str(r##"[["Duration", 10, "20"], ["Colore", null, "#FF0000"]]"##)
                .unwrap();
        assert_eq!(m.row_count(), 2);
        assert_eq!(m.step_count(), 2);
        let row = m.row(1).unwrap();
        assert_eq!(row.label(), "Colore");
        assert_eq!(row.steps()[0], CellValue::Empty);
        assert_eq!(row.steps()[1], CellValue::Text("#FF0000".to_string()));
        assert_eq!(m.row(0).unwrap().steps()[0], CellValue::Number(10.0));
    }

    #[test]
    fn test_from_rows_pads_and_trims() {
        let m = Matrix::from_rows(vec![
            vec!["Duration".into(), "10".into(), "20".into()],
            vec!["Temperature".into()],
            vec!["Aerato".into(), "1".into(), "0".into(), "1".into()],
        ]);
        assert!(m.rows().all(|r| r.values.len() == 3));
        assert_eq!(m.row(1).unwrap().steps(), &[CellValue::Empty, CellValue::Empty]);
    }

    #[test]
    fn test_try_from_rows_reports_ragged_row() {
        let err = Matrix::try_from_rows(vec![
            vec!["Duration".into(), "10".into()],
            vec!["Temperature".into(), "38".into(), "39".into()],
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            TlviewError::MalformedMatrix {
                row: 1,
                expected: 2,
                found: 3
            }
        ));
    }

    #[test]
    fn test_empty_shapes() {
        assert!(Matrix::default().is_empty());
        assert!(Matrix::from_rows(vec![vec![]]).is_empty());
        let labels_only = Matrix::from_rows(vec![vec!["Duration".into()]]);
        assert!(!labels_only.is_empty());
        assert_eq!(labels_only.step_count(), 0);
    }
}
