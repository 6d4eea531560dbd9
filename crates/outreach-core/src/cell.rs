//! Cell values and sheet snapshots.
//!
//! Sheets hold loosely typed cells (text, numbers, booleans, blanks). Header
//! and key matching always compares the *displayed* text of a cell with
//! surrounding whitespace removed, so `3` and `"3"` match the same key.

use serde::{Deserialize, Serialize};

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// The text a spreadsheet would display for this cell.
    pub fn display_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::Text(s) => s.clone(),
        }
    }

    pub fn trimmed(&self) -> String {
        self.display_text().trim().to_string()
    }

    /// Null, empty and whitespace-only text count as blank.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Bool(_) | Self::Number(_) => false,
        }
    }

    /// Convert an arbitrary JSON value into a cell. Nested structures are
    /// stored as their JSON text.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Empty,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(Self::Number)
                .unwrap_or_else(|| Self::Text(n.to_string())),
            serde_json::Value::String(s) => Self::Text(s.clone()),
            other => Self::Text(other.to_string()),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// A rectangular copy of one sheet's data range, taken once per request.
///
/// Ragged input rows are padded with [`CellValue::Empty`] up to the widest
/// row, so every row has exactly [`SheetSnapshot::width`] cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetSnapshot {
    rows: Vec<Vec<CellValue>>,
    width: usize,
}

impl SheetSnapshot {
    pub fn new(mut rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, CellValue::Empty);
        }
        Self { rows, width }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn row(&self, index: usize) -> Option<&[CellValue]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(column))
    }
}

/// Build a snapshot from string literals. Blank strings become empty cells.
#[cfg(test)]
pub(crate) fn grid(rows: &[&[&str]]) -> SheetSnapshot {
    SheetSnapshot::new(
        rows.iter()
            .map(|row| {
                row.iter()
                    .map(|s| {
                        if s.is_empty() {
                            CellValue::Empty
                        } else {
                            CellValue::text(*s)
                        }
                    })
                    .collect()
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_numbers_display_without_fraction() {
        assert_eq!(CellValue::Number(42.0).display_text(), "42");
        assert_eq!(CellValue::Number(-3.0).display_text(), "-3");
        assert_eq!(CellValue::Number(2.5).display_text(), "2.5");
    }

    #[test]
    fn trimmed_strips_surrounding_whitespace() {
        assert_eq!(CellValue::text("  Facility Name \t").trimmed(), "Facility Name");
        assert_eq!(CellValue::Empty.trimmed(), "");
    }

    #[test]
    fn blank_detection() {
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::text("   ").is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
        assert!(!CellValue::Bool(false).is_blank());
    }

    #[test]
    fn from_json_maps_scalars() {
        assert_eq!(CellValue::from_json(&serde_json::json!(null)), CellValue::Empty);
        assert_eq!(CellValue::from_json(&serde_json::json!(7)), CellValue::Number(7.0));
        assert_eq!(
            CellValue::from_json(&serde_json::json!("x")),
            CellValue::text("x")
        );
        assert_eq!(
            CellValue::from_json(&serde_json::json!(["a"])),
            CellValue::text("[\"a\"]")
        );
    }

    #[test]
    fn untagged_serde_reads_json_scalars() {
        let cells: Vec<CellValue> = serde_json::from_str(r#"["a", 1, true, null]"#).unwrap();
        assert_eq!(
            cells,
            vec![
                CellValue::text("a"),
                CellValue::Number(1.0),
                CellValue::Bool(true),
                CellValue::Empty
            ]
        );
    }

    #[test]
    fn snapshot_pads_ragged_rows() {
        let snap = SheetSnapshot::new(vec![
            vec![CellValue::text("a")],
            vec![CellValue::text("b"), CellValue::text("c"), CellValue::text("d")],
        ]);
        assert_eq!(snap.width(), 3);
        assert_eq!(snap.row(0).unwrap().len(), 3);
        assert_eq!(snap.cell(0, 2), Some(&CellValue::Empty));
        assert_eq!(snap.cell(5, 0), None);
    }
}
