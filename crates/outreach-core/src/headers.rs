//! Header row discovery.
//!
//! Sheets are maintained by hand: title rows, blank rows and notes may sit
//! above the real header row, and columns get inserted or reordered. Instead
//! of fixed coordinates, each request scans the top of the sheet for the row
//! that names the columns and builds a name -> index map from it.

use std::collections::HashMap;

use crate::cell::SheetSnapshot;

/// How many rows from the top are scanned for the header row.
pub const HEADER_SEARCH_DEPTH: usize = 10;

/// What qualifies a row as the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderCriteria {
    /// The row contains this header.
    Key(String),
    /// The row contains every one of these headers. The first is the key.
    AllOf(Vec<String>),
}

impl HeaderCriteria {
    pub fn key(&self) -> &str {
        match self {
            Self::Key(key) => key,
            Self::AllOf(markers) => markers.first().map(String::as_str).unwrap_or_default(),
        }
    }

    fn matches(&self, trimmed_cells: &[String]) -> bool {
        let contains = |header: &String| trimmed_cells.iter().any(|cell| cell == header);
        match self {
            Self::Key(key) => contains(key),
            Self::AllOf(markers) => !markers.is_empty() && markers.iter().all(contains),
        }
    }
}

/// Column layout of one sheet, valid for a single request.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderLayout {
    pub header_row: usize,
    pub key_column: usize,
    /// Trimmed header text -> column index. A repeated header maps to its
    /// rightmost column.
    pub columns: HashMap<String, usize>,
    /// Number of columns in the data range.
    pub width: usize,
}

impl HeaderLayout {
    pub fn column(&self, header: &str) -> Option<usize> {
        self.columns.get(header).copied()
    }
}

/// Locate the header row within the first `search_depth` rows.
///
/// Returns `None` when no row qualifies; never panics on empty or ragged
/// sheets.
pub fn resolve_headers(
    snapshot: &SheetSnapshot,
    criteria: &HeaderCriteria,
    search_depth: usize,
) -> Option<HeaderLayout> {
    let depth = search_depth.min(snapshot.row_count());

    let (header_row, trimmed) = (0..depth).find_map(|r| {
        let cells: Vec<String> = snapshot.row(r)?.iter().map(|c| c.trimmed()).collect();
        criteria.matches(&cells).then_some((r, cells))
    })?;

    let columns: HashMap<String, usize> = trimmed
        .into_iter()
        .enumerate()
        .map(|(index, text)| (text, index))
        .collect();
    let key_column = *columns.get(criteria.key())?;

    tracing::trace!(header_row, key_column, columns = columns.len(), "resolved header row");

    Some(HeaderLayout {
        header_row,
        key_column,
        columns,
        width: snapshot.width(),
    })
}
