//! Row lookup by key column.

use crate::cell::SheetSnapshot;

/// Find the first data row (below `header_row`) whose trimmed key cell equals
/// `target` exactly.
///
/// The key column is assumed unique; when it is not, the first occurrence
/// wins. Keys are compared case-sensitively with no normalization beyond
/// trimming the cell. The target itself is used as given.
pub fn locate_row(
    snapshot: &SheetSnapshot,
    header_row: usize,
    key_column: usize,
    target: &str,
) -> Option<usize> {
    (header_row + 1..snapshot.row_count()).find(|&r| {
        snapshot
            .cell(r, key_column)
            .is_some_and(|cell| cell.trimmed() == target)
    })
}
