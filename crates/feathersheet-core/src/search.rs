use serde::{Deserialize, Serialize};

use crate::range::CellCoord;
use crate::table::Table;

/// Case-insensitive substring matcher over display strings
#[derive(Debug, Clone)]
struct LiteralMatcher {
    query: String,
}

impl LiteralMatcher {
    fn new(query: &str) -> Self {
        Self {
            query: query.to_lowercase(),
        }
    }

    fn is_match(&self, text: &str) -> bool {
        !text.is_empty() && text.to_lowercase().contains(&self.query)
    }
}

/// Stateful "find next" over a table in column-major order.
///
/// `last == None` means the next search starts at the origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindCursor {
    last: Option<CellCoord>,
}

impl FindCursor {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Forget the last match; the next search starts from the origin
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Continue searching after `coord` (e.g. the current selection)
    pub fn seed(&mut self, coord: CellCoord) {
        self.last = Some(coord);
    }

    pub fn last(&self) -> Option<CellCoord> {
        self.last
    }

    /// Find the next cell whose display string contains `text`.
    ///
    /// Scans columns outer, rows inner, strictly after the last position and
    /// wraps around once. On a miss the cursor is left where it was.
    pub fn find_next(&mut self, table: &Table, text: &str) -> Option<CellCoord> {
        if text.is_empty() {
            return None;
        }

        let rows = table.row_count();
        let total = rows * table.column_count();
        if total == 0 {
            return None;
        }

        let matcher = LiteralMatcher::new(text);
        // A position outside the current extent restarts from the origin
        let start = self
            .last
            .filter(|c| table.contains(*c))
            .map(|c| c.col * rows + c.row + 1)
            .unwrap_or(0);

        let found = (start..total)
            .chain(0..start)
            .map(|linear| CellCoord::new(linear % rows, linear / rows))
            .find(|coord| {
                table
                    .display(coord.row, coord.col)
                    .is_some_and(|value| matcher.is_match(&value))
            })?;

        self.last = Some(found);
        Some(found)
    }
}
