//! Tab/newline text blocks for copy and paste.

use crate::range::{CellCoord, SelectionRange};
use crate::table::Table;

pub const CELL_SEPARATOR: char = '\t';
pub const LINE_SEPARATOR: char = '\n';

/// Render a rectangular selection as tab-separated lines.
///
/// The range is clamped to the table; an empty string comes back when the
/// range lies entirely outside it.
pub fn serialize(table: &Table, range: SelectionRange) -> String {
    let Some(range) = range.clamp_to(table.row_count(), table.column_count()) else {
        return String::new();
    };

    (range.start.row..=range.end.row)
        .map(|row| {
            (range.start.col..=range.end.col)
                .map(|col| table.display(row, col).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(&CELL_SEPARATOR.to_string())
        })
        .collect::<Vec<_>>()
        .join(&LINE_SEPARATOR.to_string())
}

/// One destination write produced from a pasted block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteCell {
    pub coord: CellCoord,
    pub text: String,
}

/// Writes to perform for a paste, plus the cells that fell outside the table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PastePlan {
    pub writes: Vec<PasteCell>,
    pub skipped: usize,
}

/// Split a text block into writes anchored at `anchor`.
///
/// Empty lines are not written but still advance the row offset.
pub fn paste_plan(text: &str, anchor: CellCoord, rows: usize, cols: usize) -> PastePlan {
    let mut plan = PastePlan::default();

    for (line_index, line) in text.split(LINE_SEPARATOR).enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            continue;
        }
        for (cell_index, cell) in line.split(CELL_SEPARATOR).enumerate() {
            let coord = anchor
                .row
                .checked_add(line_index)
                .zip(anchor.col.checked_add(cell_index))
                .map(|(row, col)| CellCoord::new(row, col))
                .filter(|coord| coord.row < rows && coord.col < cols);
            match coord {
                Some(coord) => plan.writes.push(PasteCell {
                    coord,
                    text: cell.to_string(),
                }),
                None => plan.skipped += 1,
            }
        }
    }

    plan
}
