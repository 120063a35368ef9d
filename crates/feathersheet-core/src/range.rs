use serde::{Deserialize, Serialize};
use std::fmt;

/// Cell address, 0-indexed
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    pub row: usize,
    pub col: usize,
}

impl CellCoord {
    pub const fn new(row: usize, col: usize) -> Self {
        CellCoord { row, col }
    }

    pub const fn origin() -> Self {
        CellCoord { row: 0, col: 0 }
    }

    /// Parse A1 notation (e.g., "A1" -> (0, 0), "B2" -> (1, 1))
    pub fn from_a1(notation: &str) -> Option<Self> {
        let notation = notation.trim().to_uppercase();
        let split = notation.find(|c: char| c.is_ascii_digit())?;
        let (col_str, row_str) = notation.split_at(split);

        if col_str.is_empty() || !row_str.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        let col = col_from_label(col_str)?;
        let row: usize = row_str.parse().ok()?;
        if row == 0 {
            return None; // A1 rows are 1-indexed
        }

        Some(CellCoord { row: row - 1, col })
    }

    pub fn to_a1(&self) -> String {
        format!("{}{}", col_to_label(self.col), self.row + 1)
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1())
    }
}

/// Convert column index (0-indexed) to label (A, B, ..., Z, AA, AB, ...)
pub fn col_to_label(col: usize) -> String {
    let mut label = String::new();
    let mut n = col + 1;

    while n > 0 {
        n -= 1;
        label.insert(0, char::from(b'A' + (n % 26) as u8));
        n /= 26;
    }

    label
}

/// Convert column label (A, B, ..., Z, AA, AB, ...) to index (0-indexed)
pub fn col_from_label(label: &str) -> Option<usize> {
    let mut col: usize = 0;

    for c in label.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        col = col
            .checked_mul(26)?
            .checked_add(c.to_ascii_uppercase() as usize - 'A' as usize + 1)?;
    }

    col.checked_sub(1)
}

/// Rectangular block of cells, always stored normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRange {
    pub start: CellCoord,
    pub end: CellCoord,
}

impl SelectionRange {
    pub fn new(start: CellCoord, end: CellCoord) -> Self {
        SelectionRange {
            start: CellCoord::new(start.row.min(end.row), start.col.min(end.col)),
            end: CellCoord::new(start.row.max(end.row), start.col.max(end.col)),
        }
    }

    pub fn single_cell(coord: CellCoord) -> Self {
        Self::new(coord, coord)
    }

    /// Bounding rectangle of an arbitrary set of selected addresses.
    ///
    /// Returns `None` for an empty selection.
    pub fn bounding<I>(coords: I) -> Option<Self>
    where
        I: IntoIterator<Item = CellCoord>,
    {
        let mut coords = coords.into_iter();
        let first = coords.next()?;
        let (mut min, mut max) = (first, first);
        for coord in coords {
            min.row = min.row.min(coord.row);
            min.col = min.col.min(coord.col);
            max.row = max.row.max(coord.row);
            max.col = max.col.max(coord.col);
        }
        Some(Self::new(min, max))
    }

    /// Intersect with a `rows` x `cols` table; `None` if nothing overlaps
    pub fn clamp_to(&self, rows: usize, cols: usize) -> Option<Self> {
        if rows == 0 || cols == 0 || self.start.row >= rows || self.start.col >= cols {
            return None;
        }
        Some(Self::new(
            self.start,
            CellCoord::new(self.end.row.min(rows - 1), self.end.col.min(cols - 1)),
        ))
    }

    pub fn contains(&self, coord: CellCoord) -> bool {
        coord.row >= self.start.row
            && coord.row <= self.end.row
            && coord.col >= self.start.col
            && coord.col <= self.end.col
    }

    pub fn row_count(&self) -> usize {
        self.end.row - self.start.row + 1
    }

    pub fn col_count(&self) -> usize {
        self.end.col - self.start.col + 1
    }

    pub fn cell_count(&self) -> usize {
        self.row_count() * self.col_count()
    }

    pub fn is_single_cell(&self) -> bool {
        self.start == self.end
    }

    /// Iterate over all coordinates (row by row)
    pub fn iter(&self) -> impl Iterator<Item = CellCoord> {
        let (start, end) = (self.start, self.end);
        (start.row..=end.row)
            .flat_map(move |row| (start.col..=end.col).map(move |col| CellCoord::new(row, col)))
    }
}

impl fmt::Display for SelectionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_cell() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_col_labels() {
        assert_eq!(col_to_label(0), "A");
        assert_eq!(col_to_label(25), "Z");
        assert_eq!(col_to_label(26), "AA");
        assert_eq!(col_to_label(701), "ZZ");
        assert_eq!(col_from_label("A"), Some(0));
        assert_eq!(col_from_label("AB"), Some(27));
        assert_eq!(col_from_label(""), None);
        assert_eq!(col_from_label("A1"), None);
    }

    #[test]
    fn test_coord_a1() {
        assert_eq!(CellCoord::from_a1("A1"), Some(CellCoord::new(0, 0)));
        assert_eq!(CellCoord::from_a1("b2"), Some(CellCoord::new(1, 1)));
        assert_eq!(CellCoord::from_a1("AA100"), Some(CellCoord::new(99, 26)));
        assert_eq!(CellCoord::from_a1("A0"), None);
        assert_eq!(CellCoord::from_a1("1A"), None);
        assert_eq!(CellCoord::new(99, 26).to_a1(), "AA100");
    }

    #[test]
    fn test_bounding_rectangle() {
        let coords = vec![
            CellCoord::new(3, 1),
            CellCoord::new(1, 4),
            CellCoord::new(2, 2),
        ];
        let range = SelectionRange::bounding(coords).unwrap();
        assert_eq!(range.start, CellCoord::new(1, 1));
        assert_eq!(range.end, CellCoord::new(3, 4));
        assert_eq!(range.cell_count(), 12);
        assert!(SelectionRange::bounding(Vec::new()).is_none());
    }

    #[test]
    fn test_clamp() {
        let range = SelectionRange::new(CellCoord::new(1, 1), CellCoord::new(10, 10));
        let clamped = range.clamp_to(4, 3).unwrap();
        assert_eq!(clamped.end, CellCoord::new(3, 2));
        assert!(range.clamp_to(1, 5).is_none());
    }

    #[test]
    fn test_iteration_is_row_major() {
        let range = SelectionRange::new(CellCoord::new(1, 1), CellCoord::new(0, 0));
        let coords: Vec<_> = range.iter().collect();
        assert_eq!(
            coords,
            vec![
                CellCoord::new(0, 0),
                CellCoord::new(0, 1),
                CellCoord::new(1, 0),
                CellCoord::new(1, 1),
            ]
        );
        assert_eq!(range.to_string(), "A1:B2");
    }
}
