use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static A1_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z]+)(\d+)$").expect("valid A1 pattern"));
static BACKEND_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^c(\d+)r(\d+)$").expect("valid backend pattern"));

/// Worksheet row limit shared by the grid, the AI fill and the export
pub const MAX_ROWS: u32 = 1_048_576;
/// Worksheet column limit
pub const MAX_COLS: u32 = 16_384;

/// Cell coordinate (0-indexed internally)
#[derive(Debug, Clone, Copy, Default, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CellCoord {
    pub row: u32,
    pub col: u32,
}

impl CellCoord {
    pub const fn new(row: u32, col: u32) -> Self {
        CellCoord { row, col }
    }

    /// Whether the coordinate fits on a worksheet
    pub const fn is_within_limits(&self) -> bool {
        self.row < MAX_ROWS && self.col < MAX_COLS
    }

    /// Parse display notation (e.g., "A1" -> (0, 0), "B2" -> (1, 1)).
    ///
    /// Only uppercase column letters followed by a 1-based row are accepted.
    pub fn from_a1(notation: &str) -> Option<Self> {
        let caps = A1_PATTERN.captures(notation)?;
        let col = col_from_label(&caps[1])?;
        let row: u32 = caps[2].parse().ok()?;

        if row == 0 {
            return None; // Rows are 1-indexed in A1 notation
        }

        Some(CellCoord { row: row - 1, col })
    }

    /// Convert to display notation (e.g., (0, 0) -> "A1")
    pub fn to_a1(&self) -> String {
        format!("{}{}", col_to_label(self.col), self.row as u64 + 1)
    }

    /// Parse backend notation (e.g., "c1r1" -> (0, 0), "c3r2" -> (1, 2))
    pub fn from_backend(notation: &str) -> Option<Self> {
        let caps = BACKEND_PATTERN.captures(notation)?;
        let col: u32 = caps[1].parse().ok()?;
        let row: u32 = caps[2].parse().ok()?;

        if col == 0 || row == 0 {
            return None;
        }

        Some(CellCoord {
            row: row - 1,
            col: col - 1,
        })
    }

    /// Convert to backend notation (e.g., (0, 0) -> "c1r1")
    pub fn to_backend(&self) -> String {
        format!("c{}r{}", self.col as u64 + 1, self.row as u64 + 1)
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1())
    }
}

/// Convert column index (0-indexed) to label (A, B, ..., Z, AA, AB, ...)
pub fn col_to_label(col: u32) -> String {
    let mut label = String::new();
    let mut n = col as u64 + 1; // 1-indexed for calculation

    while n > 0 {
        n -= 1;
        label.insert(0, char::from(b'A' + (n % 26) as u8));
        n /= 26;
    }

    label
}

/// Convert column label (A, B, ..., Z, AA, AB, ...) to index (0-indexed)
pub fn col_from_label(label: &str) -> Option<u32> {
    let mut col: u32 = 0;

    for c in label.chars() {
        if !c.is_ascii_uppercase() {
            return None;
        }
        col = col
            .checked_mul(26)?
            .checked_add(c as u32 - 'A' as u32 + 1)?;
    }

    if col == 0 {
        None
    } else {
        Some(col - 1) // Convert to 0-indexed
    }
}

/// A range of cells (e.g., A1:B10), always stored top-left to bottom-right
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRange {
    pub start: CellCoord,
    pub end: CellCoord,
}

impl CellRange {
    pub fn new(start: CellCoord, end: CellCoord) -> Self {
        CellRange {
            start: CellCoord::new(start.row.min(end.row), start.col.min(end.col)),
            end: CellCoord::new(start.row.max(end.row), start.col.max(end.col)),
        }
    }

    pub fn single(coord: CellCoord) -> Self {
        CellRange {
            start: coord,
            end: coord,
        }
    }

    /// Convert to A1:B1 notation
    pub fn to_a1(&self) -> String {
        if self.start == self.end {
            self.start.to_a1()
        } else {
            format!("{}:{}", self.start.to_a1(), self.end.to_a1())
        }
    }

    /// Check if a coordinate is within this range
    pub fn contains(&self, coord: CellCoord) -> bool {
        coord.row >= self.start.row
            && coord.row <= self.end.row
            && coord.col >= self.start.col
            && coord.col <= self.end.col
    }

    /// Number of rows covered by the range
    pub fn row_span(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Number of columns covered by the range
    pub fn col_span(&self) -> u32 {
        self.end.col - self.start.col + 1
    }

    pub fn is_single_cell(&self) -> bool {
        self.start == self.end
    }

    /// Iterate over all coordinates in the range (row by row)
    pub fn iter(&self) -> CellRangeIter {
        CellRangeIter {
            range: *self,
            current_row: self.start.row,
            current_col: self.start.col,
            done: false,
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1())
    }
}

impl IntoIterator for CellRange {
    type Item = CellCoord;
    type IntoIter = CellRangeIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over coordinates in a range
pub struct CellRangeIter {
    range: CellRange,
    current_row: u32,
    current_col: u32,
    done: bool,
}

impl Iterator for CellRangeIter {
    type Item = CellCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let coord = CellCoord::new(self.current_row, self.current_col);

        if self.current_col < self.range.end.col {
            self.current_col += 1;
        } else if self.current_row < self.range.end.row {
            self.current_col = self.range.start.col;
            self.current_row += 1;
        } else {
            self.done = true;
        }

        Some(coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_col_to_label() {
        assert_eq!(col_to_label(0), "A");
        assert_eq!(col_to_label(25), "Z");
        assert_eq!(col_to_label(26), "AA");
        assert_eq!(col_to_label(27), "AB");
        assert_eq!(col_to_label(701), "ZZ");
        assert_eq!(col_to_label(702), "AAA");
    }

    #[test]
    fn test_col_from_label() {
        assert_eq!(col_from_label("A"), Some(0));
        assert_eq!(col_from_label("Z"), Some(25));
        assert_eq!(col_from_label("AA"), Some(26));
        assert_eq!(col_from_label("ZZ"), Some(701));
        assert_eq!(col_from_label("a"), None);
        assert_eq!(col_from_label(""), None);
    }

    #[test]
    fn test_display_reference() {
        assert_eq!(CellCoord::new(0, 0).to_a1(), "A1");
        assert_eq!(CellCoord::new(1, 1).to_a1(), "B2");
        assert_eq!(CellCoord::new(1, 25).to_a1(), "Z2");
        assert_eq!(CellCoord::new(25, 1).to_a1(), "B26");
        assert_eq!(CellCoord::new(0, 26).to_a1(), "AA1");

        assert_eq!(CellCoord::from_a1("A1"), Some(CellCoord::new(0, 0)));
        assert_eq!(CellCoord::from_a1("AA100"), Some(CellCoord::new(99, 26)));
    }

    #[test]
    fn test_references_at_u32_max() {
        let last = CellCoord::new(u32::MAX, 0);
        assert_eq!(last.to_a1(), "A4294967296");
        assert_eq!(last.to_backend(), "c1r4294967296");
        assert!(!last.is_within_limits());
        assert!(CellCoord::new(MAX_ROWS - 1, MAX_COLS - 1).is_within_limits());
        assert!(!CellCoord::new(0, MAX_COLS).is_within_limits());
    }

    #[test]
    fn test_display_reference_rejects_malformed() {
        assert_eq!(CellCoord::from_a1(""), None);
        assert_eq!(CellCoord::from_a1("a1"), None);
        assert_eq!(CellCoord::from_a1("A"), None);
        assert_eq!(CellCoord::from_a1("1A"), None);
        assert_eq!(CellCoord::from_a1("A0"), None);
        assert_eq!(CellCoord::from_a1(" A1"), None);
    }

    #[test]
    fn test_backend_reference() {
        assert_eq!(CellCoord::new(0, 0).to_backend(), "c1r1");
        assert_eq!(CellCoord::new(4, 2).to_backend(), "c3r5");
        assert_eq!(CellCoord::from_backend("c1r1"), Some(CellCoord::new(0, 0)));
        assert_eq!(CellCoord::from_backend("c2r1"), Some(CellCoord::new(0, 1)));

        assert_eq!(CellCoord::from_backend("r1c1"), None);
        assert_eq!(CellCoord::from_backend("c0r1"), None);
        assert_eq!(CellCoord::from_backend("c1r1x"), None);
        assert_eq!(CellCoord::from_backend("A1"), None);
    }

    #[test]
    fn test_references_round_trip() {
        for row in [0u32, 1, 9, 99, 1_048_575] {
            for col in [0u32, 1, 25, 26, 51, 701, 702, 16_383] {
                let coord = CellCoord::new(row, col);
                assert_eq!(CellCoord::from_a1(&coord.to_a1()), Some(coord));
                assert_eq!(CellCoord::from_backend(&coord.to_backend()), Some(coord));
            }
        }
    }

    #[test]
    fn test_range_iteration() {
        let range = CellRange::new(CellCoord::new(1, 1), CellCoord::new(0, 0));
        let coords: Vec<_> = range.iter().collect();

        assert_eq!(coords.len(), 4);
        assert_eq!(coords[0], CellCoord::new(0, 0));
        assert_eq!(coords[1], CellCoord::new(0, 1));
        assert_eq!(coords[2], CellCoord::new(1, 0));
        assert_eq!(coords[3], CellCoord::new(1, 1));
    }

    #[test]
    fn test_single_cell_range() {
        let range = CellRange::single(CellCoord::new(3, 4));
        assert!(range.is_single_cell());
        assert_eq!(range.iter().count(), 1);
        assert_eq!(range.to_a1(), "E4");
    }
}
