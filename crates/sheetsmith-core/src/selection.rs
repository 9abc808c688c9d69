use serde::{Deserialize, Serialize};

use crate::range::{CellCoord, CellRange};

/// Selection corners as reported by the grid widget.
///
/// A `-1` on either axis means a whole row or column was picked from the
/// headers; it is clamped to 0 when normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRect {
    pub anchor_row: i64,
    pub anchor_col: i64,
    pub head_row: i64,
    pub head_col: i64,
}

impl SelectionRect {
    pub fn new(anchor_row: i64, anchor_col: i64, head_row: i64, head_col: i64) -> Self {
        Self {
            anchor_row,
            anchor_col,
            head_row,
            head_col,
        }
    }

    pub fn cell(row: u32, col: u32) -> Self {
        Self::new(row as i64, col as i64, row as i64, col as i64)
    }

    /// Pull every corner inside a `rows` x `cols` grid. Header picks (`-1`)
    /// are left for [`normalize`](Self::normalize) to handle.
    pub fn clamped(&self, rows: usize, cols: usize) -> Self {
        let last_row = (rows.max(1) - 1) as i64;
        let last_col = (cols.max(1) - 1) as i64;
        Self::new(
            self.anchor_row.min(last_row),
            self.anchor_col.min(last_col),
            self.head_row.min(last_row),
            self.head_col.min(last_col),
        )
    }

    /// Top-left to bottom-right, negatives clamped to 0
    pub fn normalize(&self) -> CellRange {
        let clamp = |v: i64| v.clamp(0, u32::MAX as i64) as u32;
        let min_row = clamp(self.anchor_row.min(self.head_row));
        let max_row = clamp(self.anchor_row.max(self.head_row));
        let min_col = clamp(self.anchor_col.min(self.head_col));
        let max_col = clamp(self.anchor_col.max(self.head_col));

        CellRange::new(CellCoord::new(min_row, min_col), CellCoord::new(max_row, max_col))
    }
}

/// Current selection: the ranges the next toolbar action applies to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    ranges: Vec<CellRange>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection with a single rectangle
    pub fn select(&mut self, rect: SelectionRect) -> CellRange {
        let range = rect.normalize();
        self.ranges.clear();
        self.ranges.push(range);
        range
    }

    /// Add another rectangle (multi-range selection)
    pub fn add(&mut self, rect: SelectionRect) -> CellRange {
        let range = rect.normalize();
        self.ranges.push(range);
        range
    }

    pub fn clear(&mut self) {
        self.ranges.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn ranges(&self) -> &[CellRange] {
        &self.ranges
    }

    /// The first range: the one merge toggling and the formula bar act on
    pub fn primary(&self) -> Option<CellRange> {
        self.ranges.first().copied()
    }

    /// Top-left cell of the primary range
    pub fn anchor(&self) -> Option<CellCoord> {
        self.primary().map(|r| r.start)
    }
}
