use serde::{Deserialize, Serialize};

use crate::range::{CellCoord, MAX_COLS, MAX_ROWS};

/// Default grid size of a fresh session
pub const DEFAULT_ROWS: usize = 30;
pub const DEFAULT_COLS: usize = 30;

/// A single value write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellUpdate {
    pub row: u32,
    pub col: u32,
    pub value: String,
}

impl CellUpdate {
    pub fn new(row: u32, col: u32, value: impl Into<String>) -> Self {
        Self {
            row,
            col,
            value: value.into(),
        }
    }

    pub fn coord(&self) -> CellCoord {
        CellCoord::new(self.row, self.col)
    }
}

/// Rectangular grid of cell values.
///
/// Every row has the same length. During interactive use the grid only grows;
/// it is replaced wholesale when a template is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GridData {
    rows: Vec<Vec<String>>,
}

impl Default for GridData {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS, DEFAULT_COLS)
    }
}

impl GridData {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows: vec![vec![String::new(); cols]; rows],
        }
    }

    /// Build from possibly ragged rows, padding each to the widest one
    pub fn from_rows(mut rows: Vec<Vec<String>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, String::new());
        }
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn get(&self, coord: CellCoord) -> Option<&str> {
        self.rows
            .get(coord.row as usize)
            .and_then(|row| row.get(coord.col as usize))
            .map(String::as_str)
    }

    /// Overwrite an in-bounds cell. Returns false if the coordinate lies
    /// outside the grid.
    pub fn set(&mut self, coord: CellCoord, value: impl Into<String>) -> bool {
        match self
            .rows
            .get_mut(coord.row as usize)
            .and_then(|row| row.get_mut(coord.col as usize))
        {
            Some(cell) => {
                *cell = value.into();
                true
            }
            None => false,
        }
    }

    /// Append empty columns to every row, then empty rows at the bottom.
    /// Growth stops at the worksheet limits.
    pub fn grow(&mut self, add_rows: usize, add_cols: usize) {
        let add_rows = add_rows.min((MAX_ROWS as usize).saturating_sub(self.row_count()));
        let add_cols = add_cols.min((MAX_COLS as usize).saturating_sub(self.col_count()));
        if add_cols > 0 {
            for row in &mut self.rows {
                row.resize(row.len() + add_cols, String::new());
            }
        }
        if add_rows > 0 {
            let width = self.col_count().max(add_cols);
            self.rows
                .extend(std::iter::repeat_with(|| vec![String::new(); width]).take(add_rows));
        }
    }

    /// Grow just enough to hold `rows` x `cols`. Returns whether it grew.
    pub fn ensure_size(&mut self, rows: usize, cols: usize) -> bool {
        let before = (self.row_count(), self.col_count());
        self.grow(rows.saturating_sub(before.0), cols.saturating_sub(before.1));
        (self.row_count(), self.col_count()) != before
    }

    /// Grow to fit, then write every update. Updates beyond the worksheet
    /// limits are dropped. Returns how many cells were written.
    pub fn write_batch(&mut self, updates: &[CellUpdate]) -> usize {
        let fitting = || updates.iter().filter(|u| u.coord().is_within_limits());
        let rows = fitting().map(|u| u.row as usize + 1).max().unwrap_or(0);
        let cols = fitting().map(|u| u.col as usize + 1).max().unwrap_or(0);
        self.ensure_size(rows, cols);

        updates
            .iter()
            .filter(|u| self.set(u.coord(), u.value.clone()))
            .count()
    }
}
