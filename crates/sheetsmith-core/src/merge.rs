use serde::{Deserialize, Serialize};

use crate::error::EditorError;
use crate::range::{CellCoord, CellRange};

/// A rectangular merged area, in the shape the grid widget's merge
/// configuration expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MergeRegion {
    pub row: u32,
    pub col: u32,
    pub rowspan: u32,
    pub colspan: u32,
}

impl MergeRegion {
    pub const fn new(row: u32, col: u32, rowspan: u32, colspan: u32) -> Self {
        Self {
            row,
            col,
            rowspan,
            colspan,
        }
    }

    pub fn from_range(range: CellRange) -> Self {
        Self {
            row: range.start.row,
            col: range.start.col,
            rowspan: range.row_span(),
            colspan: range.col_span(),
        }
    }

    pub fn anchor(&self) -> CellCoord {
        CellCoord::new(self.row, self.col)
    }

    /// Last row covered (inclusive)
    pub fn row_end(&self) -> u32 {
        self.row + self.rowspan.saturating_sub(1)
    }

    /// Last column covered (inclusive)
    pub fn col_end(&self) -> u32 {
        self.col + self.colspan.saturating_sub(1)
    }

    pub fn to_range(&self) -> CellRange {
        CellRange::new(self.anchor(), CellCoord::new(self.row_end(), self.col_end()))
    }

    pub fn contains(&self, coord: CellCoord) -> bool {
        coord.row >= self.row
            && coord.row <= self.row_end()
            && coord.col >= self.col
            && coord.col <= self.col_end()
    }

    pub fn overlaps(&self, other: &MergeRegion) -> bool {
        self.row <= other.row_end()
            && self.row_end() >= other.row
            && self.col <= other.col_end()
            && self.col_end() >= other.col
    }

    /// A real merge spans at least two cells
    pub fn is_valid(&self) -> bool {
        self.rowspan >= 1 && self.colspan >= 1 && !(self.rowspan == 1 && self.colspan == 1)
    }
}

/// Outcome of toggling the merge state of a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "region", rename_all = "lowercase")]
pub enum MergeToggle {
    Merged(MergeRegion),
    Unmerged(MergeRegion),
}

/// Set of non-overlapping merged regions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MergeSet {
    regions: Vec<MergeRegion>,
}

impl MergeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit `range` as a merged region unless it is a single cell or it
    /// overlaps a region already present.
    pub fn try_merge(&mut self, range: CellRange) -> Result<MergeRegion, EditorError> {
        if range.is_single_cell() {
            return Err(EditorError::SingleCellMerge);
        }
        let region = MergeRegion::from_range(range);

        if let Some(existing) = self.regions.iter().find(|m| m.overlaps(&region)) {
            return Err(EditorError::MergeOverlap { region: *existing });
        }

        self.regions.push(region);
        Ok(region)
    }

    /// Remove the region containing `coord`
    pub fn try_unmerge(&mut self, coord: CellCoord) -> Result<MergeRegion, EditorError> {
        let index = self
            .regions
            .iter()
            .position(|m| m.contains(coord))
            .ok_or(EditorError::MergeNotFound {
                row: coord.row,
                col: coord.col,
            })?;

        Ok(self.regions.remove(index))
    }

    /// Unmerge if the selection's anchor sits in a region, merge otherwise
    pub fn toggle(&mut self, selection: CellRange) -> Result<MergeToggle, EditorError> {
        if self.region_at(selection.start).is_some() {
            self.try_unmerge(selection.start).map(MergeToggle::Unmerged)
        } else {
            self.try_merge(selection).map(MergeToggle::Merged)
        }
    }

    pub fn region_at(&self, coord: CellCoord) -> Option<&MergeRegion> {
        self.regions.iter().find(|m| m.contains(coord))
    }

    /// Replace every region wholesale. Invalid or overlapping entries are
    /// dropped, first one wins. Returns how many were dropped.
    pub fn replace(&mut self, regions: impl IntoIterator<Item = MergeRegion>) -> usize {
        self.regions.clear();
        let mut dropped = 0;
        for region in regions {
            if region.is_valid() && !self.regions.iter().any(|m| m.overlaps(&region)) {
                self.regions.push(region);
            } else {
                dropped += 1;
            }
        }
        dropped
    }

    pub fn iter(&self) -> impl Iterator<Item = &MergeRegion> {
        self.regions.iter()
    }

    pub fn as_slice(&self) -> &[MergeRegion] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn clear(&mut self) {
        self.regions.clear();
    }
}
