use thiserror::Error;

use crate::merge::MergeRegion;

/// Local validation failures raised by editor operations.
///
/// None of these leave partial state behind: the operation is rejected before
/// anything is mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("merge ignored: selection is a single cell")]
    SingleCellMerge,

    #[error("merge overlaps existing merged region at {}", region.anchor())]
    MergeOverlap { region: MergeRegion },

    #[error("no merged region at row {row}, column {col}")]
    MergeNotFound { row: u32, col: u32 },

    #[error("no cells selected")]
    NoSelection,

    #[error("invalid starting year '{0}': expected a year between 2000 and 2100")]
    InvalidTemplateYear(String),

    #[error("invalid cell reference '{0}'")]
    InvalidReference(String),
}

impl EditorError {
    /// Stable machine-readable code for clients
    pub fn code(&self) -> &'static str {
        match self {
            EditorError::SingleCellMerge => "SINGLE_CELL_MERGE",
            EditorError::MergeOverlap { .. } => "MERGE_OVERLAP",
            EditorError::MergeNotFound { .. } => "MERGE_NOT_FOUND",
            EditorError::NoSelection => "NO_SELECTION",
            EditorError::InvalidTemplateYear(_) => "INVALID_TEMPLATE_YEAR",
            EditorError::InvalidReference(_) => "INVALID_REFERENCE",
        }
    }
}
