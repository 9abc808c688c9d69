pub mod error;
pub mod format;
pub mod grid;
pub mod merge;
pub mod range;
pub mod selection;
pub mod session;
pub mod style;
pub mod stylesheet;
pub mod template;

pub use error::EditorError;
pub use format::{Align, Color, StyleAttribute, StyleRecord, ToolbarState};
pub use grid::{CellUpdate, GridData};
pub use merge::{MergeRegion, MergeSet, MergeToggle};
pub use range::{col_from_label, col_to_label, CellCoord, CellRange, MAX_COLS, MAX_ROWS};
pub use selection::{Selection, SelectionRect};
pub use session::{
    AiPrompt, CellClass, EditorSession, Invalidation, PromptRejection, RenderPatch, SelectionInfo,
};
pub use style::{StyleBook, StyleClassId, StyleLookup, StyleRegistry};
pub use stylesheet::{synthesize, RenderRule, StyleSheet};
pub use template::{parse_start_year, AcademicCalendar, Semester, TemplateOutput};
