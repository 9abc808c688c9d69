//! Editor session: the aggregate every user-facing operation goes through.
//!
//! Operations mutate the bookkeeping and mark what changed. [`EditorSession::flush`]
//! then produces one [`RenderPatch`] per logical operation, carrying only the
//! parts the grid widget has to re-apply.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::EditorError;
use crate::format::{StyleAttribute, ToolbarState};
use crate::grid::{CellUpdate, GridData};
use crate::merge::{MergeRegion, MergeSet, MergeToggle};
use crate::range::CellCoord;
use crate::selection::{Selection, SelectionRect};
use crate::style::{compose_class_name, find_style_token, StyleBook, StyleClassId};
use crate::stylesheet::synthesize;
use crate::template::{parse_start_year, AcademicCalendar, Semester};

/// What the next flush has to send
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Invalidation {
    pub data: bool,
    pub styles: bool,
    pub merges: bool,
    pub layout: bool,
}

impl Invalidation {
    pub fn all() -> Self {
        Self {
            data: true,
            styles: true,
            merges: true,
            layout: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.data || self.styles || self.merges || self.layout)
    }
}

/// Class-name metadata of one cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellClass {
    pub row: u32,
    pub col: u32,
    pub class_name: String,
}

/// Changes the grid widget applies in a single synchronization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<GridData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_classes: Option<Vec<CellClass>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stylesheet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merges: Option<Vec<MergeRegion>>,
    /// Empty means the widget's own default widths
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_widths: Option<Vec<u32>>,
}

/// What the toolbar and formula bar show after a selection change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionInfo {
    pub reference: String,
    pub value: String,
    pub toolbar: ToolbarState,
}

/// Why an AI prompt could not be started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptRejection {
    Empty,
    InFlight,
}

/// AI prompt box state. At most one request may be pending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiPrompt {
    pub text: String,
    pending: bool,
}

impl AiPrompt {
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Mark a request as pending and return the trimmed prompt
    pub fn begin(&mut self) -> Result<String, PromptRejection> {
        if self.pending {
            return Err(PromptRejection::InFlight);
        }
        let prompt = self.text.trim();
        if prompt.is_empty() {
            return Err(PromptRejection::Empty);
        }
        self.pending = true;
        Ok(prompt.to_string())
    }

    /// Release the pending flag. The prompt is cleared only on success.
    pub fn finish(&mut self, success: bool) {
        self.pending = false;
        if success {
            self.text.clear();
        }
    }
}

#[derive(Debug, Clone)]
pub struct EditorSession {
    grid: GridData,
    styles: StyleBook,
    merges: MergeSet,
    selection: Selection,
    toolbar: ToolbarState,
    formula_bar: String,
    /// Widget class tokens that are not style classes (e.g. alignment helpers)
    foreign_classes: HashMap<CellCoord, String>,
    column_widths: Vec<u32>,
    ai_prompt: AiPrompt,
    pending: Invalidation,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::with_grid(GridData::default())
    }
}

impl EditorSession {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::with_grid(GridData::new(rows, cols))
    }

    pub fn with_grid(grid: GridData) -> Self {
        Self {
            grid,
            styles: StyleBook::new(),
            merges: MergeSet::new(),
            selection: Selection::new(),
            toolbar: ToolbarState::default(),
            formula_bar: String::new(),
            foreign_classes: HashMap::new(),
            column_widths: Vec::new(),
            ai_prompt: AiPrompt::default(),
            pending: Invalidation::default(),
        }
    }

    pub fn grid(&self) -> &GridData {
        &self.grid
    }

    pub fn styles(&self) -> &StyleBook {
        &self.styles
    }

    pub fn merges(&self) -> &MergeSet {
        &self.merges
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn toolbar(&self) -> &ToolbarState {
        &self.toolbar
    }

    pub fn formula_bar(&self) -> &str {
        &self.formula_bar
    }

    pub fn column_widths(&self) -> &[u32] {
        &self.column_widths
    }

    pub fn ai_prompt(&self) -> &AiPrompt {
        &self.ai_prompt
    }

    pub fn ai_prompt_mut(&mut self) -> &mut AiPrompt {
        &mut self.ai_prompt
    }

    pub fn pending(&self) -> Invalidation {
        self.pending
    }

    // Selection

    /// Replace the selection and refresh the toolbar and formula bar from the
    /// anchor cell.
    pub fn select(&mut self, rect: SelectionRect) -> SelectionInfo {
        let rect = self.clamp_to_grid(rect);
        self.selection.select(rect);
        self.refresh_active_cell()
    }

    /// Add a rectangle to a multi-range selection. The anchor stays on the
    /// first range.
    pub fn add_to_selection(&mut self, rect: SelectionRect) -> SelectionInfo {
        let rect = self.clamp_to_grid(rect);
        self.selection.add(rect);
        self.refresh_active_cell()
    }

    /// Select by display reference: `B3` or `A1:C4`
    pub fn select_reference(&mut self, reference: &str) -> Result<SelectionInfo, EditorError> {
        let invalid = || EditorError::InvalidReference(reference.to_string());

        let (start, end) = match reference.split_once(':') {
            Some((a, b)) => (
                CellCoord::from_a1(a.trim()).ok_or_else(invalid)?,
                CellCoord::from_a1(b.trim()).ok_or_else(invalid)?,
            ),
            None => {
                let cell = CellCoord::from_a1(reference.trim()).ok_or_else(invalid)?;
                (cell, cell)
            }
        };

        Ok(self.select(SelectionRect::new(
            start.row as i64,
            start.col as i64,
            end.row as i64,
            end.col as i64,
        )))
    }

    pub fn deselect(&mut self) {
        self.selection.clear();
        self.toolbar = ToolbarState::default();
        self.formula_bar.clear();
    }

    fn clamp_to_grid(&self, rect: SelectionRect) -> SelectionRect {
        rect.clamped(self.grid.row_count(), self.grid.col_count())
    }

    fn refresh_active_cell(&mut self) -> SelectionInfo {
        let anchor = self.selection.anchor().unwrap_or_default();
        self.toolbar = self
            .styles
            .resolve(anchor)
            .map(ToolbarState::from)
            .unwrap_or_default();
        self.formula_bar = self.grid.get(anchor).unwrap_or_default().to_string();

        SelectionInfo {
            reference: anchor.to_a1(),
            value: self.formula_bar.clone(),
            toolbar: self.toolbar.clone(),
        }
    }

    // Styling and merging

    /// Apply one toolbar change to every selected cell
    pub fn apply_style(&mut self, attribute: &StyleAttribute) -> Result<Vec<StyleClassId>, EditorError> {
        if self.selection.is_empty() {
            return Err(EditorError::NoSelection);
        }

        let touched = self.styles.apply_to_ranges(self.selection.ranges(), attribute);
        if let Some(record) = self.selection.anchor().and_then(|a| self.styles.resolve(a)) {
            self.toolbar = ToolbarState::from(record);
        }
        self.pending.styles = true;
        Ok(touched)
    }

    pub fn toggle_merge(&mut self) -> Result<MergeToggle, EditorError> {
        let range = self.selection.primary().ok_or(EditorError::NoSelection)?;
        let outcome = self.merges.toggle(range)?;
        self.pending.merges = true;
        Ok(outcome)
    }

    /// Record the class-name string the widget carries for a cell. A style
    /// token already known to the registry is adopted; every other token is
    /// kept and re-emitted alongside the cell's style class.
    pub fn set_cell_class_name(&mut self, coord: CellCoord, class_name: &str) {
        if let Some(id) = find_style_token(class_name).and_then(StyleClassId::parse) {
            self.styles.adopt(coord, id);
        }

        let foreign: Vec<&str> = class_name
            .split_whitespace()
            .filter(|token| find_style_token(token).is_none())
            .collect();
        if foreign.is_empty() {
            self.foreign_classes.remove(&coord);
        } else {
            self.foreign_classes.insert(coord, foreign.join(" "));
        }
        self.pending.styles = true;
    }

    // Values

    pub fn set_cell(&mut self, coord: CellCoord, value: impl Into<String>) {
        self.set_cells(&[CellUpdate {
            row: coord.row,
            col: coord.col,
            value: value.into(),
        }]);
    }

    /// Write a batch of edits, growing the grid to fit. Returns the number of
    /// cells written.
    pub fn set_cells(&mut self, updates: &[CellUpdate]) -> usize {
        if updates.is_empty() {
            return 0;
        }

        let written = self.grid.write_batch(updates);
        if let Some(anchor) = self.selection.anchor() {
            if let Some(update) = updates.iter().rev().find(|u| u.coord() == anchor) {
                self.formula_bar = update.value.clone();
            }
        }
        self.pending.data = true;
        written
    }

    /// Write the formula-bar value into the anchor cell
    pub fn submit_formula_bar(&mut self, value: impl Into<String>) -> Result<CellCoord, EditorError> {
        let anchor = self.selection.anchor().ok_or(EditorError::NoSelection)?;
        let value = value.into();
        self.grid.write_batch(&[CellUpdate::new(anchor.row, anchor.col, value.clone())]);
        self.formula_bar = value;
        self.pending.data = true;
        Ok(anchor)
    }

    /// Append empty rows and columns (scroll reached an edge)
    pub fn grow(&mut self, add_rows: usize, add_cols: usize) {
        if add_rows == 0 && add_cols == 0 {
            return;
        }
        self.grid.grow(add_rows, add_cols);
        self.pending.data = true;
    }

    /// Grow just enough to hold `rows` x `cols`. Returns whether it grew.
    pub fn ensure_size(&mut self, rows: usize, cols: usize) -> bool {
        let grew = self.grid.ensure_size(rows, cols);
        if grew {
            self.pending.data = true;
        }
        grew
    }

    // Templates

    /// Replace data, styles, merges and column widths with the academic
    /// calendar. The year is validated before anything is touched.
    pub fn apply_template(&mut self, year_text: &str, semester: Semester) -> Result<(), EditorError> {
        let year = parse_start_year(year_text)?;
        let output = AcademicCalendar::generate(year, semester)?;

        self.grid = output.data;
        self.styles.clear();
        self.foreign_classes.clear();
        for (range, record) in output.styles {
            self.styles.assign_range(range, record);
        }
        self.merges.replace(output.merges);
        self.column_widths = output.column_widths;
        self.deselect();

        self.pending = Invalidation::all();
        Ok(())
    }

    // Render synchronization

    /// Take the pending changes as one patch, or `None` if nothing changed
    pub fn flush(&mut self) -> Option<RenderPatch> {
        let pending = std::mem::take(&mut self.pending);
        if pending.is_empty() {
            return None;
        }

        if pending.styles {
            self.styles.prune();
        }
        Some(self.build_patch(pending))
    }

    /// Everything, for a client that has no state yet
    pub fn snapshot(&self) -> RenderPatch {
        self.build_patch(Invalidation::all())
    }

    /// Style sheet text for the current registry
    pub fn stylesheet_css(&self) -> String {
        synthesize(self.styles.registry()).to_css()
    }

    fn build_patch(&self, pending: Invalidation) -> RenderPatch {
        RenderPatch {
            data: pending.data.then(|| self.grid.clone()),
            cell_classes: pending.styles.then(|| self.cell_classes()),
            stylesheet: pending.styles.then(|| self.stylesheet_css()),
            merges: pending.merges.then(|| self.merges.as_slice().to_vec()),
            column_widths: pending.layout.then(|| self.column_widths.clone()),
        }
    }

    fn cell_classes(&self) -> Vec<CellClass> {
        let mut classes: HashMap<CellCoord, String> = self.foreign_classes.clone();
        for (coord, id) in self.styles.cells().iter() {
            let foreign = classes.remove(coord).unwrap_or_default();
            classes.insert(*coord, compose_class_name(&foreign, id));
        }

        let mut classes: Vec<CellClass> = classes
            .into_iter()
            .map(|(coord, class_name)| CellClass {
                row: coord.row,
                col: coord.col,
                class_name,
            })
            .collect();
        classes.sort_by_key(|c| (c.row, c.col));
        classes
    }
}
