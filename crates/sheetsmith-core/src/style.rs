use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use uuid::Uuid;

use crate::format::{StyleAttribute, StyleRecord};
use crate::range::{CellCoord, CellRange};

/// Reserved prefix distinguishing style-class tokens from any other class
/// names the grid widget attaches to a cell.
pub const STYLE_CLASS_PREFIX: &str = "cell-style-";

/// Opaque identifier of a style class
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleClassId(String);

impl StyleClassId {
    /// Mint a fresh, globally unique class id
    pub fn mint() -> Self {
        StyleClassId(format!("{}{}", STYLE_CLASS_PREFIX, Uuid::new_v4().simple()))
    }

    /// Accept an existing token if it carries the reserved prefix
    pub fn parse(token: &str) -> Option<Self> {
        let suffix = token.strip_prefix(STYLE_CLASS_PREFIX)?;
        if suffix.is_empty() || !suffix.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return None;
        }
        Some(StyleClassId(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StyleClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract the style-class token from a space separated class-name string
pub fn find_style_token(class_name: &str) -> Option<&str> {
    class_name
        .split_whitespace()
        .find(|token| token.starts_with(STYLE_CLASS_PREFIX))
}

/// Attach `id` to a class-name string, keeping unrelated tokens and replacing
/// any previous style token.
pub fn compose_class_name(class_name: &str, id: &StyleClassId) -> String {
    class_name
        .split_whitespace()
        .filter(|token| !token.starts_with(STYLE_CLASS_PREFIX))
        .chain(std::iter::once(id.as_str()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolved per-cell style lookup
pub trait StyleLookup {
    fn style_at(&self, coord: CellCoord) -> Option<&StyleRecord>;
}

/// Style class id -> style record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleRegistry {
    records: BTreeMap<StyleClassId, StyleRecord>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &StyleClassId) -> Option<&StyleRecord> {
        self.records.get(id)
    }

    /// Store `record` under `id`, replacing any previous record
    pub fn insert(&mut self, id: StyleClassId, record: StyleRecord) {
        self.records.insert(id, record);
    }

    /// Replace the record under `id` with a copy carrying `attribute`
    pub fn update(&mut self, id: &StyleClassId, attribute: &StyleAttribute) {
        let next = self
            .records
            .get(id)
            .map(|record| record.with(attribute))
            .unwrap_or_else(|| StyleRecord::new().with(attribute));
        self.records.insert(id.clone(), next);
    }

    pub fn remove(&mut self, id: &StyleClassId) -> Option<StyleRecord> {
        self.records.remove(id)
    }

    /// Iterate records in id order
    pub fn iter(&self) -> impl Iterator<Item = (&StyleClassId, &StyleRecord)> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

/// Cell coordinate -> style class id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellClassMap {
    classes: HashMap<CellCoord, StyleClassId>,
}

impl CellClassMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, coord: CellCoord) -> Option<&StyleClassId> {
        self.classes.get(&coord)
    }

    pub fn assign(&mut self, coord: CellCoord, id: StyleClassId) {
        self.classes.insert(coord, id);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CellCoord, &StyleClassId)> {
        self.classes.iter()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn clear(&mut self) {
        self.classes.clear();
    }
}

/// Style registry plus the cell-to-class map that references it
#[derive(Debug, Clone, Default)]
pub struct StyleBook {
    registry: StyleRegistry,
    cells: CellClassMap,
}

impl StyleBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &StyleRegistry {
        &self.registry
    }

    pub fn cells(&self) -> &CellClassMap {
        &self.cells
    }

    pub fn class_of(&self, coord: CellCoord) -> Option<&StyleClassId> {
        self.cells.get(coord)
    }

    /// Apply one attribute to every cell of `ranges`.
    ///
    /// Cells without a class get a freshly minted one starting from an empty
    /// record. Cells that already have a class keep it, and the record under
    /// that class is updated for every coordinate sharing it. Returns the
    /// distinct classes touched, in first-touched order.
    pub fn apply_to_ranges(
        &mut self,
        ranges: &[CellRange],
        attribute: &StyleAttribute,
    ) -> Vec<StyleClassId> {
        let mut touched = Vec::new();
        let mut seen = BTreeSet::new();

        for range in ranges {
            for coord in range.iter() {
                let id = match self.cells.get(coord) {
                    Some(id) => id.clone(),
                    None => {
                        let id = StyleClassId::mint();
                        self.registry.insert(id.clone(), StyleRecord::new());
                        self.cells.assign(coord, id.clone());
                        id
                    }
                };

                self.registry.update(&id, attribute);
                if seen.insert(id.clone()) {
                    touched.push(id);
                }
            }
        }

        touched
    }

    /// Share one fresh class between every cell of `range`
    pub fn assign_range(&mut self, range: CellRange, record: StyleRecord) -> StyleClassId {
        let id = StyleClassId::mint();
        self.registry.insert(id.clone(), record);
        for coord in range.iter() {
            self.cells.assign(coord, id.clone());
        }
        id
    }

    /// Point a cell at a class that is already registered
    pub fn adopt(&mut self, coord: CellCoord, id: StyleClassId) -> bool {
        if self.registry.get(&id).is_none() {
            return false;
        }
        self.cells.assign(coord, id);
        true
    }

    pub fn resolve(&self, coord: CellCoord) -> Option<&StyleRecord> {
        self.cells.get(coord).and_then(|id| self.registry.get(id))
    }

    /// Drop classes that no coordinate references anymore. Returns how many
    /// were removed.
    pub fn prune(&mut self) -> usize {
        let live: BTreeSet<&StyleClassId> = self.cells.iter().map(|(_, id)| id).collect();
        let orphaned: Vec<StyleClassId> = self
            .registry
            .iter()
            .map(|(id, _)| id)
            .filter(|id| !live.contains(id))
            .cloned()
            .collect();

        for id in &orphaned {
            self.registry.remove(id);
        }
        orphaned.len()
    }

    pub fn clear(&mut self) {
        self.registry.clear();
        self.cells.clear();
    }
}

impl StyleLookup for StyleBook {
    fn style_at(&self, coord: CellCoord) -> Option<&StyleRecord> {
        self.resolve(coord)
    }
}
