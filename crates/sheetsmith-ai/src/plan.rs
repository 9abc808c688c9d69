use serde_json::Value;

use sheetsmith_core::{CellCoord, CellUpdate};

use crate::client::CellMap;

/// Decoded cell map, ready to be written in one batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillPlan {
    pub updates: Vec<CellUpdate>,
    /// Keys that are not valid backend references or lie off the worksheet
    pub skipped: Vec<String>,
    /// Grid size needed to hold every update
    pub rows: usize,
    pub cols: usize,
}

impl FillPlan {
    pub fn from_cell_map(map: &CellMap) -> Self {
        let mut plan = FillPlan::default();

        for (key, value) in map {
            let Some(coord) = CellCoord::from_backend(key) else {
                tracing::warn!(key = %key, "Could not parse cell reference");
                plan.skipped.push(key.clone());
                continue;
            };
            if !coord.is_within_limits() {
                tracing::warn!(key = %key, "Cell reference outside the worksheet");
                plan.skipped.push(key.clone());
                continue;
            }

            plan.rows = plan.rows.max(coord.row as usize + 1);
            plan.cols = plan.cols.max(coord.col as usize + 1);
            plan.updates
                .push(CellUpdate::new(coord.row, coord.col, cell_text(value)));
        }

        plan
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> CellMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_decodes_backend_references() {
        let plan = FillPlan::from_cell_map(&map(json!({"c1r1": "Hello", "c2r1": "World"})));

        assert!(plan.skipped.is_empty());
        assert_eq!(plan.updates.len(), 2);
        assert!(plan.updates.contains(&CellUpdate::new(0, 0, "Hello")));
        assert!(plan.updates.contains(&CellUpdate::new(0, 1, "World")));
        assert_eq!((plan.rows, plan.cols), (1, 2));
    }

    #[test]
    fn test_bad_keys_are_skipped() {
        let plan = FillPlan::from_cell_map(&map(json!({
            "A1": "x",
            "c0r1": "x",
            "c3r40": "kept",
        })));

        assert_eq!(plan.updates, vec![CellUpdate::new(39, 2, "kept")]);
        assert_eq!(plan.skipped.len(), 2);
        assert_eq!((plan.rows, plan.cols), (40, 3));
    }

    #[test]
    fn test_keys_beyond_worksheet_are_skipped() {
        let plan = FillPlan::from_cell_map(&map(json!({
            "c1r4294967295": "x",
            "c16385r1": "x",
            "c16384r1048576": "corner",
        })));

        assert_eq!(plan.updates, vec![CellUpdate::new(1_048_575, 16_383, "corner")]);
        assert_eq!(plan.skipped.len(), 2);
        assert_eq!((plan.rows, plan.cols), (1_048_576, 16_384));
    }

    #[test]
    fn test_values_are_stringified() {
        let plan = FillPlan::from_cell_map(&map(json!({
            "c1r1": 42,
            "c1r2": true,
            "c1r3": null,
        })));

        let value_at = |row| {
            plan.updates
                .iter()
                .find(|u| u.row == row)
                .map(|u| u.value.as_str())
        };
        assert_eq!(value_at(0), Some("42"));
        assert_eq!(value_at(1), Some("true"));
        assert_eq!(value_at(2), Some(""));
    }

    #[test]
    fn test_empty_map() {
        let plan = FillPlan::from_cell_map(&CellMap::new());
        assert!(plan.is_empty());
        assert_eq!((plan.rows, plan.cols), (0, 0));
    }
}
