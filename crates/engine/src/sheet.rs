use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::cell::CellValue;

/// Minimal rectangle containing every populated cell. All bounds are
/// 0-based and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_row: u32,
    pub max_row: u32,
    pub min_col: u32,
    pub max_col: u32,
}

impl Bounds {
    pub fn single(row: u32, col: u32) -> Self {
        Self { min_row: row, max_row: row, min_col: col, max_col: col }
    }

    /// Grow to include (row, col).
    pub fn include(&mut self, row: u32, col: u32) {
        self.min_row = self.min_row.min(row);
        self.max_row = self.max_row.max(row);
        self.min_col = self.min_col.min(col);
        self.max_col = self.max_col.max(col);
    }

    pub fn rows(&self) -> std::ops::RangeInclusive<u32> {
        self.min_row..=self.max_row
    }
}

/// A named, sparse grid of cells.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub name: String,
    cells: HashMap<(u32, u32), CellValue>,
    bounds: Option<Bounds>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), cells: HashMap::new(), bounds: None }
    }

    /// Store a value at 0-based (row, col), replacing any previous value.
    pub fn set_value(&mut self, row: u32, col: u32, value: impl Into<CellValue>) {
        self.cells.insert((row, col), value.into());
        match self.bounds.as_mut() {
            Some(bounds) => bounds.include(row, col),
            None => self.bounds = Some(Bounds::single(row, col)),
        }
    }

    pub fn get(&self, row: u32, col: u32) -> Option<&CellValue> {
        self.cells.get(&(row, col))
    }

    /// Bounding range, `None` for a sheet without populated cells.
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Number of selectable columns: the last populated column (0-based)
    /// plus one. Leading empty columns still count, so letters line up.
    pub fn column_count(&self) -> u32 {
        self.bounds.map(|b| b.max_col + 1).unwrap_or(0)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Values of one 0-based column, top to bottom across the bounding row
    /// range. Rows without a value are skipped.
    pub fn column_values(&self, col: u32) -> impl Iterator<Item = (u32, &CellValue)> + '_ {
        self.bounds
            .map(|b| b.rows())
            .into_iter()
            .flatten()
            .filter_map(move |row| self.cells.get(&(row, col)).map(|v| (row, v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sheet_has_no_bounds() {
        let sheet = Sheet::new("Empty");
        assert_eq!(sheet.bounds(), None);
        assert_eq!(sheet.column_count(), 0);
        assert_eq!(sheet.column_values(0).count(), 0);
        assert!(sheet.is_empty());
    }

    #[test]
    fn test_bounds_grow_with_values() {
        let mut sheet = Sheet::new("Data");
        sheet.set_value(4, 2, "first");
        assert_eq!(sheet.bounds(), Some(Bounds::single(4, 2)));

        sheet.set_value(10, 1, 3.0);
        sheet.set_value(6, 5, true);
        let b = sheet.bounds().unwrap();
        assert_eq!((b.min_row, b.max_row), (4, 10));
        assert_eq!((b.min_col, b.max_col), (1, 5));
    }

    #[test]
    fn test_column_count_counts_from_column_a() {
        // Data only in C: still three pickable columns (A, B, C)
        let mut sheet = Sheet::new("Offset");
        sheet.set_value(0, 2, "x");
        assert_eq!(sheet.column_count(), 3);
    }

    #[test]
    fn test_column_values_skips_gaps() {
        let mut sheet = Sheet::new("Gaps");
        sheet.set_value(0, 0, "a");
        sheet.set_value(2, 0, "c");
        sheet.set_value(1, 1, "other column");

        let values: Vec<(u32, String)> = sheet
            .column_values(0)
            .map(|(row, v)| (row, v.to_text()))
            .collect();
        assert_eq!(values, vec![(0, "a".to_string()), (2, "c".to_string())]);
    }

    #[test]
    fn test_column_values_out_of_range_is_empty() {
        let mut sheet = Sheet::new("Narrow");
        sheet.set_value(0, 0, "a");
        assert_eq!(sheet.column_values(40).count(), 0);
    }

    #[test]
    fn test_set_value_overwrites() {
        let mut sheet = Sheet::new("S");
        sheet.set_value(0, 0, "old");
        sheet.set_value(0, 0, "new");
        assert_eq!(sheet.get(0, 0), Some(&CellValue::from("new")));
        assert_eq!(sheet.cell_count(), 1);
    }
}
