use serde::Serialize;

use crate::sheet::Sheet;

/// An ordered collection of uniquely named sheets.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

/// Name and pickable column count of one sheet, in workbook order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetSummary {
    pub name: String,
    pub columns: u32,
    pub cells: usize,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sheet. A sheet with a name already present replaces the
    /// earlier one in place, so lookups by name stay unambiguous.
    pub fn push_sheet(&mut self, sheet: Sheet) {
        if let Some(existing) = self.sheets.iter_mut().find(|s| s.name == sheet.name) {
            log::warn!("duplicate sheet name '{}', keeping the later sheet", sheet.name);
            *existing = sheet;
        } else {
            self.sheets.push(sheet);
        }
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Exact-name lookup.
    pub fn sheet_by_name(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn summaries(&self) -> Vec<SheetSummary> {
        self.sheets
            .iter()
            .map(|s| SheetSummary {
                name: s.name.clone(),
                columns: s.column_count(),
                cells: s.cell_count(),
            })
            .collect()
    }

    pub fn total_cells(&self) -> usize {
        self.sheets.iter().map(|s| s.cell_count()).sum()
    }
}

impl FromIterator<Sheet> for Workbook {
    fn from_iter<I: IntoIterator<Item = Sheet>>(iter: I) -> Self {
        let mut wb = Workbook::new();
        for sheet in iter {
            wb.push_sheet(sheet);
        }
        wb
    }
}
