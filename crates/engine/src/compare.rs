// Column comparison
// Pure functions: a workbook and two column selections in, the values
// unique to each side out. No IO, no formatting.

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::column::letters_to_index;
use crate::sheet::Sheet;
use crate::workbook::Workbook;

// ---------------------------------------------------------------------------
// Selections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    First,
    Second,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::First => "first",
            Side::Second => "second",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (sheet, column letters) pair picked for one side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSelection {
    pub sheet: String,
    pub column: String,
}

impl ColumnSelection {
    pub fn new(sheet: impl Into<String>, column: impl Into<String>) -> Self {
        Self { sheet: sheet.into(), column: column.into() }
    }

    /// 1-based column index, `None` if the letters don't decode.
    pub fn column_index(&self) -> Option<u32> {
        letters_to_index(&self.column)
    }
}

impl fmt::Display for ColumnSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - Column {}", self.sheet, self.column)
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Deduplicated, trimmed string values of one column in first-seen order.
pub type ValueSet = IndexSet<String>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub first: ColumnSelection,
    pub second: ColumnSelection,
    /// In the first column's value set, absent from the second
    pub only_in_first: Vec<String>,
    /// In the second column's value set, absent from the first
    pub only_in_second: Vec<String>,
    /// Size of the first column's value set
    pub first_count: usize,
    /// Size of the second column's value set
    pub second_count: usize,
}

impl ComparisonResult {
    pub fn is_identical(&self) -> bool {
        self.only_in_first.is_empty() && self.only_in_second.is_empty()
    }

    pub fn only_in(&self, side: Side) -> &[String] {
        match side {
            Side::First => &self.only_in_first,
            Side::Second => &self.only_in_second,
        }
    }

    pub fn selection(&self, side: Side) -> &ColumnSelection {
        match side {
            Side::First => &self.first,
            Side::Second => &self.second,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompareError {
    /// The selected sheet is not in the workbook.
    SheetNotFound { side: Side, sheet: String },
    /// The selected column letters don't decode to a column.
    InvalidColumn { side: Side, column: String },
}

impl fmt::Display for CompareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SheetNotFound { side, sheet } => {
                write!(f, "could not find {side} worksheet '{sheet}'")
            }
            Self::InvalidColumn { side, column } => {
                write!(f, "{side} column {column:?} is not a valid column letter")
            }
        }
    }
}

impl std::error::Error for CompareError {}

// ---------------------------------------------------------------------------
// Value sets
// ---------------------------------------------------------------------------

/// Read one 0-based column across the sheet's bounding row range.
///
/// Each populated cell contributes its string form with surrounding
/// whitespace trimmed. A column past the sheet's last populated column
/// simply yields an empty set.
pub fn column_values(sheet: &Sheet, col: u32) -> ValueSet {
    sheet
        .column_values(col)
        .map(|(_, value)| value.to_text().trim().to_string())
        .collect()
}

fn resolve<'a>(
    workbook: &'a Workbook,
    selection: &ColumnSelection,
    side: Side,
) -> Result<(&'a Sheet, u32), CompareError> {
    let sheet = workbook
        .sheet_by_name(&selection.sheet)
        .ok_or_else(|| CompareError::SheetNotFound { side, sheet: selection.sheet.clone() })?;
    let col = selection
        .column_index()
        .map(|index| index - 1)
        .ok_or_else(|| CompareError::InvalidColumn { side, column: selection.column.clone() })?;
    Ok((sheet, col))
}

/// Elements of `a` missing from `b`, in `a`'s order.
pub fn difference(a: &ValueSet, b: &ValueSet) -> Vec<String> {
    a.iter().filter(|v| !b.contains(*v)).cloned().collect()
}

// ---------------------------------------------------------------------------
// Core comparison
// ---------------------------------------------------------------------------

pub fn compare_columns(
    workbook: &Workbook,
    first: &ColumnSelection,
    second: &ColumnSelection,
) -> Result<ComparisonResult, CompareError> {
    // 1. Resolve both sides before reading anything
    let (sheet1, col1) = resolve(workbook, first, Side::First)?;
    let (sheet2, col2) = resolve(workbook, second, Side::Second)?;

    if col1 >= sheet1.column_count() {
        log::debug!("first column {} is past the last column of '{}'", first.column, sheet1.name);
    }
    if col2 >= sheet2.column_count() {
        log::debug!("second column {} is past the last column of '{}'", second.column, sheet2.name);
    }

    // 2. Build value sets
    let values1 = column_values(sheet1, col1);
    let values2 = column_values(sheet2, col2);
    log::info!(
        "found {} values in first column and {} values in second column",
        values1.len(),
        values2.len()
    );

    // 3. One-sided differences
    let only_in_first = difference(&values1, &values2);
    let only_in_second = difference(&values2, &values1);

    Ok(ComparisonResult {
        first: first.clone(),
        second: second.clone(),
        only_in_first,
        only_in_second,
        first_count: values1.len(),
        second_count: values2.len(),
    })
}
