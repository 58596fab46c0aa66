//! Comparison session: the load → select → compare flow.
//!
//! A `Session` owns the current workbook, the four picker selections, the
//! latest result and a one-line status. Callers drive it in order; nothing
//! here is global.
//!
//! Loads are two-phase. `begin_load` hands out a ticket and `finish_load`
//! installs the decoded workbook only if that ticket is still the newest.
//! A slow load that completes after a newer one started is dropped instead
//! of overwriting the newer workbook.

use std::fmt;

use crate::column::column_options;
use crate::compare::{compare_columns, ColumnSelection, CompareError, ComparisonResult, Side};
use crate::workbook::Workbook;

/// Proof that a load was started; pass it back to `finish_load`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn version(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Workbook installed; selections and results were reset.
    Installed { sheets: usize },
    /// Decoding failed; the previous state is untouched.
    Failed,
    /// A newer load was started after this one; result discarded.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    NoWorkbook,
    /// One or more of the four selections is missing.
    IncompleteSelection,
    Compare(CompareError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoWorkbook => write!(f, "no workbook loaded"),
            Self::IncompleteSelection => write!(f, "both sheets and both columns must be selected"),
            Self::Compare(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<CompareError> for SessionError {
    fn from(e: CompareError) -> Self {
        SessionError::Compare(e)
    }
}

#[derive(Debug, Clone, Default)]
struct Picker {
    sheet: Option<String>,
    column: Option<String>,
}

#[derive(Debug, Default)]
pub struct Session {
    workbook: Option<Workbook>,
    /// Version of the most recently started load
    load_version: u64,
    first: Picker,
    second: Picker,
    result: Option<ComparisonResult>,
    status: String,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    // ---------------------------------------------------------------------
    // Loading
    // ---------------------------------------------------------------------

    pub fn begin_load(&mut self) -> LoadTicket {
        self.load_version += 1;
        log::debug!("load {} started", self.load_version);
        LoadTicket(self.load_version)
    }

    /// Complete a load started with `begin_load`.
    pub fn finish_load<E: fmt::Display>(
        &mut self,
        ticket: LoadTicket,
        loaded: Result<Workbook, E>,
    ) -> LoadOutcome {
        if ticket.0 != self.load_version {
            log::info!(
                "discarding load {} (load {} is newer)",
                ticket.0,
                self.load_version
            );
            return LoadOutcome::Stale;
        }

        match loaded {
            Ok(workbook) => {
                let sheets = workbook.sheet_count();
                log::info!("load {}: {} sheets, {} cells", ticket.0, sheets, workbook.total_cells());
                self.status = format!(
                    "File loaded successfully. Sheets found: {}",
                    workbook.sheet_names().join(", ")
                );
                self.workbook = Some(workbook);
                self.first = Picker::default();
                self.second = Picker::default();
                self.result = None;
                LoadOutcome::Installed { sheets }
            }
            Err(e) => {
                log::info!("load {} failed: {}", ticket.0, e);
                self.status = format!("Error loading file: {}", e);
                LoadOutcome::Failed
            }
        }
    }

    /// `begin_load` + `finish_load` for callers that decode synchronously.
    pub fn load<E: fmt::Display>(&mut self, loaded: Result<Workbook, E>) -> LoadOutcome {
        let ticket = self.begin_load();
        self.finish_load(ticket, loaded)
    }

    pub fn workbook(&self) -> Option<&Workbook> {
        self.workbook.as_ref()
    }

    // ---------------------------------------------------------------------
    // Pickers
    // ---------------------------------------------------------------------

    fn picker(&self, side: Side) -> &Picker {
        match side {
            Side::First => &self.first,
            Side::Second => &self.second,
        }
    }

    fn picker_mut(&mut self, side: Side) -> &mut Picker {
        match side {
            Side::First => &mut self.first,
            Side::Second => &mut self.second,
        }
    }

    /// Sheet names in workbook order; empty before the first load.
    pub fn sheet_options(&self) -> Vec<String> {
        self.workbook
            .as_ref()
            .map(|wb| wb.sheet_names().into_iter().map(String::from).collect())
            .unwrap_or_default()
    }

    /// Column letters for the sheet currently picked on `side`.
    pub fn column_options(&self, side: Side) -> Vec<String> {
        let count = self
            .picker(side)
            .sheet
            .as_deref()
            .and_then(|name| self.workbook.as_ref()?.sheet_by_name(name))
            .map(|sheet| sheet.column_count())
            .unwrap_or(0);
        column_options(count)
    }

    /// Pick a sheet. The name isn't checked here; an unknown sheet surfaces
    /// as a comparison error.
    pub fn select_sheet(&mut self, side: Side, name: impl Into<String>) {
        let name = name.into();
        let known = self
            .workbook
            .as_ref()
            .is_some_and(|wb| wb.sheet_by_name(&name).is_some());
        if !known {
            log::debug!("{} sheet '{}' is not in the loaded workbook", side, name);
        }
        self.picker_mut(side).sheet = Some(name);
    }

    pub fn select_column(&mut self, side: Side, letters: impl Into<String>) {
        self.picker_mut(side).column = Some(letters.into());
    }

    pub fn clear_selection(&mut self, side: Side) {
        *self.picker_mut(side) = Picker::default();
    }

    /// The complete selection for `side`, if both sheet and column are set.
    pub fn selection(&self, side: Side) -> Option<ColumnSelection> {
        let picker = self.picker(side);
        match (&picker.sheet, &picker.column) {
            (Some(sheet), Some(column)) if !sheet.is_empty() && !column.is_empty() => {
                Some(ColumnSelection::new(sheet.clone(), column.clone()))
            }
            _ => None,
        }
    }

    /// True once a workbook is loaded and all four selections are made.
    pub fn can_compare(&self) -> bool {
        self.workbook.is_some()
            && self.selection(Side::First).is_some()
            && self.selection(Side::Second).is_some()
    }

    // ---------------------------------------------------------------------
    // Comparing
    // ---------------------------------------------------------------------

    /// Compare the two selected columns.
    ///
    /// On success the result replaces the previous one. On any error the
    /// previous result is kept and only the status line changes.
    pub fn compare(&mut self) -> Result<&ComparisonResult, SessionError> {
        let Some(workbook) = self.workbook.as_ref() else {
            self.status = "No workbook found. Please upload a file first.".to_string();
            return Err(SessionError::NoWorkbook);
        };

        let (Some(first), Some(second)) = (self.selection(Side::First), self.selection(Side::Second))
        else {
            self.status = "Select a sheet and a column on both sides before comparing.".to_string();
            return Err(SessionError::IncompleteSelection);
        };

        match compare_columns(workbook, &first, &second) {
            Ok(result) => {
                self.status = format!(
                    "Comparison complete. Found {} unique to first column and {} unique to second column",
                    result.only_in_first.len(),
                    result.only_in_second.len()
                );
                Ok(self.result.insert(result))
            }
            Err(e) => {
                self.status = format!("Error during comparison: {}", e);
                Err(e.into())
            }
        }
    }

    pub fn result(&self) -> Option<&ComparisonResult> {
        self.result.as_ref()
    }

    /// The latest load or comparison outcome, for display.
    pub fn status(&self) -> &str {
        &self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::Sheet;

    fn column_sheet(name: &str, values: &[&str]) -> Sheet {
        let mut sheet = Sheet::new(name);
        for (row, v) in values.iter().enumerate() {
            sheet.set_value(row as u32, 0, *v);
        }
        sheet
    }

    fn sample_workbook() -> Workbook {
        vec![
            column_sheet("Sheet1", &[" x ", "y", "x"]),
            column_sheet("Sheet2", &["x", "z"]),
        ]
        .into_iter()
        .collect()
    }

    fn select_all(session: &mut Session, first: (&str, &str), second: (&str, &str)) {
        session.select_sheet(Side::First, first.0);
        session.select_column(Side::First, first.1);
        session.select_sheet(Side::Second, second.0);
        session.select_column(Side::Second, second.1);
    }

    #[test]
    fn test_full_flow() {
        let mut session = Session::new();
        assert!(session.sheet_options().is_empty());

        let outcome = session.load(Ok::<_, String>(sample_workbook()));
        assert_eq!(outcome, LoadOutcome::Installed { sheets: 2 });
        assert_eq!(session.status(), "File loaded successfully. Sheets found: Sheet1, Sheet2");
        assert_eq!(session.sheet_options(), vec!["Sheet1", "Sheet2"]);

        assert!(!session.can_compare());
        session.select_sheet(Side::First, "Sheet1");
        assert_eq!(session.column_options(Side::First), vec!["A"]);
        assert!(session.column_options(Side::Second).is_empty());
        session.select_column(Side::First, "A");
        session.select_sheet(Side::Second, "Sheet2");
        assert!(!session.can_compare());
        session.select_column(Side::Second, "A");
        assert!(session.can_compare());

        let result = session.compare().unwrap();
        assert_eq!(result.only_in_first, vec!["y"]);
        assert_eq!(result.only_in_second, vec!["z"]);
        assert_eq!(
            session.status(),
            "Comparison complete. Found 1 unique to first column and 1 unique to second column"
        );
    }

    #[test]
    fn test_compare_without_workbook() {
        let mut session = Session::new();
        assert_eq!(session.compare().unwrap_err(), SessionError::NoWorkbook);
        assert_eq!(session.status(), "No workbook found. Please upload a file first.");
    }

    #[test]
    fn test_compare_with_incomplete_selection() {
        let mut session = Session::new();
        session.load(Ok::<_, String>(sample_workbook()));
        session.select_sheet(Side::First, "Sheet1");
        session.select_column(Side::First, "A");
        assert_eq!(session.compare().unwrap_err(), SessionError::IncompleteSelection);
        assert!(session.result().is_none());
    }

    #[test]
    fn test_missing_sheet_keeps_previous_result() {
        let mut session = Session::new();
        session.load(Ok::<_, String>(sample_workbook()));
        select_all(&mut session, ("Sheet1", "A"), ("Sheet2", "A"));
        let before = session.compare().unwrap().clone();

        session.select_sheet(Side::Second, "Sheet9");
        let err = session.compare().unwrap_err();
        assert_eq!(
            err,
            SessionError::Compare(CompareError::SheetNotFound {
                side: Side::Second,
                sheet: "Sheet9".into()
            })
        );
        assert!(session.status().starts_with("Error during comparison:"));
        assert!(session.status().contains("Sheet9"));
        assert_eq!(session.result(), Some(&before));
    }

    #[test]
    fn test_reload_resets_selections_and_results() {
        let mut session = Session::new();
        session.load(Ok::<_, String>(sample_workbook()));
        select_all(&mut session, ("Sheet1", "A"), ("Sheet2", "A"));
        session.compare().unwrap();
        assert!(session.result().is_some());

        let replacement: Workbook = vec![column_sheet("Other", &["1"])].into_iter().collect();
        session.load(Ok::<_, String>(replacement));

        assert!(session.result().is_none());
        assert!(session.selection(Side::First).is_none());
        assert!(session.selection(Side::Second).is_none());
        assert!(!session.can_compare());
        assert_eq!(session.sheet_options(), vec!["Other"]);
    }

    #[test]
    fn test_failed_load_leaves_state_untouched() {
        let mut session = Session::new();
        session.load(Ok::<_, String>(sample_workbook()));
        select_all(&mut session, ("Sheet1", "A"), ("Sheet2", "A"));
        session.compare().unwrap();

        let outcome = session.load(Err::<Workbook, _>("unsupported file format"));
        assert_eq!(outcome, LoadOutcome::Failed);
        assert_eq!(session.status(), "Error loading file: unsupported file format");
        assert_eq!(session.sheet_options(), vec!["Sheet1", "Sheet2"]);
        assert!(session.can_compare());
        assert!(session.result().is_some());
    }

    #[test]
    fn test_stale_load_is_discarded() {
        let mut session = Session::new();
        let slow = session.begin_load();
        let fast = session.begin_load();
        assert!(fast.version() > slow.version());

        let newer: Workbook = vec![column_sheet("Newer", &["n"])].into_iter().collect();
        assert_eq!(session.finish_load(fast, Ok::<_, String>(newer)), LoadOutcome::Installed { sheets: 1 });

        let older: Workbook = vec![column_sheet("Older", &["o"])].into_iter().collect();
        assert_eq!(session.finish_load(slow, Ok::<_, String>(older)), LoadOutcome::Stale);
        assert_eq!(session.sheet_options(), vec!["Newer"]);
    }

    #[test]
    fn test_stale_failure_does_not_touch_status() {
        let mut session = Session::new();
        let slow = session.begin_load();
        session.load(Ok::<_, String>(sample_workbook()));
        let status = session.status().to_string();

        assert_eq!(session.finish_load(slow, Err::<Workbook, _>("boom")), LoadOutcome::Stale);
        assert_eq!(session.status(), status);
    }

    #[test]
    fn test_clear_selection() {
        let mut session = Session::new();
        session.load(Ok::<_, String>(sample_workbook()));
        select_all(&mut session, ("Sheet1", "A"), ("Sheet2", "A"));
        session.clear_selection(Side::First);
        assert!(session.selection(Side::First).is_none());
        assert!(session.selection(Side::Second).is_some());
    }
}
