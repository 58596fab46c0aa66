// Excel workbook import (xlsx, xlsm, xls, xlsb, ods) and result export (xlsx only)
//
// Import: decoding is delegated to calamine. Every non-empty cell becomes a
//         CellValue in the engine's sparse sheet; formatting and formulas
//         are ignored, only cached values matter for comparison.
// Export: one worksheet holding the two difference lists side by side.

use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::time::Instant;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};

use colcompare_engine::cell::CellValue;
use colcompare_engine::column::cell_address;
use colcompare_engine::compare::ComparisonResult;
use colcompare_engine::sheet::Sheet;
use colcompare_engine::workbook::Workbook;

use crate::{ExportError, LoadError};

/// Maximum number of cells to import (prevents DoS from huge files)
pub const MAX_CELLS: usize = 5_000_000;

/// Last serial day Excel can represent (9999-12-31)
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// Per-sheet import statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SheetStats {
    pub name: String,
    /// Pickable columns (last populated column + 1)
    pub columns: u32,
    pub cells_imported: usize,
    pub dates_imported: usize,
}

/// Result of a workbook load
#[derive(Debug, Default, Clone)]
pub struct LoadReport {
    /// Per-sheet statistics, in workbook order
    pub sheet_stats: Vec<SheetStats>,
    /// Total cells imported
    pub cells_imported: usize,
    /// Total load duration in milliseconds
    pub load_duration_ms: u128,
}

impl LoadReport {
    pub fn sheets_imported(&self) -> usize {
        self.sheet_stats.len()
    }

    /// Column count for a sheet by name.
    pub fn column_count(&self, sheet: &str) -> Option<u32> {
        self.sheet_stats.iter().find(|s| s.name == sheet).map(|s| s.columns)
    }
}

/// Load a workbook from a file on disk.
pub fn load_path(path: &Path) -> Result<(Workbook, LoadReport), LoadError> {
    let bytes = fs::read(path).map_err(|e| LoadError::Io(format!("{}: {}", path.display(), e)))?;
    load_bytes(bytes)
}

/// Load a workbook from raw file bytes. The container format is detected
/// from the content; nothing is installed unless every sheet decodes.
pub fn load_bytes(bytes: Vec<u8>) -> Result<(Workbook, LoadReport), LoadError> {
    let start_time = Instant::now();
    let byte_len = bytes.len();

    let mut source = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| LoadError::Decode(e.to_string()))?;

    let sheet_names: Vec<String> = source.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(LoadError::NoSheets);
    }

    let mut workbook = Workbook::new();
    let mut report = LoadReport::default();

    for sheet_name in &sheet_names {
        let range = source.worksheet_range(sheet_name).map_err(|e| LoadError::Sheet {
            sheet: sheet_name.clone(),
            message: e.to_string(),
        })?;

        let mut sheet = Sheet::new(sheet_name.as_str());
        let mut stats = SheetStats { name: sheet_name.clone(), ..Default::default() };

        // Range start offset (data may not begin at A1)
        let (data_start_row, data_start_col) = range.start().unwrap_or((0, 0));

        for (row_idx, row) in range.rows().enumerate() {
            let target_row = data_start_row + row_idx as u32;
            for (col_idx, cell) in row.iter().enumerate() {
                let target_col = data_start_col + col_idx as u32;
                let Some(value) = convert_cell(cell) else {
                    continue;
                };

                if report.cells_imported >= MAX_CELLS {
                    return Err(LoadError::TooLarge { limit: MAX_CELLS });
                }
                if matches!(value, CellValue::DateTime(_)) {
                    stats.dates_imported += 1;
                }
                sheet.set_value(target_row, target_col, value);
                stats.cells_imported += 1;
                report.cells_imported += 1;
            }
        }

        stats.columns = sheet.column_count();
        log::debug!(
            "sheet '{}': {} cells, {} columns, data from {}",
            sheet_name,
            stats.cells_imported,
            stats.columns,
            cell_address(data_start_row, data_start_col)
        );
        report.sheet_stats.push(stats);
        workbook.push_sheet(sheet);
    }

    report.load_duration_ms = start_time.elapsed().as_millis();
    log::info!(
        "loaded {} bytes: {} sheets, {} cells in {} ms",
        byte_len,
        report.sheets_imported(),
        report.cells_imported,
        report.load_duration_ms
    );
    Ok((workbook, report))
}

/// Map a calamine cell to an engine value. `None` for empty cells.
fn convert_cell(cell: &Data) -> Option<CellValue> {
    let value = match cell {
        Data::Empty => return None,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Int(*n),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => CellValue::Error(e.to_string()),
        // Elapsed-time cells ([h]:mm) are day counts, not points in time
        Data::DateTime(dt) if dt.is_duration() => CellValue::Number(dt.as_f64()),
        Data::DateTime(dt) => {
            // Assumes the 1900 date system (calamine doesn't expose the 1904 flag)
            let serial = dt.as_f64();
            match serial_to_datetime(serial) {
                Some(parsed) => CellValue::DateTime(parsed),
                None => CellValue::Number(serial),
            }
        }
        Data::DateTimeIso(s) => {
            let parsed = s
                .parse::<NaiveDateTime>()
                .ok()
                .or_else(|| s.parse::<NaiveDate>().ok()?.and_hms_opt(0, 0, 0));
            match parsed {
                Some(dt) => CellValue::DateTime(dt),
                None => CellValue::Text(s.clone()),
            }
        }
        Data::DurationIso(s) => CellValue::Duration(s.clone()),
    };
    Some(value)
}

/// Convert an Excel serial date (1900 system) to a timestamp, rounded to
/// the nearest second. The epoch is 1899-12-30, which absorbs Excel's
/// phantom 1900-02-29: serials from 61 (1900-03-01) on match Excel, earlier
/// ones land one day early.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(0.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;

    let mut days = serial.floor() as i64;
    let mut secs = ((serial - serial.floor()) * 86_400.0).round() as i64;
    if secs >= 86_400 {
        days += 1;
        secs -= 86_400;
    }
    epoch.checked_add_signed(Duration::days(days) + Duration::seconds(secs))
}

/// Render a comparison result as an .xlsx file in memory.
///
/// Column A lists values only in the first column, column B values only in
/// the second; row 1 holds the headers.
pub fn export_result(result: &ComparisonResult) -> Result<Vec<u8>, ExportError> {
    let mut workbook = XlsxWorkbook::new();
    let header = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name("Comparison")
        .map_err(|e| ExportError::Xlsx(e.to_string()))?;

    let headers = [
        format!("Only in {}", result.first),
        format!("Only in {}", result.second),
    ];
    let lists = [&result.only_in_first, &result.only_in_second];

    for (col, (title, values)) in headers.iter().zip(lists).enumerate() {
        let col = col as u16;
        worksheet
            .write_string_with_format(0, col, title, &header)
            .map_err(|e| ExportError::Xlsx(e.to_string()))?;
        for (i, value) in values.iter().enumerate() {
            worksheet
                .write_string((i + 1) as u32, col, value)
                .map_err(|e| ExportError::Xlsx(e.to_string()))?;
        }
        worksheet
            .set_column_width(col, 32)
            .map_err(|e| ExportError::Xlsx(e.to_string()))?;
    }

    workbook.save_to_buffer().map_err(|e| ExportError::Xlsx(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use colcompare_engine::compare::{compare_columns, ColumnSelection};
    use rust_xlsxwriter::ExcelDateTime;

    /// Two-sheet fixture: Sheet1!A = " x ", "y", "x"; Sheet2!A = "x", "z"
    fn fixture_bytes() -> Vec<u8> {
        let mut wb = XlsxWorkbook::new();

        let s1 = wb.add_worksheet();
        s1.set_name("Sheet1").unwrap();
        s1.write_string(0, 0, " x ").unwrap();
        s1.write_string(1, 0, "y").unwrap();
        s1.write_string(2, 0, "x").unwrap();
        s1.write_number(0, 2, 12.0).unwrap();

        let s2 = wb.add_worksheet();
        s2.set_name("Sheet2").unwrap();
        s2.write_string(0, 0, "x").unwrap();
        s2.write_string(1, 0, "z").unwrap();

        wb.save_to_buffer().unwrap()
    }

    #[test]
    fn test_load_sheet_names_and_columns() {
        let (wb, report) = load_bytes(fixture_bytes()).unwrap();
        assert_eq!(wb.sheet_names(), vec!["Sheet1", "Sheet2"]);
        assert_eq!(report.sheets_imported(), 2);
        assert_eq!(report.column_count("Sheet1"), Some(3));
        assert_eq!(report.column_count("Sheet2"), Some(1));
        assert_eq!(report.cells_imported, 6);
    }

    #[test]
    fn test_load_then_compare() {
        let (wb, _) = load_bytes(fixture_bytes()).unwrap();
        let result = compare_columns(
            &wb,
            &ColumnSelection::new("Sheet1", "A"),
            &ColumnSelection::new("Sheet2", "A"),
        )
        .unwrap();
        assert_eq!(result.only_in_first, vec!["y"]);
        assert_eq!(result.only_in_second, vec!["z"]);
    }

    #[test]
    fn test_load_preserves_offset_origin() {
        let mut xlsx = XlsxWorkbook::new();
        let ws = xlsx.add_worksheet();
        ws.write_string(4, 2, "C5").unwrap();
        ws.write_string(6, 3, "D7").unwrap();
        let bytes = xlsx.save_to_buffer().unwrap();

        let (wb, report) = load_bytes(bytes).unwrap();
        let sheet = &wb.sheets()[0];
        assert_eq!(sheet.get(4, 2), Some(&CellValue::from("C5")));
        assert_eq!(sheet.get(6, 3), Some(&CellValue::from("D7")));
        let bounds = sheet.bounds().unwrap();
        assert_eq!((bounds.min_row, bounds.min_col), (4, 2));
        assert_eq!(report.sheet_stats[0].columns, 4);
    }

    #[test]
    fn test_load_value_types() {
        let mut xlsx = XlsxWorkbook::new();
        let ws = xlsx.add_worksheet();
        ws.write_number(0, 0, 42.0).unwrap();
        ws.write_number(1, 0, 2.5).unwrap();
        ws.write_boolean(2, 0, true).unwrap();
        let date = ExcelDateTime::from_ymd(2024, 3, 9).unwrap();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        ws.write_datetime_with_format(3, 0, &date, &date_format).unwrap();
        let bytes = xlsx.save_to_buffer().unwrap();

        let (wb, report) = load_bytes(bytes).unwrap();
        let sheet = &wb.sheets()[0];
        let texts: Vec<String> = sheet.column_values(0).map(|(_, v)| v.to_text()).collect();
        assert_eq!(texts, vec!["42", "2.5", "true", "2024-03-09"]);
        assert_eq!(report.sheet_stats[0].dates_imported, 1);
    }

    #[test]
    fn test_elapsed_time_cells_load_as_numbers() {
        let mut xlsx = XlsxWorkbook::new();
        let ws = xlsx.add_worksheet();
        let elapsed = Format::new().set_num_format("[h]:mm");
        ws.write_number_with_format(0, 0, 1.5, &elapsed).unwrap();
        let bytes = xlsx.save_to_buffer().unwrap();

        let (wb, report) = load_bytes(bytes).unwrap();
        let sheet = &wb.sheets()[0];
        assert_eq!(sheet.get(0, 0), Some(&CellValue::Number(1.5)));
        assert_eq!(report.sheet_stats[0].dates_imported, 0);
    }

    #[test]
    fn test_bool_cell_matches_text_true() {
        let mut xlsx = XlsxWorkbook::new();
        let left = xlsx.add_worksheet();
        left.set_name("L").unwrap();
        left.write_boolean(0, 0, true).unwrap();
        let right = xlsx.add_worksheet();
        right.set_name("R").unwrap();
        right.write_string(0, 0, "true").unwrap();
        let bytes = xlsx.save_to_buffer().unwrap();

        let (wb, _) = load_bytes(bytes).unwrap();
        let result = compare_columns(
            &wb,
            &ColumnSelection::new("L", "A"),
            &ColumnSelection::new("R", "A"),
        )
        .unwrap();
        assert!(result.is_identical(), "{result:?}");
    }

    #[test]
    fn test_empty_sheet_has_zero_columns() {
        let mut xlsx = XlsxWorkbook::new();
        xlsx.add_worksheet().set_name("Blank").unwrap();
        xlsx.add_worksheet().set_name("Data").unwrap().write_string(0, 1, "v").unwrap();
        let bytes = xlsx.save_to_buffer().unwrap();

        let (wb, report) = load_bytes(bytes).unwrap();
        assert_eq!(wb.sheet_names(), vec!["Blank", "Data"]);
        assert_eq!(report.column_count("Blank"), Some(0));
        assert_eq!(report.column_count("Data"), Some(2));
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let err = load_bytes(b"definitely not a spreadsheet".to_vec()).unwrap_err();
        assert!(matches!(err, LoadError::Decode(_)), "got {err:?}");
    }

    #[test]
    fn test_load_path_missing_file() {
        let err = load_path(Path::new("/nonexistent/book.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
        assert!(err.to_string().contains("book.xlsx"));
    }

    #[test]
    fn test_load_path_roundtrip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        fs::write(&path, fixture_bytes()).unwrap();

        let (wb, _) = load_path(&path).unwrap();
        assert_eq!(wb.sheet_count(), 2);
    }

    #[test]
    fn test_serial_to_datetime() {
        let d = serial_to_datetime(45360.0).unwrap();
        assert_eq!(d.format("%Y-%m-%d").to_string(), "2024-03-09");

        let noon = serial_to_datetime(45360.5).unwrap();
        assert_eq!(noon.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-03-09 12:00:00");

        assert_eq!(
            serial_to_datetime(1.0).unwrap().format("%Y-%m-%d").to_string(),
            "1899-12-31"
        );
        assert!(serial_to_datetime(-1.0).is_none());
        assert!(serial_to_datetime(f64::NAN).is_none());
        assert!(serial_to_datetime(3_000_000.0).is_none());
    }

    #[test]
    fn test_serial_rounds_to_next_day() {
        // 23:59:59.9 rounds up to midnight of the following day
        let serial = 45360.0 + 86_399.9 / 86_400.0;
        let dt = serial_to_datetime(serial).unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-03-10 00:00:00");
    }

    #[test]
    fn test_export_result_is_readable_xlsx() {
        let (wb, _) = load_bytes(fixture_bytes()).unwrap();
        let result = compare_columns(
            &wb,
            &ColumnSelection::new("Sheet1", "A"),
            &ColumnSelection::new("Sheet2", "A"),
        )
        .unwrap();

        let bytes = export_result(&result).unwrap();
        let (exported, _) = load_bytes(bytes).unwrap();
        let sheet = exported.sheet_by_name("Comparison").unwrap();
        assert_eq!(sheet.get(0, 0), Some(&CellValue::from("Only in Sheet1 - Column A")));
        assert_eq!(sheet.get(0, 1), Some(&CellValue::from("Only in Sheet2 - Column A")));
        assert_eq!(sheet.get(1, 0), Some(&CellValue::from("y")));
        assert_eq!(sheet.get(1, 1), Some(&CellValue::from("z")));
    }

    #[test]
    fn test_session_keeps_workbook_when_next_load_fails() {
        use colcompare_engine::{LoadOutcome, Session, Side};

        let mut session = Session::new();
        let outcome = session.load(load_bytes(fixture_bytes()).map(|(wb, _)| wb));
        assert_eq!(outcome, LoadOutcome::Installed { sheets: 2 });
        assert_eq!(session.status(), "File loaded successfully. Sheets found: Sheet1, Sheet2");

        let outcome = session.load(load_bytes(b"garbage".to_vec()).map(|(wb, _)| wb));
        assert_eq!(outcome, LoadOutcome::Failed);
        assert!(session.status().starts_with("Error loading file: "));
        assert_eq!(session.sheet_options(), vec!["Sheet1", "Sheet2"]);

        session.select_sheet(Side::First, "Sheet1");
        assert_eq!(session.column_options(Side::First), vec!["A", "B", "C"]);
    }
}
