// File I/O operations: workbook loading and result export

pub mod csv;
pub mod error;
pub mod json;
pub mod xlsx;

use std::io::Write;

use colcompare_engine::compare::ComparisonResult;

pub use error::{ExportError, LoadError};
pub use xlsx::{load_bytes, load_path, LoadReport, SheetStats};

/// Machine-readable result formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Tsv,
    Json,
    Xlsx,
}

impl ExportFormat {
    /// Guess from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "tsv" | "tab" => Some(Self::Tsv),
            "json" => Some(Self::Json),
            "xlsx" => Some(Self::Xlsx),
            _ => None,
        }
    }

    /// Binary formats can't go to a terminal.
    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Xlsx)
    }
}

/// Write `result` to `writer` in the given format.
pub fn export_result<W: Write>(
    result: &ComparisonResult,
    format: ExportFormat,
    mut writer: W,
) -> Result<(), ExportError> {
    match format {
        ExportFormat::Csv => csv::export(result, writer),
        ExportFormat::Tsv => csv::export_tsv(result, writer),
        ExportFormat::Json => json::export(result, writer),
        ExportFormat::Xlsx => {
            let bytes = xlsx::export_result(result)?;
            writer.write_all(&bytes).map_err(|e| ExportError::Io(e.to_string()))?;
            writer.flush().map_err(|e| ExportError::Io(e.to_string()))
        }
    }
}
