use std::fmt;

/// A workbook could not be loaded. Nothing partial is ever returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// Reading the file failed.
    Io(String),
    /// The bytes are not a spreadsheet format calamine understands.
    Decode(String),
    /// One sheet failed to decode.
    Sheet { sheet: String, message: String },
    /// The workbook has no sheets at all.
    NoSheets,
    /// More cells than the import limit.
    TooLarge { limit: usize },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::Decode(msg) => write!(f, "not a readable spreadsheet: {msg}"),
            Self::Sheet { sheet, message } => write!(f, "failed to read sheet '{sheet}': {message}"),
            Self::NoSheets => write!(f, "workbook contains no sheets"),
            Self::TooLarge { limit } => write!(f, "workbook exceeds the {limit} cell import limit"),
        }
    }
}

impl std::error::Error for LoadError {}

/// Writing a comparison result failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    Io(String),
    Csv(String),
    Json(String),
    Xlsx(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::Csv(msg) => write!(f, "CSV write error: {msg}"),
            Self::Json(msg) => write!(f, "JSON write error: {msg}"),
            Self::Xlsx(msg) => write!(f, "XLSX write error: {msg}"),
        }
    }
}

impl std::error::Error for ExportError {}
