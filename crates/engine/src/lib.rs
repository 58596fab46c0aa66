// Column comparison engine: sheets, column letters, value sets

pub mod cell;
pub mod column;
pub mod compare;
pub mod session;
pub mod sheet;
pub mod workbook;

pub use cell::CellValue;
pub use compare::{compare_columns, ColumnSelection, CompareError, ComparisonResult, Side};
pub use session::{LoadOutcome, LoadTicket, Session, SessionError};
pub use sheet::{Bounds, Sheet};
pub use workbook::Workbook;
