// CSV/TSV export of comparison results
//
// Long format, one row per unique value:
//   only_in,sheet,column,value
//   first,Sheet1,A,y
//   second,Sheet2,A,z

use std::io::Write;

use colcompare_engine::compare::{ComparisonResult, Side};

use crate::ExportError;

pub const HEADER: [&str; 4] = ["only_in", "sheet", "column", "value"];

pub fn export<W: Write>(result: &ComparisonResult, writer: W) -> Result<(), ExportError> {
    export_with_delimiter(result, writer, b',')
}

pub fn export_tsv<W: Write>(result: &ComparisonResult, writer: W) -> Result<(), ExportError> {
    export_with_delimiter(result, writer, b'\t')
}

fn export_with_delimiter<W: Write>(
    result: &ComparisonResult,
    writer: W,
    delimiter: u8,
) -> Result<(), ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    writer.write_record(HEADER).map_err(|e| ExportError::Csv(e.to_string()))?;

    for side in [Side::First, Side::Second] {
        let selection = result.selection(side);
        for value in result.only_in(side) {
            writer
                .write_record([side.as_str(), selection.sheet.as_str(), selection.column.as_str(), value.as_str()])
                .map_err(|e| ExportError::Csv(e.to_string()))?;
        }
    }

    writer.flush().map_err(|e| ExportError::Io(e.to_string()))?;
    Ok(())
}
