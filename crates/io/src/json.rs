// JSON export of comparison results

use std::io::Write;

use serde::Serialize;

use colcompare_engine::compare::{ColumnSelection, ComparisonResult};

use crate::ExportError;

/// Output contract version; bump when fields change meaning.
pub const CONTRACT_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    contract_version: u32,
    first: &'a ColumnSelection,
    second: &'a ColumnSelection,
    only_in_first: &'a [String],
    only_in_second: &'a [String],
    summary: JsonSummary,
}

#[derive(Debug, Serialize)]
struct JsonSummary {
    first_values: usize,
    second_values: usize,
    only_in_first: usize,
    only_in_second: usize,
    identical: bool,
}

/// Write the result as a pretty-printed JSON object.
pub fn export<W: Write>(result: &ComparisonResult, mut writer: W) -> Result<(), ExportError> {
    let output = JsonOutput {
        contract_version: CONTRACT_VERSION,
        first: &result.first,
        second: &result.second,
        only_in_first: &result.only_in_first,
        only_in_second: &result.only_in_second,
        summary: JsonSummary {
            first_values: result.first_count,
            second_values: result.second_count,
            only_in_first: result.only_in_first.len(),
            only_in_second: result.only_in_second.len(),
            identical: result.is_identical(),
        },
    };

    serde_json::to_writer_pretty(&mut writer, &output).map_err(|e| ExportError::Json(e.to_string()))?;
    writeln!(writer).map_err(|e| ExportError::Io(e.to_string()))?;
    Ok(())
}
