//! Reading the header and leading rows of an uploaded CSV file.

use std::collections::HashSet;

use serde::Serialize;
use ts_rs::TS;

use crate::error::ImportError;

/// Rows shown to the column analyzer.
pub const SAMPLE_ROWS: usize = 5;

/// Header plus the first few data rows of a CSV file.
///
/// Every row has exactly `columns.len()` cells; short rows are padded with
/// empty strings and long rows truncated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CsvSample {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvSample {
    /// Index of a column by exact header name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Non-empty sample values for one column.
    pub fn values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .filter_map(move |row| row.get(index))
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// Read the header and at most `limit` data rows.
///
/// Mappings address columns by header name, so a repeated non-empty header
/// is rejected. Blank headers may repeat; they cannot be mapped.
pub fn read(bytes: &[u8], limit: usize) -> Result<CsvSample, ImportError> {
    let mut reader = reader(bytes);

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if columns.iter().all(|c| c.is_empty()) {
        return Err(ImportError::MissingHeader);
    }
    let mut seen = HashSet::new();
    if let Some(repeated) = columns.iter().find(|c| !c.is_empty() && !seen.insert(c.as_str())) {
        return Err(ImportError::DuplicateHeader(repeated.clone()));
    }

    let mut rows = Vec::with_capacity(limit);
    for record in reader.records().take(limit) {
        let record = record?;
        let mut row: Vec<String> = record.iter().take(columns.len()).map(str::to_string).collect();
        row.resize(columns.len(), String::new());
        rows.push(row);
    }

    Ok(CsvSample { columns, rows })
}

/// Number of data rows, excluding the header.
pub fn count_rows(bytes: &[u8]) -> Result<usize, ImportError> {
    let mut reader = reader(bytes);
    let mut count = 0;
    for record in reader.records() {
        record?;
        count += 1;
    }
    Ok(count)
}

fn reader(bytes: &[u8]) -> csv::Reader<&[u8]> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes)
}
