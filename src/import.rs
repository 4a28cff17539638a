//! Parsing of uploaded student rosters.
//!
//! A roster is delimited text with a header row naming at least the columns
//! in [`REQUIRED_COLUMNS`]; extra columns are ignored. Per-row skip decisions
//! (empty names, duplicate document IDs) are made at insert time by the
//! import endpoint, not here.

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Columns every roster must have, in no particular order.
pub const REQUIRED_COLUMNS: [&str; 4] = ["doc_id", "full_name", "grade", "group_name"];

/// One parsed roster row, whitespace-trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRow {
    pub doc_id: String,
    pub full_name: String,
    pub grade: String,
    pub group_name: String,
}

/// The outcome of a roster import: valid rows always commit, the rest are
/// counted, never fatal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub inserted: u64,
    pub skipped: u64,
}

/// Is this upload in a format we can read?
pub fn supported_format(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    lower.ends_with(".csv") || lower.ends_with(".txt")
}

/// Parse a roster into rows, validating the header.
pub fn parse_roster(data: &str) -> Result<Vec<RosterRow>> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_reader(data.as_bytes());
    let headers = reader.headers()?.clone();

    let columns = REQUIRED_COLUMNS.map(|name| headers.iter().position(|header| header == name));
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .zip(&columns)
        .filter(|(_, index)| index.is_none())
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(Error::MissingImportColumns(missing.join(", ")));
    }
    let field = |record: &StringRecord, column: usize| {
        // Present because the header was validated above.
        record
            .get(columns[column].unwrap())
            .unwrap_or_default()
            .to_string()
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(RosterRow {
            doc_id: field(&record, 0),
            full_name: field(&record, 1),
            grade: field(&record, 2),
            group_name: field(&record, 3),
        });
    }
    Ok(rows)
}
