// ⚠️ Error taxonomy
// Fatal conditions that abort a run. Per-row and per-value problems never land here.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ReconError {
    /// Balance report header lacks a column the join needs
    #[error("balance report is missing required column '{column}' (found: {})", .available.join(", "))]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    /// Spreadsheet serialization failed
    #[error("failed to write workbook: {0}")]
    Workbook(String),
}

impl From<rust_xlsxwriter::XlsxError> for ReconError {
    fn from(value: rust_xlsxwriter::XlsxError) -> Self {
        Self::Workbook(value.to_string())
    }
}
