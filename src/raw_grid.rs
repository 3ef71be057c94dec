// 🗂️ Raw Passthrough - Original balance checker as a rectangular grid
// Audit copy only. Nothing here feeds reconciliation.

use serde::{Deserialize, Serialize};

/// Every checker line (header included) split on commas, padded to the widest line.
///
/// Tokens are kept exactly as split, whitespace included. Padding cells are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawGrid {
    pub rows: Vec<Vec<Option<String>>>,
    pub width: usize,
}

impl RawGrid {
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let split: Vec<Vec<&str>> = lines.iter().map(|l| l.as_ref().split(',').collect()).collect();
        let width = split.iter().map(Vec::len).max().unwrap_or(0);

        let rows = split
            .into_iter()
            .map(|tokens| {
                let mut row: Vec<Option<String>> =
                    tokens.into_iter().map(|t| Some(t.to_string())).collect();
                row.resize(width, None);
                row
            })
            .collect();

        RawGrid { rows, width }
    }

    /// Positional labels `col_1..col_n`; column identity is unknown before pivoting
    pub fn column_labels(&self) -> Vec<String> {
        (1..=self.width).map(|i| format!("col_{}", i)).collect()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_deref()
    }
}
