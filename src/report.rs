// 📒 Reference Loader - Balance Report
// Loads the structured balance report and indexes it by "Wallet-Asset" key.
//
// The report is kept twice: verbatim (for the audit sheet) and as lookup
// maps built once and read many times by the enricher.

use crate::config::{KeyCasing, ReconConfig};
use crate::error::ReconError;
use crate::numeric::coerce_optional;
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

pub const WALLET_COLUMN: &str = "wallet";
pub const TICKER_COLUMN: &str = "ticker";
pub const WALLET_ID_COLUMN: &str = "walletId";
pub const VALUE_COLUMN: &str = "value";
pub const SUBSIDIARY_COLUMN: &str = "subsidiary";

const REQUIRED_COLUMNS: [&str; 4] = [WALLET_COLUMN, TICKER_COLUMN, WALLET_ID_COLUMN, VALUE_COLUMN];

// ============================================================================
// BALANCE REPORT (verbatim table)
// ============================================================================

/// The balance report exactly as read: header plus text cells.
///
/// Every row is padded (or cut) to the header width. Cells are kept as
/// written; `records()` reads empty and NA-marker cells as missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceReport {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// One report row, viewed through the columns the join cares about
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceRecord<'a> {
    pub wallet: Option<&'a str>,
    pub ticker: Option<&'a str>,
    pub wallet_id: Option<&'a str>,
    pub value: Option<&'a str>,
    pub subsidiary: Option<&'a str>,
}

impl BalanceReport {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open balance report: {}", path.display()))?;

        let report = Self::from_reader(file)
            .with_context(|| format!("Failed to read balance report: {}", path.display()))?;

        info!(
            path = %path.display(),
            rows = report.rows.len(),
            columns = report.headers.len(),
            "loaded balance report"
        );
        Ok(report)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .context("Failed to parse CSV header")?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                if i == 0 {
                    h.trim_start_matches('\u{feff}').to_string()
                } else {
                    h.to_string()
                }
            })
            .collect();

        let width = headers.len();
        let mut rows = Vec::new();

        for (line_num, result) in reader.records().enumerate() {
            let record = result
                .with_context(|| format!("Failed to parse CSV line {}", line_num + 2))?;

            let mut row: Vec<String> = record.iter().take(width).map(str::to_string).collect();
            row.resize(width, String::new());
            rows.push(row);
        }

        Ok(BalanceReport { headers, rows })
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Fail with `MissingColumn` on the first required column not in the header
    pub fn require_columns(&self) -> Result<(), ReconError> {
        for column in REQUIRED_COLUMNS {
            if !self.has_column(column) {
                return Err(ReconError::MissingColumn {
                    column: column.to_string(),
                    available: self.headers.clone(),
                });
            }
        }
        Ok(())
    }

    /// Iterate rows as `ReferenceRecord`s. Columns absent from the header read as missing.
    pub fn records(&self) -> impl Iterator<Item = ReferenceRecord<'_>> + '_ {
        let wallet = self.column_index(WALLET_COLUMN);
        let ticker = self.column_index(TICKER_COLUMN);
        let wallet_id = self.column_index(WALLET_ID_COLUMN);
        let value = self.column_index(VALUE_COLUMN);
        let subsidiary = self.column_index(SUBSIDIARY_COLUMN);

        self.rows.iter().map(move |row| ReferenceRecord {
            wallet: cell(row, wallet),
            ticker: cell(row, ticker),
            wallet_id: cell(row, wallet_id),
            value: cell(row, value),
            subsidiary: cell(row, subsidiary),
        })
    }
}

/// Cell texts read as missing, matched exactly (pandas `read_csv` defaults)
pub const NA_MARKERS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_missing(value: &str) -> bool {
    NA_MARKERS.contains(&value)
}

fn cell(row: &[String], index: Option<usize>) -> Option<&str> {
    index
        .and_then(|i| row.get(i))
        .map(String::as_str)
        .filter(|s| !is_missing(s))
}

// ============================================================================
// REFERENCE INDEX (lookup maps)
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    /// Uppercased, trimmed, non-empty tickers
    pub valid_symbols: HashSet<String>,

    pub key_to_wallet_id: HashMap<String, Option<String>>,

    pub key_to_balance: HashMap<String, Option<f64>>,

    /// `None` when the report has no subsidiary column at all
    pub wallet_to_subsidiary: Option<HashMap<String, Option<String>>>,

    key_casing: KeyCasing,
}

impl ReferenceIndex {
    /// Build lookups from a loaded report.
    ///
    /// A fully empty report (no header) yields empty maps. Otherwise the four
    /// join columns must be present. Duplicate keys are last-write-wins,
    /// including a later missing value overwriting an earlier present one.
    pub fn build(report: &BalanceReport, config: &ReconConfig) -> Result<Self, ReconError> {
        let mut index = ReferenceIndex {
            key_casing: config.key_casing,
            ..Default::default()
        };

        if report.is_empty() {
            debug!("balance report is empty, reference index left empty");
            return Ok(index);
        }

        report.require_columns()?;

        let mut subsidiaries = report
            .has_column(SUBSIDIARY_COLUMN)
            .then(HashMap::new);

        for record in report.records() {
            if let Some(ticker) = record.ticker {
                let symbol = ticker.trim().to_uppercase();
                if !symbol.is_empty() {
                    index.valid_symbols.insert(symbol);
                }
            }

            let Some(wallet) = record.wallet else {
                continue;
            };

            if let Some(map) = subsidiaries.as_mut() {
                map.insert(
                    wallet.trim().to_string(),
                    record.subsidiary.map(str::to_string),
                );
            }

            let Some(ticker) = record.ticker else {
                continue;
            };

            let key = index.reference_key(config, wallet, ticker);
            index
                .key_to_wallet_id
                .insert(key.clone(), record.wallet_id.map(str::to_string));
            index
                .key_to_balance
                .insert(key, coerce_optional(record.value));
        }

        index.wallet_to_subsidiary = subsidiaries;

        info!(
            symbols = index.valid_symbols.len(),
            keys = index.key_to_wallet_id.len(),
            subsidiary = index.wallet_to_subsidiary.is_some(),
            "built reference index"
        );
        Ok(index)
    }

    fn reference_key(&self, config: &ReconConfig, wallet: &str, ticker: &str) -> String {
        match self.key_casing {
            KeyCasing::Normalized => config.composite_key(wallet, &ticker.trim().to_uppercase()),
            KeyCasing::Verbatim => config.composite_key(wallet, ticker),
        }
    }

    pub fn is_valid_symbol(&self, token: &str) -> bool {
        self.valid_symbols.contains(&token.trim().to_uppercase())
    }

    pub fn wallet_id(&self, key: &str) -> Option<&str> {
        self.key_to_wallet_id.get(key)?.as_deref()
    }

    pub fn balance(&self, key: &str) -> Option<f64> {
        self.key_to_balance.get(key).copied().flatten()
    }

    pub fn has_subsidiary(&self) -> bool {
        self.wallet_to_subsidiary.is_some()
    }

    pub fn subsidiary(&self, wallet: &str) -> Option<&str> {
        self.wallet_to_subsidiary
            .as_ref()?
            .get(wallet.trim())?
            .as_deref()
    }
}

// ============================================================================
// TESTS
// ============================================================================
