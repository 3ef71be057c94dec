// ⚙️ Run configuration
// Join-key policy and output sheet names. Loadable from JSON, defaults match the CLI.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// ============================================================================
// KEY CASING
// ============================================================================

/// How the ticker half of the reference-side composite key is cased.
///
/// The reconciled side always uppercases its asset symbol. `Normalized`
/// uppercases the reference ticker too, so "usd" in the report joins with
/// "USD" in the checker. `Verbatim` keeps the report ticker as written, which
/// makes lower/mixed-case tickers fail to join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum KeyCasing {
    #[default]
    Normalized,
    Verbatim,
}

// ============================================================================
// SHEET NAMES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetNames {
    pub formatted: String,
    pub raw_checker: String,
    pub raw_report: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        SheetNames {
            formatted: "Formatted Balance Checker".to_string(),
            raw_checker: "Original Balance Checker".to_string(),
            raw_report: "Original Balance Report".to_string(),
        }
    }
}

// ============================================================================
// RECON CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    pub key_casing: KeyCasing,

    /// Joins wallet and ticker into the "Wallet-Asset" key
    pub key_separator: String,

    pub sheets: SheetNames,
}

impl Default for ReconConfig {
    fn default() -> Self {
        ReconConfig {
            key_casing: KeyCasing::default(),
            key_separator: " - ".to_string(),
            sheets: SheetNames::default(),
        }
    }
}

impl ReconConfig {
    /// Load config from a JSON file; absent fields fall back to defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: ReconConfig =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;

        Ok(config)
    }

    /// Composite "Wallet-Asset" key; both halves trimmed, casing left to the caller
    pub fn composite_key(&self, wallet: &str, ticker: &str) -> String {
        format!("{}{}{}", wallet.trim(), self.key_separator, ticker.trim())
    }
}
