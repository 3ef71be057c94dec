// ⚖️ Reconciliation Engine - Join checker rows against the balance report
// Third-party balance vs. balance-report balance, per "Wallet-Asset" key.
//
//   balance_report_var = thirdparty_balance - balance_report_balance
//
// Missing on either side means a missing variance, never zero.

use crate::config::ReconConfig;
use crate::numeric::{coerce_numeric, variance};
use crate::parser::CheckerRow;
use crate::report::ReferenceIndex;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Column headers for the formatted sheet, in output order
pub const BASE_COLUMNS: [&str; 11] = [
    "wallet_name",
    "asset_symbol",
    "bitwave_balance_time",
    "bitwave_balance",
    "thirdparty_balance",
    "difference",
    "thirdparty_balance_time",
    "Wallet-Asset",
    "walletId",
    "balance_report_balance",
    "balance_report_var",
];

pub const SUBSIDIARY_HEADER: &str = "subsidiary";

// ============================================================================
// RECONCILED ROW
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledRow {
    pub wallet_name: String,
    pub asset_symbol: String,
    pub bitwave_balance_time: String,
    pub bitwave_balance: String,
    pub thirdparty_balance: Option<f64>,
    pub difference: String,
    pub thirdparty_balance_time: String,

    /// "Wallet-Asset" join key
    pub key: String,
    pub wallet_id: Option<String>,
    pub balance_report_balance: Option<f64>,
    pub balance_report_var: Option<f64>,

    /// Only meaningful when the report carried a subsidiary column
    pub subsidiary: Option<String>,
}

impl ReconciledRow {
    pub fn is_matched(&self) -> bool {
        self.wallet_id.is_some()
    }
}

// ============================================================================
// RECONCILIATION SUMMARY
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    pub row_count: usize,
    /// Rows whose key found a walletId
    pub matched: usize,
    /// Rows with both balances present
    pub with_variance: usize,
    /// Rows whose variance is outside tolerance
    pub discrepancies: usize,
    pub total_abs_variance: f64,
    pub reconciled_at: DateTime<Utc>,
}

impl ReconciliationSummary {
    pub fn unmatched(&self) -> usize {
        self.row_count - self.matched
    }

    pub fn summary(&self) -> String {
        format!(
            "{} rows: {} matched, {} unmatched, {} with variance, {} discrepancies (total |var| {:.2})",
            self.row_count,
            self.matched,
            self.unmatched(),
            self.with_variance,
            self.discrepancies,
            self.total_abs_variance
        )
    }
}

// ============================================================================
// ENRICHER
// ============================================================================

pub struct Enricher<'a> {
    index: &'a ReferenceIndex,
    config: &'a ReconConfig,

    /// Variances at or below this magnitude don't count as discrepancies (default: 0.0)
    pub tolerance: f64,
}

impl<'a> Enricher<'a> {
    pub fn new(index: &'a ReferenceIndex, config: &'a ReconConfig) -> Self {
        Enricher {
            index,
            config,
            tolerance: 0.0,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Whether the formatted output carries a subsidiary column
    pub fn has_subsidiary(&self) -> bool {
        self.index.has_subsidiary()
    }

    pub fn enrich_row(&self, row: CheckerRow) -> ReconciledRow {
        let key = self
            .config
            .composite_key(&row.wallet_name, &row.asset_symbol);

        let thirdparty_balance = coerce_numeric(&row.thirdparty_balance);
        let balance_report_balance = self.index.balance(&key);
        let wallet_id = self.index.wallet_id(&key).map(str::to_string);
        let subsidiary = self
            .index
            .subsidiary(&row.wallet_name)
            .map(str::to_string);

        ReconciledRow {
            wallet_name: row.wallet_name,
            asset_symbol: row.asset_symbol,
            bitwave_balance_time: row.bitwave_balance_time,
            bitwave_balance: row.bitwave_balance,
            thirdparty_balance,
            difference: row.difference,
            thirdparty_balance_time: row.thirdparty_balance_time,
            key,
            wallet_id,
            balance_report_balance,
            balance_report_var: variance(thirdparty_balance, balance_report_balance),
            subsidiary,
        }
    }

    /// Enrich a batch, keeping encounter order
    pub fn enrich(&self, rows: Vec<CheckerRow>) -> Vec<ReconciledRow> {
        rows.into_iter().map(|row| self.enrich_row(row)).collect()
    }

    pub fn summarize(&self, rows: &[ReconciledRow]) -> ReconciliationSummary {
        let variances: Vec<f64> = rows.iter().filter_map(|r| r.balance_report_var).collect();

        let summary = ReconciliationSummary {
            row_count: rows.len(),
            matched: rows.iter().filter(|r| r.is_matched()).count(),
            with_variance: variances.len(),
            discrepancies: variances
                .iter()
                .filter(|v| v.abs() > self.tolerance)
                .count(),
            total_abs_variance: variances.iter().map(|v| v.abs()).sum(),
            reconciled_at: Utc::now(),
        };

        info!("{}", summary.summary());
        summary
    }
}

// ============================================================================
// TESTS
// ============================================================================
