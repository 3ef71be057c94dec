// 🧩 Balance Checker Parser - Pivot reconstruction
// Recovers fixed-shape rows from an unquoted, variable-width comma export.
//
// Wallet names may contain commas, so field positions shift from line to
// line. The first token that is a known asset symbol anchors the row:
// everything before it is the wallet name, the five tokens after it are the
// balance fields.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Balance fields expected after the asset symbol
pub const TRAILING_FIELDS: usize = 5;

// ============================================================================
// CORE TYPES
// ============================================================================

/// CheckerRow - One reconstructed balance-checker line, before enrichment
///
/// Everything except `asset_symbol` is passed through as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckerRow {
    pub wallet_name: String,
    pub asset_symbol: String,
    pub bitwave_balance_time: String,
    pub bitwave_balance: String,
    pub thirdparty_balance: String,
    pub difference: String,
    pub thirdparty_balance_time: String,
}

/// PivotSplit - A line cut at its asset-symbol anchor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotSplit<'a> {
    pub prefix: &'a [String],
    pub anchor: &'a str,
    pub suffix: &'a [String],
}

/// Why a line did not become a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DropReason {
    /// No token is a known symbol
    NoSymbol,
    /// First known symbol is the first token, so there is no wallet name
    SymbolAtStart,
    /// Fewer than five tokens follow the symbol
    TooFewFields,
    /// Wallet name is blank after trimming
    BlankWallet,
}

impl DropReason {
    pub fn name(&self) -> &str {
        match self {
            DropReason::NoSymbol => "no known asset symbol",
            DropReason::SymbolAtStart => "asset symbol in first column",
            DropReason::TooFewFields => "too few fields after asset symbol",
            DropReason::BlankWallet => "blank wallet name",
        }
    }
}

/// Counters for one reconstruction pass. Diagnostics only; drops stay silent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconstructionStats {
    /// Data lines seen (header excluded)
    pub lines: usize,
    pub kept: usize,
    pub duplicates: usize,
    pub no_symbol: usize,
    pub symbol_at_start: usize,
    pub too_few_fields: usize,
    pub blank_wallet: usize,
}

impl ReconstructionStats {
    fn record(&mut self, reason: DropReason) {
        match reason {
            DropReason::NoSymbol => self.no_symbol += 1,
            DropReason::SymbolAtStart => self.symbol_at_start += 1,
            DropReason::TooFewFields => self.too_few_fields += 1,
            DropReason::BlankWallet => self.blank_wallet += 1,
        }
    }

    pub fn dropped(&self) -> usize {
        self.no_symbol + self.symbol_at_start + self.too_few_fields + self.blank_wallet
    }
}

#[derive(Debug, Clone, Default)]
pub struct Reconstruction {
    pub rows: Vec<CheckerRow>,
    pub stats: ReconstructionStats,
}

// ============================================================================
// LOADING
// ============================================================================

/// Read the balance-checker export as text lines (header included).
pub fn read_checker_lines(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read balance checker: {}", path.display()))?;

    let lines = split_text_lines(content.trim_start_matches('\u{feff}'));

    info!(path = %path.display(), lines = lines.len(), "loaded balance checker");
    Ok(lines)
}

/// Split text into lines on `\n`, `\r\n` or a bare `\r`
pub fn split_text_lines(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .lines()
        .map(str::to_string)
        .collect()
}

// ============================================================================
// PIVOT SEARCH
// ============================================================================

/// Split on every comma. Not quote-aware; tokens keep their whitespace so a
/// wallet name like "Acme Trading, LLC" rejoins exactly.
pub fn split_line(line: &str) -> Vec<String> {
    line.split(',').map(str::to_string).collect()
}

/// Locate the first vocabulary token and cut the line around it.
///
/// Only the first match counts: if it sits at index 0 the line is rejected
/// even when a later token would also match.
pub fn locate_pivot<'a>(
    tokens: &'a [String],
    vocabulary: &HashSet<String>,
) -> Result<PivotSplit<'a>, DropReason> {
    let index = tokens
        .iter()
        .position(|t| vocabulary.contains(&t.trim().to_uppercase()))
        .ok_or(DropReason::NoSymbol)?;

    if index == 0 {
        return Err(DropReason::SymbolAtStart);
    }

    let suffix = tokens
        .get(index + 1..index + 1 + TRAILING_FIELDS)
        .ok_or(DropReason::TooFewFields)?;

    Ok(PivotSplit {
        prefix: &tokens[..index],
        anchor: &tokens[index],
        suffix,
    })
}

/// `locate_pivot` without the reason
pub fn find_pivot<'a>(tokens: &'a [String], vocabulary: &HashSet<String>) -> Option<PivotSplit<'a>> {
    locate_pivot(tokens, vocabulary).ok()
}

impl PivotSplit<'_> {
    pub fn into_row(self) -> CheckerRow {
        CheckerRow {
            wallet_name: self.prefix.join(","),
            asset_symbol: self.anchor.trim().to_uppercase(),
            bitwave_balance_time: self.suffix[0].clone(),
            bitwave_balance: self.suffix[1].clone(),
            thirdparty_balance: self.suffix[2].clone(),
            difference: self.suffix[3].clone(),
            thirdparty_balance_time: self.suffix[4].clone(),
        }
    }
}

// ============================================================================
// RECONSTRUCTION
// ============================================================================

/// Rebuild rows from raw checker lines. The first line is a header and skipped.
///
/// Rows identical across all seven fields collapse to the first occurrence,
/// then rows with a blank wallet name are removed. Encounter order is kept.
pub fn reconstruct_rows<S: AsRef<str>>(lines: &[S], vocabulary: &HashSet<String>) -> Reconstruction {
    let mut stats = ReconstructionStats::default();
    let mut seen: HashSet<CheckerRow> = HashSet::new();
    let mut unique = Vec::new();

    for (line_num, line) in lines.iter().enumerate().skip(1) {
        stats.lines += 1;
        let tokens = split_line(line.as_ref().trim());

        match locate_pivot(&tokens, vocabulary) {
            Ok(split) => {
                let row = split.into_row();
                if seen.insert(row.clone()) {
                    unique.push(row);
                } else {
                    stats.duplicates += 1;
                }
            }
            Err(reason) => {
                debug!(line = line_num + 1, reason = reason.name(), "dropped checker line");
                stats.record(reason);
            }
        }
    }

    let mut rows = Vec::with_capacity(unique.len());
    for row in unique {
        if row.wallet_name.trim().is_empty() {
            debug!(symbol = %row.asset_symbol, reason = DropReason::BlankWallet.name(), "dropped checker row");
            stats.record(DropReason::BlankWallet);
        } else {
            rows.push(row);
        }
    }

    stats.kept = rows.len();
    info!(
        lines = stats.lines,
        kept = stats.kept,
        duplicates = stats.duplicates,
        dropped = stats.dropped(),
        "reconstructed balance checker rows"
    );

    Reconstruction { rows, stats }
}

// ============================================================================
// TESTS
// ============================================================================
