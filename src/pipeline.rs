// 🔁 Pipeline - One reconciliation run, load → reconstruct → enrich → write
//
// Single pass. Any fatal error aborts before the output file is written.

use crate::config::ReconConfig;
use crate::parser::{read_checker_lines, reconstruct_rows, ReconstructionStats};
use crate::raw_grid::RawGrid;
use crate::reconciliation::{Enricher, ReconciledRow, ReconciliationSummary};
use crate::report::{BalanceReport, ReferenceIndex};
use crate::workbook::{build_sheets, write_workbook, Sheet};
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct RunInputs {
    pub balance_checker: PathBuf,
    pub balance_report: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub output: PathBuf,
    pub stats: ReconstructionStats,
    pub summary: ReconciliationSummary,
    pub raw_rows: usize,
    pub raw_width: usize,
    pub report_rows: usize,
}

/// Everything the workbook needs, before anything touches the disk
#[derive(Debug, Clone)]
pub struct Reconciled {
    pub rows: Vec<ReconciledRow>,
    pub stats: ReconstructionStats,
    pub summary: ReconciliationSummary,
    pub sheets: Vec<Sheet>,
}

/// Pure in-memory reconciliation over already-loaded inputs
pub fn reconcile<S: AsRef<str>>(
    checker_lines: &[S],
    report: &BalanceReport,
    config: &ReconConfig,
) -> Result<Reconciled> {
    let index = ReferenceIndex::build(report, config)?;

    let reconstruction = reconstruct_rows(checker_lines, &index.valid_symbols);
    let enricher = Enricher::new(&index, config);
    let rows = enricher.enrich(reconstruction.rows);
    let summary = enricher.summarize(&rows);

    let grid = RawGrid::from_lines(checker_lines);
    let sheets = build_sheets(&config.sheets, &rows, enricher.has_subsidiary(), &grid, report);

    Ok(Reconciled {
        rows,
        stats: reconstruction.stats,
        summary,
        sheets,
    })
}

pub fn run(inputs: &RunInputs, config: &ReconConfig) -> Result<RunReport> {
    info!(
        checker = %inputs.balance_checker.display(),
        report = %inputs.balance_report.display(),
        output = %inputs.output.display(),
        "starting reconciliation"
    );

    let report = BalanceReport::from_path(&inputs.balance_report)?;
    let lines = read_checker_lines(&inputs.balance_checker)?;

    let reconciled = reconcile(&lines, &report, config)?;
    write_workbook(&inputs.output, &reconciled.sheets)?;

    let raw = &reconciled.sheets[1];
    Ok(RunReport {
        output: inputs.output.clone(),
        stats: reconciled.stats,
        summary: reconciled.summary,
        raw_rows: raw.rows.len(),
        raw_width: raw.rows.iter().map(Vec::len).max().unwrap_or(0),
        report_rows: report.rows.len(),
    })
}

impl RunInputs {
    pub fn new(balance_checker: &Path, balance_report: &Path, output: &Path) -> Self {
        RunInputs {
            balance_checker: balance_checker.to_path_buf(),
            balance_report: balance_report.to_path_buf(),
            output: output.to_path_buf(),
        }
    }
}
