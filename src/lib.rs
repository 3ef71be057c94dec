// Balance Reconciliation - Core Library
// Exposes all modules for use in the CLI and tests

pub mod config;
pub mod error;
pub mod numeric;
pub mod parser;         // Pivot reconstruction of the balance checker export
pub mod pipeline;
pub mod raw_grid;       // Audit passthrough of the original checker lines
pub mod reconciliation; // Join + variance against the balance report
pub mod report;         // Reference loader
pub mod workbook;

// Re-export commonly used types
pub use config::{KeyCasing, ReconConfig, SheetNames};
pub use error::ReconError;
pub use numeric::{coerce_numeric, variance};
pub use parser::{
    CheckerRow, DropReason, PivotSplit, Reconstruction, ReconstructionStats,
    find_pivot, locate_pivot, read_checker_lines, reconstruct_rows, split_line,
};
pub use pipeline::{reconcile, run, Reconciled, RunInputs, RunReport};
pub use raw_grid::RawGrid;
pub use reconciliation::{Enricher, ReconciledRow, ReconciliationSummary};
pub use report::{BalanceReport, ReferenceIndex, ReferenceRecord};
pub use workbook::{build_sheets, write_workbook, CellValue, Sheet};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
