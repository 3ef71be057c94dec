use anyhow::Result;
use balance_recon::{run, ReconConfig, RunInputs};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

/// Reconcile a balance-checker export against a balance report into one workbook
#[derive(Debug, Parser)]
#[command(name = "balance-recon", version)]
struct Cli {
    /// Balance checker text export (comma-delimited, header line first)
    balance_checker: PathBuf,

    /// Balance report CSV (wallet, ticker, walletId, value, optional subsidiary)
    balance_report: PathBuf,

    /// Output .xlsx path
    output: PathBuf,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("balance_recon=info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let inputs = RunInputs::new(&cli.balance_checker, &cli.balance_report, &cli.output);

    let report = run(&inputs, &ReconConfig::default())?;

    println!("✓ Wrote {}", report.output.display());
    println!("  {}", report.summary.summary());
    println!(
        "  checker: {} lines, {} rows kept, {} duplicates, {} dropped",
        report.stats.lines,
        report.stats.kept,
        report.stats.duplicates,
        report.stats.dropped()
    );
    println!(
        "  raw grid: {} x {}, balance report: {} rows",
        report.raw_rows, report.raw_width, report.report_rows
    );

    Ok(())
}
