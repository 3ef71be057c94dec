//! End-to-end runs over files on disk: two inputs in, one workbook out.

use balance_recon::{
    read_checker_lines, reconcile, run, BalanceReport, CellValue, ReconConfig, ReconError,
    RunInputs,
};
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CHECKER: &str = "\
Wallet,Asset,Bitwave Time,Bitwave Balance,Third Party Balance,Difference,Third Party Time
Acme,USD,2023-01-01,100,99.5,-0.5,2023-01-02
Acme Trading, LLC,BTC,2023-01-01,2,2,0,2023-01-02
Acme,USD,2023-01-01,100,99.5,-0.5,2023-01-02
USD,orphan,2023-01-01,1,1,0,2023-01-02
Beta,ETH,2023-01-01,5
garbage line
";

const REPORT: &str = "\
wallet,ticker,walletId,value,subsidiary
Acme,usd,W1,100.5,Acme Holdings
\"Acme Trading, LLC\",BTC,W2,1.5,Acme Holdings
Beta,ETH,W3,5,
";

fn write_inputs(dir: &TempDir, checker: &str, report: &str) -> RunInputs {
    let checker_path = dir.path().join("checker.csv");
    let report_path = dir.path().join("report.csv");
    fs::write(&checker_path, checker).unwrap();
    fs::write(&report_path, report).unwrap();

    RunInputs::new(&checker_path, &report_path, &dir.path().join("out.xlsx"))
}

fn read_back(path: &Path) -> (Vec<String>, Vec<Range<Data>>) {
    let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
    let names = workbook.sheet_names();
    let ranges = names
        .iter()
        .map(|name| workbook.worksheet_range(name).unwrap())
        .collect();
    (names, ranges)
}

fn text(value: &str) -> Data {
    Data::String(value.to_string())
}

fn load(inputs: &RunInputs) -> (Vec<String>, BalanceReport) {
    (
        read_checker_lines(&inputs.balance_checker).unwrap(),
        BalanceReport::from_path(&inputs.balance_report).unwrap(),
    )
}

#[test]
fn test_run_writes_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(&dir, CHECKER, REPORT);

    let report = run(&inputs, &ReconConfig::default()).unwrap();

    let bytes = fs::read(&inputs.output).unwrap();
    assert!(bytes.starts_with(b"PK"));
    assert_eq!(report.output, inputs.output);

    assert_eq!(report.stats.lines, 6);
    assert_eq!(report.stats.kept, 2);
    assert_eq!(report.stats.duplicates, 1);
    assert_eq!(report.stats.dropped(), 3);

    assert_eq!(report.raw_rows, 7);
    assert_eq!(report.raw_width, 8);
    assert_eq!(report.report_rows, 3);
}

#[test]
fn test_rows_joined_and_varied() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(&dir, CHECKER, REPORT);
    let (lines, report) = load(&inputs);

    let out = reconcile(&lines, &report, &ReconConfig::default()).unwrap();

    assert_eq!(out.rows.len(), 2);

    let acme = &out.rows[0];
    assert_eq!(acme.key, "Acme - USD");
    assert_eq!(acme.wallet_id.as_deref(), Some("W1"));
    assert_eq!(acme.balance_report_var, Some(-1.0));
    assert_eq!(acme.subsidiary.as_deref(), Some("Acme Holdings"));

    // wallet name rebuilt across the comma that split it, spacing intact
    let trading = &out.rows[1];
    assert_eq!(trading.wallet_name, "Acme Trading, LLC");
    assert_eq!(trading.asset_symbol, "BTC");
    assert_eq!(trading.key, "Acme Trading, LLC - BTC");
    assert_eq!(trading.wallet_id.as_deref(), Some("W2"));
    assert_eq!(trading.balance_report_balance, Some(1.5));
    assert_eq!(trading.balance_report_var, Some(0.5));
    assert_eq!(trading.subsidiary.as_deref(), Some("Acme Holdings"));

    assert_eq!(out.summary.matched, 2);
}

#[test]
fn test_raw_sheet_round_trips_every_token() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(&dir, CHECKER, REPORT);
    let (lines, report) = load(&inputs);

    let out = reconcile(&lines, &report, &ReconConfig::default()).unwrap();
    let raw = &out.sheets[1];

    assert_eq!(raw.rows.len(), lines.len());
    for (r, line) in lines.iter().enumerate() {
        assert_eq!(raw.rows[r].len(), 8);
        let tokens: Vec<&str> = line.split(',').collect();
        for (c, cell) in raw.rows[r].iter().enumerate() {
            match tokens.get(c) {
                Some(t) => assert_eq!(cell, &CellValue::Text(t.to_string())),
                None => assert_eq!(cell, &CellValue::Empty),
            }
        }
    }
}

#[test]
fn test_original_report_sheet_unmodified() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(&dir, CHECKER, REPORT);
    let (lines, report) = load(&inputs);

    let out = reconcile(&lines, &report, &ReconConfig::default()).unwrap();
    let original = &out.sheets[2];

    assert_eq!(
        original.header.as_ref().unwrap(),
        &vec!["wallet", "ticker", "walletId", "value", "subsidiary"]
    );
    assert_eq!(original.rows[1][0], CellValue::Text("Acme Trading, LLC".to_string()));
    assert_eq!(original.rows[0][1], CellValue::Text("usd".to_string()));
    assert_eq!(original.rows[2][4], CellValue::Empty);
}

#[test]
fn test_missing_column_aborts_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(&dir, CHECKER, "wallet,ticker,value\nAcme,USD,1\n");

    let err = run(&inputs, &ReconConfig::default()).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ReconError>(),
        Some(ReconError::MissingColumn { .. })
    ));
    assert!(!inputs.output.exists());
}

#[test]
fn test_missing_checker_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut inputs = write_inputs(&dir, CHECKER, REPORT);
    inputs.balance_checker = Path::new("/no/such/checker.csv").to_path_buf();

    assert!(run(&inputs, &ReconConfig::default()).is_err());
    assert!(!inputs.output.exists());
}

#[test]
fn test_empty_inputs_still_write_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(&dir, "", "");

    let report = run(&inputs, &ReconConfig::default()).unwrap();

    assert!(inputs.output.exists());
    assert_eq!(report.summary.row_count, 0);
    assert_eq!(report.raw_rows, 0);
    assert_eq!(report.raw_width, 0);
}

#[test]
fn test_written_workbook_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(&dir, CHECKER, REPORT);
    run(&inputs, &ReconConfig::default()).unwrap();

    let (names, sheets) = read_back(&inputs.output);
    assert_eq!(
        names,
        vec![
            "Formatted Balance Checker",
            "Original Balance Checker",
            "Original Balance Report"
        ]
    );

    // formatted: header row, then data; subsidiary column present
    let formatted = &sheets[0];
    assert_eq!(formatted.start(), Some((0, 0)));
    assert_eq!(formatted.get_value((0, 0)), Some(&text("wallet_name")));
    assert_eq!(formatted.get_value((0, 11)), Some(&text("subsidiary")));
    assert_eq!(formatted.width(), 12);
    assert_eq!(formatted.get_value((1, 0)), Some(&text("Acme")));
    assert_eq!(formatted.get_value((1, 4)), Some(&Data::Float(99.5)));
    assert_eq!(formatted.get_value((1, 10)), Some(&Data::Float(-1.0)));
    assert_eq!(formatted.get_value((2, 0)), Some(&text("Acme Trading, LLC")));

    // raw checker: no header, original header line is data at row 0
    let raw = &sheets[1];
    assert_eq!(raw.start(), Some((0, 0)));
    assert_eq!(raw.get_value((0, 0)), Some(&text("Wallet")));
    assert_eq!(raw.get_value((2, 0)), Some(&text("Acme Trading")));
    assert_eq!(raw.get_value((2, 1)), Some(&text(" LLC")));
    assert_eq!(raw.height(), 7);
    assert_eq!(raw.width(), 8);

    // original report: header then rows as written
    let original = &sheets[2];
    assert_eq!(original.get_value((0, 0)), Some(&text("wallet")));
    assert_eq!(original.get_value((1, 1)), Some(&text("usd")));
    assert_eq!(original.height(), 4);
}

#[test]
fn test_written_workbook_without_subsidiary_column() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(
        &dir,
        CHECKER,
        "wallet,ticker,walletId,value\nAcme,usd,W1,100.5\n",
    );
    run(&inputs, &ReconConfig::default()).unwrap();

    let (_, sheets) = read_back(&inputs.output);
    let formatted = &sheets[0];

    assert_eq!(formatted.width(), 11);
    assert_eq!(formatted.get_value((0, 10)), Some(&text("balance_report_var")));
    assert_eq!(formatted.get_value((0, 11)), None);
}
