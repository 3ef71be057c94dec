// 📗 Workbook Output - Three audit sheets in one .xlsx
//
// Sheets are assembled as plain data first (`Sheet`), then serialized.
// Order: formatted rows, original checker grid, original balance report.

use crate::config::SheetNames;
use crate::error::ReconError;
use crate::raw_grid::RawGrid;
use crate::reconciliation::{ReconciledRow, BASE_COLUMNS, SUBSIDIARY_HEADER};
use crate::report::BalanceReport;
use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use std::path::Path;
use tracing::info;

// ============================================================================
// SHEET MODEL
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
}

impl CellValue {
    pub fn text(value: &str) -> Self {
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value.to_string())
        }
    }

    pub fn optional_text(value: Option<&str>) -> Self {
        value.map(CellValue::text).unwrap_or(CellValue::Empty)
    }

    /// Excel has no NaN/inf; non-finite numbers are written as text
    pub fn number(value: Option<f64>) -> Self {
        match value {
            Some(n) if n.is_finite() => CellValue::Number(n),
            Some(n) => CellValue::Text(n.to_string()),
            None => CellValue::Empty,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    /// `None` writes data from the first row with no header
    pub header: Option<Vec<String>>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.as_ref()?.iter().position(|h| h == name)
    }
}

// ============================================================================
// SHEET BUILDERS
// ============================================================================

/// Reconciled rows with field-name header. The subsidiary column exists only
/// when the report had one.
pub fn formatted_sheet(name: &str, rows: &[ReconciledRow], with_subsidiary: bool) -> Sheet {
    let mut header: Vec<String> = BASE_COLUMNS.iter().map(|c| c.to_string()).collect();
    if with_subsidiary {
        header.push(SUBSIDIARY_HEADER.to_string());
    }

    let rows = rows
        .iter()
        .map(|row| {
            let mut cells = vec![
                CellValue::text(&row.wallet_name),
                CellValue::text(&row.asset_symbol),
                CellValue::text(&row.bitwave_balance_time),
                CellValue::text(&row.bitwave_balance),
                CellValue::number(row.thirdparty_balance),
                CellValue::text(&row.difference),
                CellValue::text(&row.thirdparty_balance_time),
                CellValue::text(&row.key),
                CellValue::optional_text(row.wallet_id.as_deref()),
                CellValue::number(row.balance_report_balance),
                CellValue::number(row.balance_report_var),
            ];
            if with_subsidiary {
                cells.push(CellValue::optional_text(row.subsidiary.as_deref()));
            }
            cells
        })
        .collect();

    Sheet {
        name: name.to_string(),
        header: Some(header),
        rows,
    }
}

/// Raw checker grid, header line treated as data
pub fn raw_checker_sheet(name: &str, grid: &RawGrid) -> Sheet {
    let rows = grid
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Some(token) => CellValue::Text(token.clone()),
                    None => CellValue::Empty,
                })
                .collect()
        })
        .collect();

    Sheet {
        name: name.to_string(),
        header: None,
        rows,
    }
}

/// Balance report as loaded, header included
pub fn raw_report_sheet(name: &str, report: &BalanceReport) -> Sheet {
    Sheet {
        name: name.to_string(),
        header: Some(report.headers.clone()),
        rows: report
            .rows
            .iter()
            .map(|row| row.iter().map(|c| CellValue::text(c)).collect())
            .collect(),
    }
}

pub fn build_sheets(
    names: &SheetNames,
    rows: &[ReconciledRow],
    with_subsidiary: bool,
    grid: &RawGrid,
    report: &BalanceReport,
) -> Vec<Sheet> {
    vec![
        formatted_sheet(&names.formatted, rows, with_subsidiary),
        raw_checker_sheet(&names.raw_checker, grid),
        raw_report_sheet(&names.raw_report, report),
    ]
}

// ============================================================================
// XLSX SERIALIZATION
// ============================================================================

/// Write all sheets to `path` in order, replacing any existing file
pub fn write_workbook(path: &Path, sheets: &[Sheet]) -> Result<()> {
    let mut workbook = Workbook::new();
    let header_format = Format::new()
        .set_bold()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center);

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        render_sheet(worksheet, sheet, &header_format)
            .with_context(|| format!("Failed to render sheet '{}'", sheet.name))?;
    }

    workbook
        .save(path)
        .map_err(ReconError::from)
        .with_context(|| format!("Failed to save workbook: {}", path.display()))?;

    info!(path = %path.display(), sheets = sheets.len(), "wrote workbook");
    Ok(())
}

fn render_sheet(worksheet: &mut Worksheet, sheet: &Sheet, header_format: &Format) -> Result<()> {
    worksheet.set_name(&sheet.name).map_err(ReconError::from)?;

    let mut next_row: u32 = 0;

    if let Some(header) = &sheet.header {
        for (col, title) in header.iter().enumerate() {
            worksheet
                .write_string_with_format(next_row, column(col)?, title, header_format)
                .map_err(ReconError::from)?;
        }
        next_row += 1;
    }

    for row in &sheet.rows {
        for (col, value) in row.iter().enumerate() {
            let col = column(col)?;
            match value {
                CellValue::Empty => {}
                CellValue::Text(s) if s.is_empty() => {}
                CellValue::Text(s) => {
                    worksheet
                        .write_string(next_row, col, s)
                        .map_err(ReconError::from)?;
                }
                CellValue::Number(n) => {
                    worksheet
                        .write_number(next_row, col, *n)
                        .map_err(ReconError::from)?;
                }
            }
        }
        next_row = next_row
            .checked_add(1)
            .context("sheet exceeds row limit")?;
    }

    Ok(())
}

fn column(index: usize) -> Result<u16> {
    u16::try_from(index).with_context(|| format!("column {} exceeds sheet limit", index))
}

// ============================================================================
// TESTS
// ============================================================================
