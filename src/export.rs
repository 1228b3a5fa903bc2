//! Flattening outcomes into a table and writing it as an XLSX workbook.

use crate::error::{Result, ScrapeError};
use crate::record::{FlatRow, Outcome};
use indexmap::IndexSet;
use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};

/// Longest string Excel accepts in one cell
pub const MAX_CELL_CHARS: usize = 32_767;

/// Widest sheet Excel accepts
pub const MAX_COLUMNS: usize = 16_384;

/// Longest worksheet name Excel accepts
pub const MAX_SHEET_NAME_CHARS: usize = 31;

const SHEET_NAME_FORBIDDEN: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Check `name` against Excel's worksheet naming rules, describing the first rule it breaks
pub fn check_sheet_name(name: &str) -> std::result::Result<(), String> {
    let len = name.chars().count();
    if name.trim().is_empty() {
        return Err("must not be empty".to_string());
    }
    if len > MAX_SHEET_NAME_CHARS {
        return Err(format!("is {} characters long, the limit is {}", len, MAX_SHEET_NAME_CHARS));
    }
    if let Some(c) = name.chars().find(|c| SHEET_NAME_FORBIDDEN.contains(c)) {
        return Err(format!("must not contain '{}'", c));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err("must not start or end with an apostrophe".to_string());
    }
    if name.eq_ignore_ascii_case("history") {
        return Err("'History' is reserved by Excel".to_string());
    }
    Ok(())
}

/// One header row plus one row per outcome
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: IndexSet<String>,
    rows: Vec<FlatRow>,
}

impl Table {
    /// Flatten every outcome; columns are the union of row keys in order of first appearance
    pub fn from_outcomes(outcomes: &[Outcome]) -> Self {
        let rows: Vec<FlatRow> = outcomes.iter().map(Outcome::flatten).collect();
        let columns = rows.iter().flat_map(|row| row.keys().cloned()).collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell text at `row` for `column`; `None` when the row lacks the key or holds null
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        self.rows.get(row)?.get(column)?.as_deref()
    }

    /// Cells of one row aligned to the header
    pub fn row_cells(&self, row: usize) -> Option<Vec<Option<&str>>> {
        let flat = self.rows.get(row)?;
        Some(self.columns.iter().map(|c| flat.get(c).and_then(|v| v.as_deref())).collect())
    }
}

/// What an export wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub path: PathBuf,
    pub rows: usize,
    pub columns: usize,
}

/// Write `outcomes` to a single-sheet XLSX file at `path`.
///
/// Returns `Ok(None)` without touching the filesystem when there is nothing to write.
pub fn export(outcomes: &[Outcome], path: impl AsRef<Path>, sheet_name: &str) -> Result<Option<ExportReport>> {
    let path = path.as_ref();
    let table = Table::from_outcomes(outcomes);
    if table.is_empty() {
        log::info!("No data to write, skipping export");
        return Ok(None);
    }

    if table.column_count() > MAX_COLUMNS {
        return Err(ScrapeError::ExportFailed(format!(
            "{} columns exceed the sheet limit of {}",
            table.column_count(),
            MAX_COLUMNS
        )));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ScrapeError::ExportFailed(format!("Failed to create directory {}: {}", parent.display(), e))
            })?;
        }
    }

    write_xlsx(&table, path, sheet_name)?;

    log::info!("Wrote {} rows x {} columns to {}", table.row_count(), table.column_count(), path.display());
    Ok(Some(ExportReport { path: path.to_path_buf(), rows: table.row_count(), columns: table.column_count() }))
}

fn write_xlsx(table: &Table, path: &Path, sheet_name: &str) -> Result<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    check_sheet_name(sheet_name)
        .map_err(|e| ScrapeError::ExportFailed(format!("Invalid sheet name '{}': {}", sheet_name, e)))?;

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(sheet_name)
        .map_err(|e| ScrapeError::ExportFailed(format!("Invalid sheet name '{}': {}", sheet_name, e)))?;

    for (col, name) in table.columns().enumerate() {
        worksheet.write_string_with_format(0, col as u16, truncate_cell(name), &header)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    for (i, flat) in table.rows.iter().enumerate() {
        let row = u32::try_from(i + 1)
            .map_err(|_| ScrapeError::ExportFailed(format!("row {} exceeds the sheet limit", i + 1)))?;
        for (col, name) in table.columns().enumerate() {
            // Missing keys and nulls stay blank
            if let Some(Some(text)) = flat.get(name) {
                worksheet.write_string(row, col as u16, truncate_cell(text))?;
            }
        }
    }

    workbook
        .save(path)
        .map_err(|e| ScrapeError::ExportFailed(format!("Failed to write {}: {}", path.display(), e)))?;

    Ok(())
}

fn truncate_cell(text: &str) -> &str {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((cut, _)) => {
            log::warn!("Truncating cell value of {} characters to {}", text.chars().count(), MAX_CELL_CHARS);
            &text[..cut]
        }
        None => text,
    }
}
