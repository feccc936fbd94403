use std::path::{Path, PathBuf};

use harvest_logging::harvest_info;
use harvester_core::{columns_for, flatten, Column, HarvestResult, Row};
use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook, XlsxError};

use crate::filename::workbook_filename;
use crate::persist::{write_file_atomic, PersistError};

pub const SHEET_NAME: &str = "Properties";
/// Longest text a spreadsheet cell accepts.
pub const MAX_CELL_CHARS: usize = 32_767;
/// Rows a worksheet holds, header included.
pub const MAX_SHEET_ROWS: usize = 1_048_576;
pub const MAX_SHEET_COLUMNS: usize = 16_384;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub row_count: usize,
    pub column_count: usize,
    pub output_path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("failed to build workbook for {path:?}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: XlsxError,
    },
    #[error("{rows} record(s) under {columns} column(s) do not fit one sheet of {path:?}")]
    TooLarge {
        path: PathBuf,
        rows: usize,
        columns: usize,
    },
    #[error("failed to write {path:?}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: PersistError,
    },
}

impl SinkError {
    /// Path the sink attempted to write.
    pub fn path(&self) -> &Path {
        match self {
            SinkError::Workbook { path, .. }
            | SinkError::TooLarge { path, .. }
            | SinkError::Persist { path, .. } => path,
        }
    }
}

/// Destination for flattened rows.
pub trait TabularSink {
    /// Writes `rows` under `columns` to `path`, replacing any existing file.
    fn write(&self, path: &Path, rows: &[Row], columns: &[Column]) -> Result<ExportSummary, SinkError>;
}

/// Single-sheet `.xlsx` workbook with a bold header row.
#[derive(Debug, Clone)]
pub struct WorkbookSink {
    sheet_name: String,
}

impl Default for WorkbookSink {
    fn default() -> Self {
        Self::new(SHEET_NAME)
    }
}

impl WorkbookSink {
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
        }
    }

    fn build(&self, path: &Path, rows: &[Row], columns: &[Column]) -> Result<Vec<u8>, SinkError> {
        let too_large = || SinkError::TooLarge {
            path: path.to_path_buf(),
            rows: rows.len(),
            columns: columns.len(),
        };
        let workbook_error = |source| SinkError::Workbook {
            path: path.to_path_buf(),
            source,
        };
        if rows.len() >= MAX_SHEET_ROWS || columns.len() > MAX_SHEET_COLUMNS {
            return Err(too_large());
        }

        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();
        {
            let sheet = workbook.add_worksheet();
            sheet.set_name(&self.sheet_name).map_err(workbook_error)?;
            for (row_index, cells) in sheet_cells(rows, columns).iter().enumerate() {
                let row = RowNum::try_from(row_index).map_err(|_| too_large())?;
                for (col_index, value) in cells.iter().enumerate() {
                    let col = ColNum::try_from(col_index).map_err(|_| too_large())?;
                    if row == 0 {
                        sheet
                            .write_string_with_format(row, col, value, &header)
                            .map_err(workbook_error)?;
                    } else if !value.is_empty() {
                        sheet.write_string(row, col, value).map_err(workbook_error)?;
                    }
                }
            }
        }
        workbook.save_to_buffer().map_err(workbook_error)
    }
}

impl TabularSink for WorkbookSink {
    fn write(&self, path: &Path, rows: &[Row], columns: &[Column]) -> Result<ExportSummary, SinkError> {
        let bytes = self.build(path, rows, columns)?;
        let output_path = write_file_atomic(path, &bytes).map_err(|source| SinkError::Persist {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(ExportSummary {
            row_count: rows.len(),
            column_count: columns.len(),
            output_path,
        })
    }
}

/// Header row followed by one row per record, each cell looked up by column
/// key. Missing keys become empty cells; overlong values are truncated.
pub fn sheet_cells(rows: &[Row], columns: &[Column]) -> Vec<Vec<String>> {
    let mut cells = Vec::with_capacity(rows.len() + 1);
    cells.push(columns.iter().map(|c| c.header.clone()).collect());
    for row in rows {
        cells.push(
            columns
                .iter()
                .map(|column| truncate_cell(row.get(&column.key).unwrap_or_default()))
                .collect(),
        );
    }
    cells
}

fn truncate_cell(value: &str) -> String {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((cut, _)) => value[..cut].to_string(),
        None => value.to_string(),
    }
}

/// Flattens `result` and writes it to `{output_dir}/{workbook name of the listing}`.
pub fn export_harvest(
    sink: &dyn TabularSink,
    result: &HarvestResult,
    output_dir: &Path,
) -> Result<ExportSummary, SinkError> {
    let rows: Vec<Row> = result.records.iter().map(flatten).collect();
    let columns = columns_for(&rows);
    let path = output_dir.join(workbook_filename(&result.source_url));
    let summary = sink.write(&path, &rows, &columns)?;
    harvest_info!(
        "Saved {} record(s) to {:?}",
        summary.row_count,
        summary.output_path
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_values_are_cut_at_cell_limit() {
        let long = "ñ".repeat(MAX_CELL_CHARS + 10);
        assert_eq!(truncate_cell(&long).chars().count(), MAX_CELL_CHARS);
        assert_eq!(truncate_cell("short"), "short");
    }
}
