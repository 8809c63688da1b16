use crate::domain::model::Row;
use crate::domain::ports::RowSource;
use crate::utils::error::{EtlError, Result};
use calamine::{open_workbook, Data, DataType, Reader, Xlsx};
use chrono::{NaiveDateTime, Timelike};
use std::path::{Path, PathBuf};

/// 讀取 XLSX 指定工作表的快取值（不讀公式）
#[derive(Debug, Clone)]
pub struct XlsxSource {
    path: PathBuf,
    sheet_name: String,
}

impl XlsxSource {
    pub fn new(path: impl Into<PathBuf>, sheet_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sheet_name: sheet_name.into(),
        }
    }
}

impl RowSource for XlsxSource {
    fn read_rows(&self) -> Result<Vec<Row>> {
        let mut workbook: Xlsx<_> =
            open_workbook(&self.path).map_err(|e| EtlError::read(&self.path, e))?;

        let sheet_names = workbook.sheet_names();
        if !sheet_names.iter().any(|name| name == &self.sheet_name) {
            return Err(EtlError::read(
                &self.path,
                format!(
                    "no sheet named ({}) is contained in the workbook, available sheets: {:?}",
                    self.sheet_name, sheet_names
                ),
            ));
        }

        let range = workbook
            .worksheet_range(&self.sheet_name)
            .map_err(|e| EtlError::read(&self.path, e))?;

        // 使用範圍可能不是從 A1 開始，補上前面的空列與空欄，讓第一列與欄位字母對齊工作表
        let (leading_rows, leading_columns) = range
            .start()
            .map(|(row, col)| (row as usize, col as usize))
            .unwrap_or((0, 0));
        let width = leading_columns + range.width();

        let mut rows: Vec<Row> = vec![vec![String::new(); width]; leading_rows];
        rows.extend(range.rows().map(|cells| {
            let mut row = vec![String::new(); leading_columns];
            row.extend(cells.iter().map(cell_to_string));
            row
        }));

        tracing::debug!(
            "Read {} rows from sheet '{}' of {}",
            rows.len(),
            self.sheet_name,
            self.path.display()
        );
        Ok(rows)
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_float(*f),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Data::DateTime(_) => cell
            .as_datetime()
            .map(format_datetime)
            .unwrap_or_else(|| cell.to_string()),
        Data::Error(e) => e.to_string(),
    }
}

/// 整數值的浮點數不輸出小數點
fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn format_datetime(value: NaiveDateTime) -> String {
    if value.time().num_seconds_from_midnight() == 0 && value.time().nanosecond() == 0 {
        value.format("%Y-%m-%d").to_string()
    } else {
        value.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
