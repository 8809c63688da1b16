use crate::core::resolver;
use crate::domain::model::{ColumnSpec, DataSet, ProjectedData, Row, RunSummary};
use crate::domain::ports::{Pipeline, RowSink, RowSource};
use crate::utils::error::{EtlError, Result};

/// 讀入全部資料、依欄位設定挑選並重排欄位、寫出
pub struct ShufflePipeline<S: RowSource, K: RowSink> {
    source: S,
    sink: K,
    columns: ColumnSpec,
}

impl<S: RowSource, K: RowSink> ShufflePipeline<S, K> {
    pub fn new(source: S, sink: K, columns: ColumnSpec) -> Self {
        Self {
            source,
            sink,
            columns,
        }
    }
}

/// 依索引清單投影每一列；列太短時回報第幾列（從 1 起算）
pub fn project_rows(rows: &[Row], indexes: &[usize]) -> Result<Vec<Row>> {
    rows.iter()
        .enumerate()
        .map(|(line, row)| {
            indexes
                .iter()
                .map(|&index| {
                    row.get(index)
                        .cloned()
                        .ok_or_else(|| EtlError::OutOfBoundsError {
                            row: line + 1,
                            index,
                            width: row.len(),
                        })
                })
                .collect::<Result<Row>>()
        })
        .collect()
}

impl<S: RowSource, K: RowSink> Pipeline for ShufflePipeline<S, K> {
    fn extract(&self) -> Result<DataSet> {
        tracing::debug!("Reading input rows from {}", self.source.path().display());
        let rows = self.source.read_rows()?;

        if rows.is_empty() {
            return Err(EtlError::EmptyDataError {
                path: self.source.path().to_path_buf(),
            });
        }

        Ok(DataSet { rows })
    }

    fn transform(&self, data: DataSet) -> Result<ProjectedData> {
        let outcome = resolver::resolve(Some(&self.columns), data.header());
        if let Some(message) = outcome.error() {
            return Err(EtlError::ResolutionError { message });
        }
        let indexes = outcome.value;

        tracing::debug!(
            "Resolved {} {} to column indexes {:?}",
            self.columns.len(),
            self.columns.kind(),
            indexes
        );

        let rows = project_rows(&data.rows, &indexes).inspect_err(|e| {
            if let EtlError::OutOfBoundsError { index, .. } = e {
                tracing::debug!(
                    "Column index {} (column {}) is past the end of a row",
                    index,
                    resolver::index_to_column_letter(*index)
                );
            }
        })?;

        Ok(ProjectedData {
            rows_read: data.rows.len(),
            indexes,
            rows,
        })
    }

    fn load(&self, result: ProjectedData) -> Result<RunSummary> {
        self.sink.write_rows(&result.rows)?;

        Ok(RunSummary {
            rows_read: result.rows_read,
            rows_written: result.rows.len(),
            columns: result.indexes,
            output_file_path: self.sink.path().to_path_buf(),
        })
    }
}
