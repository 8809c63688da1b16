use crate::domain::model::{DataSet, ProjectedData, Row, RunSummary};
use crate::utils::error::Result;
use std::path::Path;

/// 讀入整份資料的來源（CSV、XLSX）
pub trait RowSource {
    fn read_rows(&self) -> Result<Vec<Row>>;
    fn path(&self) -> &Path;
}

impl<T: RowSource + ?Sized> RowSource for Box<T> {
    fn read_rows(&self) -> Result<Vec<Row>> {
        (**self).read_rows()
    }

    fn path(&self) -> &Path {
        (**self).path()
    }
}

/// 寫出投影結果的目的地
pub trait RowSink {
    fn write_rows(&self, rows: &[Row]) -> Result<()>;
    fn path(&self) -> &Path;
}

pub trait Pipeline {
    fn extract(&self) -> Result<DataSet>;
    fn transform(&self, data: DataSet) -> Result<ProjectedData>;
    fn load(&self, result: ProjectedData) -> Result<RunSummary>;
}
