pub mod etl;
pub mod pipeline;
pub mod resolver;

pub use crate::domain::model::{ColumnSpec, DataSet, ProjectedData, Row, RunSummary};
pub use crate::domain::ports::{Pipeline, RowSink, RowSource};
pub use crate::utils::error::Result;
