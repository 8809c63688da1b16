use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 一列資料：依原始欄位順序排列的儲存格字串
pub type Row = Vec<String>;

/// 要輸出哪些欄位。三種寫法擇一，同時提供時以 indexes > letters > headers 為優先
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "columns")]
pub enum ColumnSpec {
    /// 從 0 開始的欄位索引
    Indexes(Vec<usize>),
    /// 試算表欄位字母，例如 "A"、"AB"
    Letters(Vec<String>),
    /// 標題列中的欄位名稱
    Headers(Vec<String>),
}

impl ColumnSpec {
    /// 依優先順序選出第一個非空清單
    pub fn from_lists(
        indexes: Option<Vec<usize>>,
        letters: Option<Vec<String>>,
        headers: Option<Vec<String>>,
    ) -> Option<Self> {
        indexes
            .filter(|list| !list.is_empty())
            .map(ColumnSpec::Indexes)
            .or_else(|| letters.filter(|list| !list.is_empty()).map(ColumnSpec::Letters))
            .or_else(|| headers.filter(|list| !list.is_empty()).map(ColumnSpec::Headers))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ColumnSpec::Indexes(_) => "column_indexes",
            ColumnSpec::Letters(_) => "column_letters",
            ColumnSpec::Headers(_) => "column_headers",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnSpec::Indexes(list) => list.len(),
            ColumnSpec::Letters(list) => list.len(),
            ColumnSpec::Headers(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
pub struct DataSet {
    pub rows: Vec<Row>,
}

impl DataSet {
    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(|row| row.as_slice())
    }
}

/// 投影完成、等待寫出的資料
#[derive(Debug, Clone)]
pub struct ProjectedData {
    pub rows_read: usize,
    pub indexes: Vec<usize>,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub rows_read: usize,
    pub rows_written: usize,
    pub columns: Vec<usize>,
    pub output_file_path: PathBuf,
}
