#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;
pub mod validator;

use crate::domain::model::ColumnSpec;
use crate::utils::encoding::{DecodeErrorPolicy, TextCodec};
use crate::utils::error::{EtlError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// 設定檔原始內容，所有欄位皆為可選，交由 validator 檢查
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawConfig {
    pub data_files: Option<DataFilesSection>,
    pub data_columns: Option<DataColumnsSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataFilesSection {
    pub input_path: Option<String>,
    pub input_file_name: Option<String>,
    pub input_file_extension: Option<String>,
    pub input_sheet_name: Option<String>,
    pub output_path: Option<String>,
    pub output_file_name: Option<String>,
    pub output_file_extension: Option<String>,
    pub character_encoding: Option<String>,
    pub character_encoding_errors: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataColumnsSection {
    pub column_headers: Option<ColumnList>,
    pub column_letters: Option<ColumnList>,
    pub column_indexes: Option<ColumnList>,
}

/// 欄位清單可以寫成多行字串（每行一個）或 TOML 陣列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnList {
    Lines(String),
    Items(Vec<ListItem>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListItem {
    Integer(i64),
    Text(String),
}

impl ColumnList {
    /// 去除前後空白並略過空行
    pub fn entries(&self) -> Vec<String> {
        match self {
            ColumnList::Lines(text) => text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            ColumnList::Items(items) => items
                .iter()
                .map(|item| match item {
                    ListItem::Integer(n) => n.to_string(),
                    ListItem::Text(s) => s.trim().to_string(),
                })
                .filter(|entry| !entry.is_empty())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    Csv,
    Xlsx,
}

impl InputFormat {
    pub const EXTENSIONS: [&'static str; 2] = ["csv", "xlsx"];
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormat::Csv => f.write_str("csv"),
            InputFormat::Xlsx => f.write_str("xlsx"),
        }
    }
}

impl FromStr for InputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(InputFormat::Csv),
            "xlsx" => Ok(InputFormat::Xlsx),
            other => Err(format!(
                "unknown input data type ({}), only recognized types are ({})",
                other,
                Self::EXTENSIONS.join(", ")
            )),
        }
    }
}

/// 驗證後的設定，建立後不再變動
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunConfig {
    pub input_file_path: PathBuf,
    pub input_format: InputFormat,
    pub input_sheet_name: Option<String>,
    pub output_file_path: PathBuf,
    pub character_encoding: String,
    pub character_encoding_errors: DecodeErrorPolicy,
    pub columns: ColumnSpec,
}

impl RunConfig {
    pub fn codec(&self) -> Result<TextCodec> {
        TextCodec::for_label(&self.character_encoding, self.character_encoding_errors).ok_or_else(
            || {
                EtlError::config(format!(
                    "data_files.character_encoding ({}) is not a known character encoding",
                    self.character_encoding
                ))
            },
        )
    }
}
