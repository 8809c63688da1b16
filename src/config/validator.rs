//! 設定檢查：逐項累積所有問題，不在第一個錯誤就停止。

use crate::config::{DataColumnsSection, DataFilesSection, InputFormat, RawConfig, RunConfig};
use crate::domain::model::ColumnSpec;
use crate::utils::encoding::{lookup_encoding, DecodeErrorPolicy, DEFAULT_CHARACTER_ENCODING};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_one_of, validate_readable_dir, validate_readable_file, validate_writable_dir, Check,
    Outcome,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// 正規化後的設定。驗證失敗時只有能推導出的欄位有值
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedConfig {
    pub input_file_path: Option<PathBuf>,
    pub input_format: Option<InputFormat>,
    pub input_sheet_name: Option<String>,
    pub output_file_path: Option<PathBuf>,
    pub character_encoding: Option<String>,
    pub character_encoding_errors: Option<DecodeErrorPolicy>,
    pub columns: Option<ColumnSpec>,
}

impl NormalizedConfig {
    pub fn into_run_config(self) -> Result<RunConfig> {
        let missing = |field: &str| EtlError::config(format!("{} not resolved", field));

        Ok(RunConfig {
            input_file_path: self
                .input_file_path
                .ok_or_else(|| missing("input_file_path"))?,
            input_format: self.input_format.ok_or_else(|| missing("input_data_type"))?,
            input_sheet_name: self.input_sheet_name,
            output_file_path: self
                .output_file_path
                .ok_or_else(|| missing("output_file_path"))?,
            character_encoding: self
                .character_encoding
                .unwrap_or_else(|| DEFAULT_CHARACTER_ENCODING.to_string()),
            character_encoding_errors: self.character_encoding_errors.unwrap_or_default(),
            columns: self.columns.ok_or_else(|| missing("data_columns"))?,
        })
    }
}

struct Problems(Vec<String>);

impl Problems {
    fn push(&mut self, problem: impl Into<String>) {
        self.0.push(problem.into());
    }

    fn check(&mut self, check: Check) -> bool {
        match check {
            Ok(()) => true,
            Err(problem) => {
                self.push(problem);
                false
            }
        }
    }

    /// 必填欄位：不存在或空白時記錄問題
    fn required<'a>(&mut self, field: &str, value: &'a Option<String>) -> Option<&'a str> {
        match value.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => Some(v),
            _ => {
                self.push(format!("{} not defined", field));
                None
            }
        }
    }
}

pub fn validate(raw: &RawConfig) -> Outcome<NormalizedConfig> {
    let mut normalized = NormalizedConfig::default();
    let mut problems = Problems(Vec::new());

    match &raw.data_files {
        Some(files) => validate_data_files(files, &mut normalized, &mut problems),
        None => problems.push("data_files section not defined"),
    }

    match &raw.data_columns {
        Some(columns) => validate_data_columns(columns, &mut normalized, &mut problems),
        None => problems.push("data_columns section not defined"),
    }

    Outcome {
        value: normalized,
        problems: problems.0,
    }
}

/// 驗證並轉成 `RunConfig`，失敗時回傳含全部問題的 `ConfigError`
pub fn build_run_config(raw: &RawConfig) -> Result<RunConfig> {
    validate(raw)
        .into_result(|problems| EtlError::ConfigError { problems })?
        .into_run_config()
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn validate_data_files(
    files: &DataFilesSection,
    normalized: &mut NormalizedConfig,
    problems: &mut Problems,
) {
    // 輸入檔
    let input_path = problems.required("data_files.input_path", &files.input_path);
    if let Some(path) = input_path {
        problems.check(validate_readable_dir("data_files.input_path", Path::new(path)));
    }

    let input_file_name = problems.required("data_files.input_file_name", &files.input_file_name);

    let input_file_extension =
        problems.required("data_files.input_file_extension", &files.input_file_extension);
    if let Some(extension) = input_file_extension {
        if problems.check(validate_one_of(
            "data_files.input_file_extension",
            extension,
            &InputFormat::EXTENSIONS,
        )) {
            normalized.input_format = extension.parse().ok();
        }
    }

    if let (Some(path), Some(name), Some(extension)) =
        (input_path, input_file_name, input_file_extension)
    {
        let input_file_path = absolute(Path::new(path)).join(format!("{}.{}", name, extension));
        if problems.check(validate_readable_file("input_file_path", &input_file_path)) {
            normalized.input_file_path = Some(input_file_path);
        }
    }

    match files.input_sheet_name.as_deref().map(str::trim) {
        Some(sheet) if !sheet.is_empty() => normalized.input_sheet_name = Some(sheet.to_string()),
        _ if normalized.input_format == Some(InputFormat::Xlsx) => problems.push(
            "data_files.input_sheet_name must be defined when data_files.input_file_extension is xlsx",
        ),
        _ => {}
    }

    // 輸出檔，可以尚未存在
    let output_path = problems.required("data_files.output_path", &files.output_path);
    if let Some(path) = output_path {
        problems.check(validate_writable_dir("data_files.output_path", Path::new(path)));
    }

    let output_file_name =
        problems.required("data_files.output_file_name", &files.output_file_name);
    let output_file_extension =
        problems.required("data_files.output_file_extension", &files.output_file_extension);

    if let (Some(path), Some(name), Some(extension)) =
        (output_path, output_file_name, output_file_extension)
    {
        normalized.output_file_path =
            Some(absolute(Path::new(path)).join(format!("{}.{}", name, extension)));
    }

    // 編碼設定，未提供時使用預設值
    let encoding_label = files
        .character_encoding
        .as_deref()
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .unwrap_or(DEFAULT_CHARACTER_ENCODING);
    match lookup_encoding(encoding_label) {
        Some(encoding) => normalized.character_encoding = Some(encoding.name().to_string()),
        None => problems.push(format!(
            "data_files.character_encoding ({}) is not a known character encoding",
            encoding_label
        )),
    }

    match files.character_encoding_errors.as_deref().map(str::trim) {
        Some(policy) if !policy.is_empty() => match policy.parse::<DecodeErrorPolicy>() {
            Ok(policy) => normalized.character_encoding_errors = Some(policy),
            Err(reason) => problems.push(format!("data_files.character_encoding_errors: {}", reason)),
        },
        _ => normalized.character_encoding_errors = Some(DecodeErrorPolicy::default()),
    }
}

fn validate_data_columns(
    columns: &DataColumnsSection,
    normalized: &mut NormalizedConfig,
    problems: &mut Problems,
) {
    let headers = columns.column_headers.as_ref().map(|list| list.entries());
    let letters = columns.column_letters.as_ref().map(|list| list.entries());

    let indexes = columns.column_indexes.as_ref().map(|list| {
        list.entries()
            .into_iter()
            .filter_map(|entry| match entry.parse::<usize>() {
                Ok(index) => Some(index),
                Err(_) => {
                    problems.push(format!(
                        "data_columns.column_indexes value '{}' is not a non-negative integer",
                        entry
                    ));
                    None
                }
            })
            .collect::<Vec<_>>()
    });

    let populated = [
        indexes.as_ref().is_some_and(|l| !l.is_empty()),
        letters.as_ref().is_some_and(|l| !l.is_empty()),
        headers.as_ref().is_some_and(|l| !l.is_empty()),
    ]
    .iter()
    .filter(|p| **p)
    .count();

    match ColumnSpec::from_lists(indexes, letters, headers) {
        Some(spec) => {
            if populated > 1 {
                tracing::warn!(
                    "More than one column list defined in data_columns, using {}",
                    spec.kind()
                );
            }
            normalized.columns = Some(spec);
        }
        None => problems.push("one of column headers, letters, or indexes must be defined"),
    }
}
