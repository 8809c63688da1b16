use crate::utils::error::{EtlError, Result};
use std::fs::{self, File};
use std::path::Path;

/// 檢查結果：即使失敗也帶著已經算出來的部分結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T> {
    pub value: T,
    pub problems: Vec<String>,
}

impl<T> Outcome<T> {
    pub fn ok(value: T) -> Self {
        Self {
            value,
            problems: Vec::new(),
        }
    }

    pub fn failed(value: T, problem: impl Into<String>) -> Self {
        Self {
            value,
            problems: vec![problem.into()],
        }
    }

    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn error(&self) -> Option<String> {
        if self.problems.is_empty() {
            None
        } else {
            Some(self.problems.join(", "))
        }
    }

    pub fn into_result<F>(self, to_error: F) -> Result<T>
    where
        F: FnOnce(Vec<String>) -> EtlError,
    {
        if self.problems.is_empty() {
            Ok(self.value)
        } else {
            Err(to_error(self.problems))
        }
    }
}

/// 單一欄位檢查，錯誤為可直接收集的問題描述
pub type Check = std::result::Result<(), String>;

pub fn validate_readable_dir(field_name: &str, path: &Path) -> Check {
    if path.is_dir() && fs::read_dir(path).is_ok() {
        Ok(())
    } else {
        Err(format!("{} is not a readable directory", field_name))
    }
}

pub fn validate_writable_dir(field_name: &str, path: &Path) -> Check {
    // 建立一個匿名暫存檔來確認寫入權限，檔案關閉後自動刪除
    if path.is_dir() && tempfile::tempfile_in(path).is_ok() {
        Ok(())
    } else {
        Err(format!("{} is not a writeable directory", field_name))
    }
}

pub fn validate_readable_file(field_name: &str, path: &Path) -> Check {
    if path.is_file() && File::open(path).is_ok() {
        Ok(())
    } else {
        Err(format!(
            "{} ({}) is not a readable file",
            field_name,
            path.display()
        ))
    }
}

pub fn validate_one_of(field_name: &str, value: &str, allowed: &[&str]) -> Check {
    if allowed.iter().any(|a| a.eq_ignore_ascii_case(value)) {
        Ok(())
    } else {
        Err(format!(
            "{} ({}) must be one of: {}",
            field_name,
            value,
            allowed.join(", ")
        ))
    }
}
