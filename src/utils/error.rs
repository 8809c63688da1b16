use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("one or more invalid configuration parameters identified: {}", problems.join(", "))]
    ConfigError { problems: Vec<String> },

    #[error("failed to read lines from input data file ({}): {message}", path.display())]
    ReadError { path: PathBuf, message: String },

    #[error("failed to read any data rows from input data file ({})", path.display())]
    EmptyDataError { path: PathBuf },

    #[error("failed to translate data_columns to data index numbers: {message}")]
    ResolutionError { message: String },

    #[error("data row {row} has {width} columns, column index {index} is out of bounds")]
    OutOfBoundsError { row: usize, index: usize, width: usize },

    #[error("failed to write lines to output data file ({}): {message}", path.display())]
    WriteError { path: PathBuf, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Processing,
    Output,
}

impl EtlError {
    pub fn config(problem: impl Into<String>) -> Self {
        EtlError::ConfigError {
            problems: vec![problem.into()],
        }
    }

    pub fn read(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        EtlError::ReadError {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn write(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        EtlError::WriteError {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ConfigError { .. } => ErrorCategory::Configuration,
            EtlError::ReadError { .. } | EtlError::EmptyDataError { .. } => ErrorCategory::Input,
            EtlError::ResolutionError { .. } | EtlError::OutOfBoundsError { .. } => {
                ErrorCategory::Processing
            }
            EtlError::WriteError { .. } => ErrorCategory::Output,
        }
    }

    /// 給操作者看的簡短訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::ConfigError { problems } => format!(
                "The configuration has {} problem(s): {}",
                problems.len(),
                problems.join("; ")
            ),
            EtlError::ReadError { path, .. } => {
                format!("Could not read the input file {}: {}", path.display(), self)
            }
            EtlError::EmptyDataError { path } => {
                format!("The input file {} contains no rows", path.display())
            }
            EtlError::ResolutionError { message } => {
                format!("The requested columns could not be located: {}", message)
            }
            EtlError::OutOfBoundsError { row, index, width } => format!(
                "Row {} only has {} column(s) but column index {} was requested",
                row, width, index
            ),
            EtlError::WriteError { path, .. } => {
                format!("Could not write the output file {}: {}", path.display(), self)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::ConfigError { .. } => {
                "Fix the listed [data_files]/[data_columns] entries in the configuration file"
            }
            EtlError::ReadError { .. } => {
                "Check the input file exists, is not open elsewhere, and matches the configured encoding and sheet name"
            }
            EtlError::EmptyDataError { .. } => "Point data_files at a file that contains at least a header row",
            EtlError::ResolutionError { .. } => {
                "Compare data_columns against the header row of the input file"
            }
            EtlError::OutOfBoundsError { .. } => {
                "Remove the out-of-range column from data_columns or repair the short row in the input"
            }
            EtlError::WriteError { .. } => {
                "Check the output directory is writable and has free space"
            }
        }
    }

    /// CLI 退出碼
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Configuration => 2,
            ErrorCategory::Input | ErrorCategory::Output => 3,
            ErrorCategory::Processing => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
