use crate::config::RawConfig;
use crate::utils::error::{EtlError, Result};
use regex::Regex;
use std::path::Path;

impl RawConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(EtlError::config(format!(
                "configuration file ({}) must be a readable file",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            EtlError::config(format!(
                "failed to read configuration file ({}): {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content)?;

        toml::from_str(&processed_content)
            .map_err(|e| EtlError::config(format!("TOML parsing error: {}", e)))
    }
}

/// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保留原文
fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([^}]+)\}")
        .map_err(|e| EtlError::config(format!("invalid substitution pattern: {}", e)))?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.to_string())
}
