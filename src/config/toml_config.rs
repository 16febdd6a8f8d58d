use crate::core::ConfigProvider;
use crate::domain::model::{Delimiter, LeadType};
use crate::utils::error::{LeadError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range,
    validate_required_field, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_STORE_PATH: &str = "./leads.json";
pub const DEFAULT_OUTPUT_PATH: &str = "./output";
pub const DEFAULT_EXPORT_FILENAME: &str = "leads.csv";
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_DELAY_MS: u64 = 500;
const MAX_RETRY_ATTEMPTS: u32 = 10;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub repository: RepositoryConfig,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryKind {
    #[default]
    Json,
    Http,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryConfig {
    #[serde(default)]
    pub r#type: RepositoryKind,
    /// JSON 檔案儲存位置（type = "json"）
    pub path: Option<String>,
    /// REST 端點（type = "http"）
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_ms: Option<u64>,
    pub headers: Option<HashMap<String, String>>,
}

impl RepositoryConfig {
    pub fn store_path(&self) -> &str {
        self.path.as_deref().unwrap_or(DEFAULT_STORE_PATH)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }

    pub fn retry_attempts(&self) -> u32 {
        self.retry_attempts.unwrap_or(DEFAULT_RETRY_ATTEMPTS)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms.unwrap_or(DEFAULT_RETRY_DELAY_MS))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportConfig {
    pub default_lead_type: Option<LeadType>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    pub delimiter: Option<Delimiter>,
    pub output_path: Option<String>,
    pub filename: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LeadError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${LEADS_API_KEY})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LeadError::ConfigError {
            message: format!("invalid placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        match self.repository.r#type {
            RepositoryKind::Json => {
                validate_path("repository.path", self.repository.store_path())?;
            }
            RepositoryKind::Http => {
                let endpoint =
                    validate_required_field("repository.endpoint", &self.repository.endpoint)?;
                validate_url("repository.endpoint", endpoint)?;
            }
        }

        if let Some(timeout) = self.repository.timeout_seconds {
            validate_positive_number("repository.timeout_seconds", timeout, 1)?;
        }

        if let Some(attempts) = self.repository.retry_attempts {
            validate_range("repository.retry_attempts", attempts, 0, MAX_RETRY_ATTEMPTS)?;
        }

        validate_path("export.output_path", self.output_path())?;
        validate_non_empty_string("export.filename", self.export_filename())?;

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn default_lead_type(&self) -> LeadType {
        self.import.default_lead_type.unwrap_or_default()
    }

    fn export_delimiter(&self) -> Delimiter {
        self.export.delimiter.unwrap_or_default()
    }

    fn output_path(&self) -> &str {
        self.export
            .output_path
            .as_deref()
            .unwrap_or(DEFAULT_OUTPUT_PATH)
    }

    fn export_filename(&self) -> &str {
        self.export
            .filename
            .as_deref()
            .unwrap_or(DEFAULT_EXPORT_FILENAME)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
