use crate::core::endpoints::DEFAULT_BASE_URL;
use crate::core::ergast::EngineSettings;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

pub const OUTPUT_FORMATS: [&str; 2] = ["csv", "json"];

static ENV_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var regex is valid"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub source: SourceConfig,
    pub extract: ExtractConfig,
    pub load: LoadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    pub timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
    pub retry_attempts: Option<u32>,
    pub retry_on_status: Option<Vec<u16>>,
    pub retry_delay_ms: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: None,
            user_agent: None,
            retry_attempts: None,
            retry_on_status: None,
            retry_delay_ms: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub concurrent_requests: Option<usize>,
    pub batch_delay_ms: Option<u64>,
    pub page_size: Option<usize>,
    pub page_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            output_path: "./output".to_string(),
            output_formats: vec!["json".to_string()],
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ERGAST_BASE_URL})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn base_url(&self) -> &str {
        &self.source.base_url
    }

    pub fn output_path(&self) -> &str {
        &self.load.output_path
    }

    pub fn concurrent_requests(&self) -> usize {
        self.extract
            .concurrent_requests
            .unwrap_or(EngineSettings::default().concurrency_limit)
    }
}

impl From<&TomlConfig> for EngineSettings {
    fn from(config: &TomlConfig) -> Self {
        let defaults = EngineSettings::default();
        let extract = &config.extract;
        EngineSettings {
            concurrency_limit: config.concurrent_requests(),
            batch_delay: extract
                .batch_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.batch_delay),
            page_size: extract.page_size.unwrap_or(defaults.page_size),
            page_delay: extract
                .page_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.page_delay),
        }
    }
}

impl ConfigProvider for TomlConfig {
    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("source.base_url", &self.source.base_url)?;

        if let Some(user_agent) = &self.source.user_agent {
            validation::validate_non_empty_string("source.user_agent", user_agent)?;
        }
        if let Some(timeout) = self.source.timeout_seconds {
            validation::validate_range("source.timeout_seconds", timeout, 1, 600)?;
        }
        if let Some(codes) = &self.source.retry_on_status {
            validation::validate_status_codes("source.retry_on_status", codes)?;
        }
        if let Some(attempts) = self.source.retry_attempts {
            validation::validate_range("source.retry_attempts", attempts, 0, 10)?;
        }

        validation::validate_positive_number(
            "extract.concurrent_requests",
            self.concurrent_requests(),
            1,
        )?;
        if let Some(page_size) = self.extract.page_size {
            validation::validate_range("extract.page_size", page_size, 1, 1000)?;
        }

        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_output_formats(
            "load.output_formats",
            &self.load.output_formats,
            &OUTPUT_FORMATS,
        )?;

        Ok(())
    }
}
