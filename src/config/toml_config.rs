use crate::adapters::vercel::DEFAULT_API_BASE;
use crate::core::page::PageShell;
use crate::utils::error::{PublishError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_required_field,
    validate_secret, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_STORE_PATH: &str = "./vibe-publish.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub hosting: HostingConfig,
    #[serde(default)]
    pub store: StoreConfig,
    pub generator: Option<GeneratorConfig>,
    #[serde(default)]
    pub identities: Vec<IdentityConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub page: PageShell,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostingConfig {
    pub provider: Option<String>,
    pub api_base: Option<String>,
    pub token: Option<String>,
    pub team_id: Option<String>,
    pub request_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    File,
    Memory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub system_prompt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub token: String,
    pub user_id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    #[serde(default)]
    pub format: LogFormat,
}

impl HostingConfig {
    pub fn api_base(&self) -> &str {
        self.api_base.as_deref().unwrap_or(DEFAULT_API_BASE)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_seconds.map(Duration::from_secs)
    }
}

impl StoreConfig {
    pub fn path(&self) -> &str {
        self.path.as_deref().unwrap_or(DEFAULT_STORE_PATH)
    }
}

impl GeneratorConfig {
    pub fn temperature(&self) -> f32 {
        self.temperature.unwrap_or(0.7)
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(4000)
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| PublishError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PublishError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${VERCEL_TOKEN})；不存在的變數保持原樣，交由驗證階段回報
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| PublishError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        if let Some(provider) = &self.hosting.provider {
            if provider != "vercel" {
                return Err(PublishError::InvalidConfigValueError {
                    field: "hosting.provider".to_string(),
                    value: provider.clone(),
                    reason: "Unsupported provider. Valid providers: vercel".to_string(),
                });
            }
        }
        validate_url("hosting.api_base", self.hosting.api_base())?;
        // 沒有 token 就無法呼叫任何遠端 API，屬於致命錯誤
        validate_secret(
            "hosting.token",
            self.hosting.token.as_deref().unwrap_or_default(),
        )?;
        if let Some(timeout) = self.hosting.request_timeout_seconds {
            validate_range("hosting.request_timeout_seconds", timeout, 1, 600)?;
        }

        if self.store.backend == StoreBackend::File {
            validate_path("store.path", self.store.path())?;
        }

        if let Some(generator) = &self.generator {
            validate_url("generator.endpoint", &generator.endpoint)?;
            validate_non_empty_string("generator.model", &generator.model)?;
            let api_key = validate_required_field("generator.api_key", &generator.api_key)?;
            validate_secret("generator.api_key", api_key)?;
            validate_range("generator.temperature", generator.temperature(), 0.0, 2.0)?;
            validate_range("generator.max_tokens", generator.max_tokens(), 1, 32_768)?;
        }

        for (index, identity) in self.identities.iter().enumerate() {
            validate_secret(&format!("identities[{}].token", index), &identity.token)?;
            validate_non_empty_string(&format!("identities[{}].user_id", index), &identity.user_id)?;
        }

        if let Some(level) = &self.logging.level {
            let valid_levels = ["trace", "debug", "info", "warn", "error"];
            if !valid_levels.contains(&level.as_str()) {
                return Err(PublishError::InvalidConfigValueError {
                    field: "logging.level".to_string(),
                    value: level.clone(),
                    reason: format!("Valid levels: {}", valid_levels.join(", ")),
                });
            }
        }

        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
