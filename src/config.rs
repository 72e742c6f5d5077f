//! Configuration loading and management for pagebrief.
//!
//! Loads settings from `config/config.json`. Secrets never live in this file;
//! they come from the environment (see [`Secrets`]).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Location searched in the working directory when no path is given
pub const DEFAULT_CONFIG_PATH: &str = "config/config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not find config file: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Invalid(#[from] serde_json::Error),
    #[error("config validation failed: {0}")]
    Validation(String),
}

/// Web scraper configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Timeout for HTTP requests in seconds
    #[serde(default = "default_scraper_timeout")]
    pub timeout: u64,
}

impl ScraperConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            timeout: default_scraper_timeout(),
        }
    }
}

/// Local Ollama runner, invoked as `command args... model`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(rename = "enable", alias = "enabled", default)]
    pub enabled: bool,
    #[serde(default = "default_ollama_model")]
    pub model: String,
    #[serde(default = "default_ollama_command")]
    pub command: String,
    #[serde(default = "default_ollama_args")]
    pub args: Vec<String>,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: default_ollama_model(),
            command: default_ollama_command(),
            args: default_ollama_args(),
        }
    }
}

/// HuggingFace hosted inference API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HuggingFaceConfig {
    #[serde(rename = "enable", alias = "enabled", default)]
    pub enabled: bool,
    #[serde(default = "default_huggingface_model")]
    pub model: String,
    #[serde(default = "default_huggingface_base_url")]
    pub base_url: String,
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: default_huggingface_model(),
            base_url: default_huggingface_base_url(),
        }
    }
}

/// OpenRouter chat-completion API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenRouterConfig {
    #[serde(rename = "enable", alias = "enabled", default)]
    pub enabled: bool,
    #[serde(default = "default_openrouter_model")]
    pub model: String,
    /// Full chat-completions endpoint
    #[serde(default = "default_openrouter_base_url")]
    pub base_url: String,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: default_openrouter_model(),
            base_url: default_openrouter_base_url(),
        }
    }
}

/// LLM provider configuration. At most one provider is used; see
/// [`crate::selector::select`] for the priority order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ollama: Option<OllamaConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub huggingface: Option<HuggingFaceConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openrouter: Option<OpenRouterConfig>,
    /// Upper bound for a single provider call, in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout: u64,
}

impl LlmsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl Default for LlmsConfig {
    fn default() -> Self {
        Self {
            ollama: None,
            huggingface: None,
            openrouter: None,
            timeout: default_llm_timeout(),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub web_scraper_config: ScraperConfig,
    pub llms_config: LlmsConfig,
    /// Prompt name to prompt file path
    pub prompt_files: BTreeMap<String, PathBuf>,
}

impl Config {
    /// Load configuration from `explicit` if given, otherwise from the
    /// first standard location that exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_from(&Self::resolve_path(explicit))
    }

    /// The file [`load`](Self::load) reads: `explicit` if given, otherwise
    /// the first existing standard location
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        match explicit {
            Some(path) => path.to_path_buf(),
            None => Self::find_config_file(),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Find the config file in standard locations
    fn find_config_file() -> PathBuf {
        let local_config = PathBuf::from(DEFAULT_CONFIG_PATH);
        if local_config.exists() {
            return local_config;
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config").join("pagebrief").join("config.json");
            if home_config.exists() {
                return home_config;
            }
        }

        // Default to local path (will error on load)
        local_config
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.web_scraper_config.timeout == 0 {
            return Err(ConfigError::Validation(
                "web_scraper_config.timeout must be greater than zero".to_string(),
            ));
        }
        if self.llms_config.timeout == 0 {
            return Err(ConfigError::Validation(
                "llms_config.timeout must be greater than zero".to_string(),
            ));
        }

        if let Some(ollama) = &self.llms_config.ollama {
            require_non_empty("ollama.model", &ollama.model)?;
            require_non_empty("ollama.command", &ollama.command)?;
        }
        if let Some(hf) = &self.llms_config.huggingface {
            require_non_empty("huggingface.model", &hf.model)?;
            require_http_url("huggingface.base_url", &hf.base_url)?;
        }
        if let Some(or) = &self.llms_config.openrouter {
            require_non_empty("openrouter.model", &or.model)?;
            require_http_url("openrouter.base_url", &or.base_url)?;
        }

        Ok(())
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

fn require_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(value)
        .map_err(|e| ConfigError::Validation(format!("{field} is not a valid URL: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Validation(format!(
            "{field} must use http or https, got {other}"
        ))),
    }
}

/// API keys for hosted providers, read once from the environment and handed
/// to adapter constructors.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    pub huggingface_api_key: Option<String>,
    pub openrouter_api_key: Option<String>,
}

impl Secrets {
    pub const HUGGINGFACE_API_KEY: &'static str = "HUGGINGFACE_API_KEY";
    pub const OPENROUTER_API_KEY: &'static str = "OPENROUTER_API_KEY";

    pub fn from_env() -> Self {
        Self {
            huggingface_api_key: non_empty_var(Self::HUGGINGFACE_API_KEY),
            openrouter_api_key: non_empty_var(Self::OPENROUTER_API_KEY),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn default_scraper_timeout() -> u64 {
    10
}

fn default_llm_timeout() -> u64 {
    120
}

fn default_ollama_model() -> String {
    "mistral".to_string()
}

fn default_ollama_command() -> String {
    "ollama".to_string()
}

fn default_ollama_args() -> Vec<String> {
    vec!["run".to_string()]
}

fn default_huggingface_model() -> String {
    "HuggingFaceH4/zephyr-7b-beta".to_string()
}

fn default_huggingface_base_url() -> String {
    "https://api-inference.huggingface.co/models".to_string()
}

fn default_openrouter_model() -> String {
    "anthropic/claude-3-haiku".to_string()
}

fn default_openrouter_base_url() -> String {
    "https://openrouter.ai/api/v1/chat/completions".to_string()
}
