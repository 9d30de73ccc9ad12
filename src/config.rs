use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ReviewAppError, Result};

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_PROMPTS_PATH: &str = "prompts/review.toml";

/// How a pull request webhook is turned into review requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewMode {
    /// Every changed file's patch is concatenated into a single review request.
    #[default]
    Combined,
    /// A PR summary plus one review per changed file; removed and patch-less files are skipped.
    PerFile,
}

impl FromStr for ReviewMode {
    type Err = ReviewAppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "combined" => Ok(Self::Combined),
            "per_file" | "per-file" | "perfile" => Ok(Self::PerFile),
            other => Err(ReviewAppError::Config(format!(
                "Unknown REVIEW_MODE '{}': expected 'combined' or 'per_file'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ReviewAppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ReviewAppError::Config(format!(
                "Unknown LOG_FORMAT '{}': expected 'pretty' or 'json'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub github_token: String,
    pub webhook_secret: String,
    pub github_api_url: Option<String>,
    pub github_timeout_secs: u64,
    /// `None` when no LLM API key is configured; review features are then disabled.
    pub llm: Option<LlmConfig>,
    pub server_host: String,
    pub server_port: u16,
    pub review_mode: ReviewMode,
    pub post_review_comment: bool,
    pub prompts_path: PathBuf,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Loads configuration from an optional config file overlaid with the process environment.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = config_file {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(config::Environment::default())
            .build()?;

        Self::from_settings(&settings)
    }

    pub fn from_settings(settings: &config::Config) -> Result<Self> {
        let github_token = required(settings, "github_token")?;
        let webhook_secret = required(settings, "webhook_secret")?;

        let llm = match optional(settings, "openai_api_key")? {
            Some(api_key) => Some(LlmConfig {
                api_key,
                model: optional(settings, "openai_model")?
                    .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                base_url: optional(settings, "openai_base_url")?
                    .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
                timeout_secs: parsed(settings, "llm_timeout_secs")?.unwrap_or(120),
            }),
            None => None,
        };

        Ok(AppConfig {
            github_token,
            webhook_secret,
            github_api_url: optional(settings, "github_api_url")?,
            github_timeout_secs: parsed(settings, "github_timeout_secs")?.unwrap_or(30),
            llm,
            server_host: optional(settings, "host")?.unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port: parsed(settings, "port")?.unwrap_or(3000),
            review_mode: parsed(settings, "review_mode")?.unwrap_or_default(),
            post_review_comment: parsed(settings, "post_review_comment")?.unwrap_or(false),
            prompts_path: optional(settings, "prompts_path")?
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PROMPTS_PATH)),
            log_format: parsed(settings, "log_format")?.unwrap_or_default(),
        })
    }

    pub fn github_timeout(&self) -> Duration {
        Duration::from_secs(self.github_timeout_secs)
    }

    pub fn review_enabled(&self) -> bool {
        self.llm.is_some()
    }
}

fn optional(settings: &config::Config, key: &str) -> Result<Option<String>> {
    match settings.get_string(key) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(config::ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn required(settings: &config::Config, key: &str) -> Result<String> {
    optional(settings, key)?.ok_or_else(|| {
        ReviewAppError::Config(format!(
            "Missing required setting {}",
            key.to_ascii_uppercase()
        ))
    })
}

fn parsed<T>(settings: &config::Config, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    optional(settings, key)?
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| {
                ReviewAppError::Config(format!(
                    "Invalid value for {}: {}",
                    key.to_ascii_uppercase(),
                    e
                ))
            })
        })
        .transpose()
}
