mod file_config;

pub use file_config::{FileConfig, LlmConfig};

use crate::llm::{ApiKeySource, CompletionOptions, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub content_cache_age_sec: usize,
    pub llm_provider: LlmProviderKind,
    pub llm_model: Option<String>,
    pub llm_api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub content_cache_age_sec: usize,
    pub llm: LlmSettings,
}

/// Backend used to generate recommendations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LlmProviderKind {
    #[default]
    Gemini,
}

/// Settings for the LLM provider.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub provider: LlmProviderKind,
    pub base_url: String,
    pub model: String,
    pub api_key_source: ApiKeySource,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// None leaves the HTTP client's own timeout behavior in place.
    pub timeout_secs: Option<u64>,
}

impl LlmSettings {
    pub fn defaults_for(provider: LlmProviderKind) -> Self {
        let (base_url, model) = match provider {
            LlmProviderKind::Gemini => (DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL),
        };
        Self {
            provider,
            base_url: base_url.to_string(),
            model: model.to_string(),
            api_key_source: ApiKeySource::None,
            temperature: None,
            max_tokens: None,
            timeout_secs: None,
        }
    }

    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let content_cache_age_sec = file
            .content_cache_age_sec
            .unwrap_or(cli.content_cache_age_sec);

        let llm = resolve_llm_settings(cli, file.llm.unwrap_or_default())?;

        Ok(Self {
            db_dir,
            port,
            metrics_port,
            logging_level,
            content_cache_age_sec,
            llm,
        })
    }

    pub fn user_db_path(&self) -> PathBuf {
        self.db_dir.join("user.db")
    }
}

fn resolve_llm_settings(cli: &CliConfig, llm_file: LlmConfig) -> Result<LlmSettings> {
    let provider = match llm_file.provider.as_deref() {
        Some(name) => match LlmProviderKind::from_str(name, true) {
            Ok(kind) => kind,
            Err(_) => bail!(
                "Unknown llm provider {:?} (expected gemini)",
                name
            ),
        },
        None => cli.llm_provider,
    };

    if llm_file.api_key.is_some() && llm_file.api_key_command.is_some() {
        bail!("llm.api_key and llm.api_key_command are mutually exclusive");
    }

    let defaults = LlmSettings::defaults_for(provider);

    let api_key_source = match ApiKeySource::from_config(llm_file.api_key, llm_file.api_key_command)
    {
        ApiKeySource::None => ApiKeySource::from_config(cli.llm_api_key.clone(), None),
        source => source,
    };

    Ok(LlmSettings {
        provider,
        base_url: llm_file.base_url.unwrap_or(defaults.base_url),
        model: llm_file
            .model
            .or_else(|| cli.llm_model.clone())
            .unwrap_or(defaults.model),
        api_key_source,
        temperature: llm_file.temperature,
        max_tokens: llm_file.max_tokens,
        timeout_secs: llm_file.timeout_secs,
    })
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
