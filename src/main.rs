use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use moodwave_server::config::{AppConfig, CliConfig, FileConfig, LlmProviderKind};
use moodwave_server::llm::create_llm_provider;
use moodwave_server::server::{metrics, ServerConfig};
use moodwave_server::{run_server, Recommender, RequestsLoggingLevel, SqliteUserStore};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Its values override the flags below.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory holding the user database.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// The maximum age of cacheable responses in seconds.
    #[clap(long, default_value_t = 3600)]
    pub content_cache_age_sec: usize,

    /// Which language model backend generates recommendations.
    #[clap(long, default_value = "gemini")]
    pub llm_provider: LlmProviderKind,

    /// Model id, defaults to the provider's usual model.
    #[clap(long)]
    pub llm_model: Option<String>,

    /// API key for the provider.
    #[clap(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub llm_api_key: Option<String>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_dir: self.db_dir.clone(),
            port: self.port,
            metrics_port: self.metrics_port,
            logging_level: self.logging_level.clone(),
            content_cache_age_sec: self.content_cache_age_sec,
            llm_provider: self.llm_provider,
            llm_model: self.llm_model.clone(),
            llm_api_key: self.llm_api_key.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Could not initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!("Initializing metrics...");
    metrics::init_metrics();

    let provider = create_llm_provider(&config.llm)?;
    match provider.health_check().await {
        Ok(()) => info!(
            "LLM provider {} ({}) is reachable",
            provider.name(),
            provider.model()
        ),
        Err(err) => warn!(
            "LLM provider {} ({}) health check failed, continuing anyway: {}",
            provider.name(),
            provider.model(),
            err
        ),
    }
    let recommender = Recommender::new(provider, config.llm.completion_options());

    let user_db_path = config.user_db_path();
    info!("Opening user database at {:?}...", user_db_path);
    let user_store = SqliteUserStore::new(&user_db_path)?;

    let server_config = ServerConfig {
        requests_logging_level: config.logging_level,
        port: config.port,
        metrics_port: config.metrics_port,
        content_cache_age_sec: config.content_cache_age_sec,
    };
    run_server(server_config, Box::new(user_store), recommender).await
}
