use std::env;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration shared by the HTTP server and the ingestion CLI.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Meilisearch instance.
    pub meili_url: String,
    /// Optional master key sent as a bearer token.
    pub meili_master_key: Option<String>,
    /// Uid of the index holding product records.
    pub meili_index: String,
    /// Per-request timeout applied to Meilisearch calls.
    pub meili_timeout: Duration,
    /// HTTP listen port.
    pub server_port: u16,
    /// Maximum number of documents submitted per batch.
    pub ingest_batch_size: usize,
    /// Pause inserted between successive batch submissions.
    pub ingest_batch_delay: Duration,
    /// Interval between task status queries.
    pub task_poll_interval: Duration,
    /// Upper bound on how long ingestion waits for indexing tasks.
    pub task_poll_timeout: Duration,
}

const DEFAULT_MEILI_URL: &str = "http://localhost:7700";
const DEFAULT_INDEX: &str = "sku";
const DEFAULT_PORT: u16 = 8080;

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            meili_url: load_env_optional("MEILI_URL").unwrap_or_else(|| DEFAULT_MEILI_URL.into()),
            meili_master_key: load_env_optional("MASTER_KEY"),
            meili_index: load_env_optional("MEILI_INDEX").unwrap_or_else(|| DEFAULT_INDEX.into()),
            meili_timeout: Duration::from_secs(parse_env_or("MEILI_TIMEOUT_SECS", 30)?),
            server_port: parse_env_or("PORT", DEFAULT_PORT)?,
            ingest_batch_size: parse_env_or("INGEST_BATCH_SIZE", 1000)?,
            ingest_batch_delay: Duration::from_millis(parse_env_or("INGEST_BATCH_DELAY_MS", 100)?),
            task_poll_interval: Duration::from_millis(parse_env_or("TASK_POLL_INTERVAL_MS", 500)?),
            task_poll_timeout: Duration::from_secs(parse_env_or("TASK_POLL_TIMEOUT_SECS", 300)?),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meili_url: DEFAULT_MEILI_URL.into(),
            meili_master_key: None,
            meili_index: DEFAULT_INDEX.into(),
            meili_timeout: Duration::from_secs(30),
            server_port: DEFAULT_PORT,
            ingest_batch_size: 1000,
            ingest_batch_delay: Duration::from_millis(100),
            task_poll_interval: Duration::from_millis(500),
            task_poll_timeout: Duration::from_secs(300),
        }
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match load_env_optional(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Load configuration from the environment (and `.env`, when present) once per process.
///
/// Call before [`crate::logging::init_tracing`] so that `RUST_LOG` and `CATALOG_LOG_FILE` from
/// `.env` take effect.
pub fn init_config() -> Result<&'static Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    Ok(CONFIG.get_or_init(|| config))
}
