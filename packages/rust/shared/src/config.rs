//! Application configuration for jobwatch.
//!
//! User config lives at `~/.jobwatch/jobwatch.toml`.
//! CLI flags override config file values, which override defaults.
//! The bot token is never stored in the file: the file names the environment
//! variable that holds it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{JobWatchError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "jobwatch.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".jobwatch";

// ---------------------------------------------------------------------------
// Config structs (matching jobwatch.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Job listing page settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Novelty store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Telegram bot settings.
    #[serde(default)]
    pub telegram: TelegramConfig,
}

/// `[source]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Page holding the job listing table.
    #[serde(default = "default_source_url")]
    pub url: String,

    /// CSS selector for the element wrapping the listing table.
    #[serde(default = "default_table_selector")]
    pub table_selector: String,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_source_url(),
            table_selector: default_table_selector(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_source_url() -> String {
    "https://www.annauniv.edu/events.php".into()
}
fn default_table_selector() -> String {
    "#graphic-design-2".into()
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[storage]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the libSQL database file.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    "jobwatch.db".into()
}

/// `[telegram]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Name of the env var holding the bot token (never store the token itself).
    #[serde(default = "default_bot_token_env")]
    pub bot_token_env: String,

    /// Destination chat: a numeric chat id or an `@channel` username.
    #[serde(default)]
    pub chat_id: String,

    /// Bot API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token_env: default_bot_token_env(),
            chat_id: String::new(),
            api_base: default_api_base(),
        }
    }
}

fn default_bot_token_env() -> String {
    "JOBWATCH_BOT_TOKEN".into()
}
fn default_api_base() -> String {
    "https://api.telegram.org".into()
}

// ---------------------------------------------------------------------------
// Run config (validated, merged from config + CLI flags + environment)
// ---------------------------------------------------------------------------

/// Validated settings for one pipeline run. Built once at startup.
#[derive(Clone)]
pub struct RunConfig {
    /// Page holding the job listing table.
    pub source_url: Url,
    /// CSS selector for the element wrapping the listing table.
    pub table_selector: String,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// libSQL database file.
    pub db_path: PathBuf,
    /// Telegram bot token.
    pub bot_token: String,
    /// Destination chat id or `@channel`.
    pub chat_id: String,
    /// Bot API base URL.
    pub api_base: Url,
}

impl RunConfig {
    /// Validate `config` and read the bot token from the environment.
    pub fn resolve(config: &AppConfig) -> Result<Self> {
        let token = std::env::var(&config.telegram.bot_token_env).ok();
        Self::from_parts(config, token)
    }

    /// Validate `config` using an already-read bot token.
    pub fn from_parts(config: &AppConfig, bot_token: Option<String>) -> Result<Self> {
        let source_url = parse_http_url("source.url", &config.source.url)?;
        let api_base = parse_http_url("telegram.api_base", &config.telegram.api_base)?;

        if config.source.table_selector.trim().is_empty() {
            return Err(JobWatchError::config("source.table_selector must not be empty"));
        }
        if config.source.timeout_secs == 0 {
            return Err(JobWatchError::config("source.timeout_secs must be positive"));
        }
        if config.storage.db_path.trim().is_empty() {
            return Err(JobWatchError::config("storage.db_path must not be empty"));
        }

        validate_chat_id(&config.telegram.chat_id)?;

        let var_name = &config.telegram.bot_token_env;
        let bot_token = match bot_token {
            Some(token) if !token.trim().is_empty() => token.trim().to_string(),
            _ => {
                return Err(JobWatchError::config(format!(
                    "Telegram bot token not found. Set the {var_name} environment variable."
                )));
            }
        };

        Ok(Self {
            source_url,
            table_selector: config.source.table_selector.clone(),
            timeout: Duration::from_secs(config.source.timeout_secs),
            db_path: PathBuf::from(&config.storage.db_path),
            bot_token,
            chat_id: config.telegram.chat_id.trim().to_string(),
            api_base,
        })
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("source_url", &self.source_url.as_str())
            .field("table_selector", &self.table_selector)
            .field("timeout", &self.timeout)
            .field("db_path", &self.db_path)
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base.as_str())
            .finish()
    }
}

fn parse_http_url(key: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| JobWatchError::config(format!("{key}: invalid URL '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(JobWatchError::config(format!(
            "{key}: unsupported scheme '{other}', expected http or https"
        ))),
    }
}

/// Check that a chat id is a signed integer or an `@channel` username.
pub fn validate_chat_id(chat_id: &str) -> Result<()> {
    let chat_id = chat_id.trim();
    if chat_id.is_empty() {
        return Err(JobWatchError::config(
            "telegram.chat_id is required (numeric id or @channel)",
        ));
    }
    if chat_id.parse::<i64>().is_ok() {
        return Ok(());
    }
    match chat_id.strip_prefix('@') {
        Some(name) if !name.is_empty() && !name.contains(char::is_whitespace) => Ok(()),
        _ => Err(JobWatchError::config(format!(
            "telegram.chat_id '{chat_id}' is neither a numeric id nor an @channel"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.jobwatch/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| JobWatchError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.jobwatch/jobwatch.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| JobWatchError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| JobWatchError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| JobWatchError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| JobWatchError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| JobWatchError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
