//! Application configuration for skillscout.
//!
//! User config lives at `~/.skillscout/skillscout.toml`.
//! Environment variables override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SkillScoutError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "skillscout.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".skillscout";

// ---------------------------------------------------------------------------
// Config structs (matching skillscout.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Marketplace API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Raw-content host settings for enrichment fetches.
    #[serde(default)]
    pub raw_content: RawContentConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Directory holding the persisted JSON files and markdown cache.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// How many top-installed items the enricher considers.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Enrichment worker pool size.
    #[serde(default = "default_concurrency")]
    pub enrich_concurrency: usize,

    /// Delay in ms between successful leaderboard page fetches.
    #[serde(default = "default_fetch_delay_ms")]
    pub fetch_delay_ms: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            top_n: default_top_n(),
            enrich_concurrency: default_concurrency(),
            fetch_delay_ms: default_fetch_delay_ms(),
        }
    }
}

fn default_data_dir() -> String {
    "data".into()
}
fn default_top_n() -> usize {
    100
}
fn default_concurrency() -> usize {
    4
}
fn default_fetch_delay_ms() -> u64 {
    200
}

/// `[api]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the leaderboard API; pages are `{base}/{board}/{page}`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Provider identifier stamped into the index.
    #[serde(default = "default_provider_id")]
    pub provider_id: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            provider_id: default_provider_id(),
        }
    }
}

fn default_base_url() -> String {
    "https://skillsmp.com/api/leaderboards".into()
}
fn default_provider_id() -> String {
    "skillsmp".into()
}

/// `[raw_content]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawContentConfig {
    /// Raw-content host; fetches are `{host}/{source}/HEAD/{path}`.
    #[serde(default = "default_raw_host")]
    pub host: String,

    /// Name of the env var holding the bearer token (never the token itself).
    #[serde(default = "default_auth_token_env")]
    pub auth_token_env: String,
}

impl Default for RawContentConfig {
    fn default() -> Self {
        Self {
            host: default_raw_host(),
            auth_token_env: default_auth_token_env(),
        }
    }
}

fn default_raw_host() -> String {
    "https://raw.githubusercontent.com".into()
}
fn default_auth_token_env() -> String {
    "GITHUB_TOKEN".into()
}

// ---------------------------------------------------------------------------
// Runtime configs (merged from config file + environment)
// ---------------------------------------------------------------------------

/// Runtime crawl configuration.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Leaderboard API base URL.
    pub base_url: String,
    /// Provider identifier stamped into the index.
    pub provider_id: String,
    /// Delay in ms between successful page fetches.
    pub fetch_delay_ms: u64,
}

impl From<&AppConfig> for CrawlConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            base_url: config.api.base_url.clone(),
            provider_id: config.api.provider_id.clone(),
            fetch_delay_ms: env_override(config.defaults.fetch_delay_ms, "SKILLSCOUT_FETCH_DELAY_MS"),
        }
    }
}

/// Runtime enrichment configuration.
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    /// Raw-content host.
    pub raw_host: String,
    /// Bearer token resolved from the environment, if set.
    pub auth_token: Option<String>,
    /// How many top-installed items to consider.
    pub top_n: usize,
    /// Worker pool size.
    pub concurrency: usize,
}

impl From<&AppConfig> for EnrichConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            raw_host: config.raw_content.host.clone(),
            auth_token: auth_token(config),
            top_n: env_override(config.defaults.top_n, "SKILLSCOUT_TOP_N"),
            concurrency: env_override(config.defaults.enrich_concurrency, "SKILLSCOUT_CONCURRENCY"),
        }
    }
}

/// Read the bearer token from the env var named in the config.
/// Empty or unset means unauthenticated requests.
pub fn auth_token(config: &AppConfig) -> Option<String> {
    match std::env::var(&config.raw_content.auth_token_env) {
        Ok(val) if !val.is_empty() => Some(val),
        _ => None,
    }
}

/// Override `fallback` with a numeric env var, keeping `fallback` when the
/// variable is unset or fails to parse. Numeric parsing is the only validation.
fn env_override<T: std::str::FromStr + Copy>(fallback: T, var: &str) -> T {
    match std::env::var(var) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(var, value = %raw, "ignoring unparseable env override");
            fallback
        }),
        Err(_) => fallback,
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.skillscout/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SkillScoutError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.skillscout/skillscout.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| SkillScoutError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        SkillScoutError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SkillScoutError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SkillScoutError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SkillScoutError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("GITHUB_TOKEN"));
        assert!(toml_str.contains("raw.githubusercontent.com"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.top_n, 100);
        assert_eq!(parsed.defaults.enrich_concurrency, 4);
        assert_eq!(parsed.api.provider_id, "skillsmp");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[defaults]
top_n = 25

[api]
base_url = "http://localhost:9000/boards"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.top_n, 25);
        assert_eq!(config.defaults.fetch_delay_ms, 200);
        assert_eq!(config.api.base_url, "http://localhost:9000/boards");
        assert_eq!(config.api.provider_id, "skillsmp");
    }

    #[test]
    fn crawl_config_from_app_config() {
        let app = AppConfig::default();
        let crawl = CrawlConfig::from(&app);
        assert_eq!(crawl.fetch_delay_ms, 200);
        assert_eq!(crawl.provider_id, "skillsmp");
    }

    #[test]
    fn env_override_parses_numbers() {
        // Use unique env var names to avoid interfering with other tests
        unsafe { std::env::set_var("SKILLSCOUT_TEST_OVERRIDE_OK", "42") };
        assert_eq!(env_override(7usize, "SKILLSCOUT_TEST_OVERRIDE_OK"), 42);

        unsafe { std::env::set_var("SKILLSCOUT_TEST_OVERRIDE_BAD", "not-a-number") };
        assert_eq!(env_override(7usize, "SKILLSCOUT_TEST_OVERRIDE_BAD"), 7);

        assert_eq!(env_override(7usize, "SKILLSCOUT_TEST_OVERRIDE_UNSET"), 7);
    }

    #[test]
    fn auth_token_absent_means_unauthenticated() {
        let mut config = AppConfig::default();
        config.raw_content.auth_token_env = "SKILLSCOUT_TEST_NONEXISTENT_TOKEN".into();
        assert!(auth_token(&config).is_none());
    }
}
