//! Operator settings for mcpdoc.
//!
//! Defaults live at `~/.mcpdoc/mcpdoc.toml`.
//! CLI flags override config file values, which override defaults.
//! Doc sources themselves are not configured here; see the catalog crate.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{McpDocError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "mcpdoc.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".mcpdoc";

// ---------------------------------------------------------------------------
// Config structs (matching mcpdoc.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Outbound fetch policy.
    #[serde(default)]
    pub fetch: FetchSettings,
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FetchSettings {
    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,

    /// Whether to follow HTTP redirects.
    #[serde(default)]
    pub follow_redirects: bool,

    /// Redirect hop cap when following redirects.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Re-check every redirect hop against the allow-list.
    #[serde(default)]
    pub strict_redirects: bool,

    /// Extra domains allowed on top of the doc source origins. `"*"` allows all.
    #[serde(default)]
    pub allowed_domains: Vec<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            follow_redirects: false,
            max_redirects: default_max_redirects(),
            strict_redirects: false,
            allowed_domains: Vec::new(),
        }
    }
}

fn default_timeout_secs() -> f64 {
    10.0
}
fn default_max_redirects() -> usize {
    10
}

// ---------------------------------------------------------------------------
// Fetch config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime fetch configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Follow 3xx responses instead of reporting them as failures.
    pub follow_redirects: bool,
    /// Maximum redirect hops when `follow_redirects` is set.
    pub max_redirects: usize,
    /// Check each redirect hop's origin against the allow-list.
    pub strict_redirects: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            follow_redirects: false,
            max_redirects: default_max_redirects(),
            strict_redirects: false,
        }
    }
}

impl TryFrom<&AppConfig> for FetchConfig {
    type Error = McpDocError;

    fn try_from(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            timeout: timeout_from_secs(config.fetch.timeout_secs)?,
            follow_redirects: config.fetch.follow_redirects,
            max_redirects: config.fetch.max_redirects,
            strict_redirects: config.fetch.strict_redirects,
        })
    }
}

/// Convert a user-supplied timeout in seconds into a [`Duration`].
pub fn timeout_from_secs(secs: f64) -> Result<Duration> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(McpDocError::invalid_config(format!(
            "timeout must be a positive number of seconds, got {secs}"
        )));
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|e| McpDocError::invalid_config(format!("invalid timeout {secs}: {e}")))
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.mcpdoc/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| McpDocError::invalid_config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.mcpdoc/mcpdoc.toml`).
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
    let content =
        std::fs::read_to_string(path).map_err(|e| McpDocError::config_file(path, e.to_string()))?;

    toml::from_str(&content).map_err(|e| McpDocError::config_file(path, e.to_string()))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| McpDocError::config_file(&dir, e.to_string()))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| McpDocError::invalid_config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| McpDocError::config_file(&path, e.to_string()))?;
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
        assert!(toml_str.contains("timeout_secs"));
        assert!(toml_str.contains("follow_redirects"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.fetch.max_redirects, 10);
        assert!(!parsed.fetch.follow_redirects);
    }

    #[test]
    fn config_with_allowed_domains() {
        let toml_str = r#"
[fetch]
timeout_secs = 2.5
follow_redirects = true
allowed_domains = ["https://example.com/", "docs.rs"]
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.fetch.allowed_domains.len(), 2);

        let fetch = FetchConfig::try_from(&config).expect("fetch config");
        assert_eq!(fetch.timeout, Duration::from_millis(2500));
        assert!(fetch.follow_redirects);
        assert!(!fetch.strict_redirects);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml_str = "[fetch]\ntimeout = 3\n";
        assert!(toml::from_str::<AppConfig>(toml_str).is_err());
    }

    #[test]
    fn non_positive_timeout_is_invalid() {
        assert!(timeout_from_secs(0.0).is_err());
        assert!(timeout_from_secs(-1.0).is_err());
        assert!(timeout_from_secs(f64::NAN).is_err());
        assert_eq!(timeout_from_secs(10.0).unwrap(), Duration::from_secs(10));
    }

    #[test]
    fn load_config_from_missing_file_is_config_file_error() {
        let path = std::env::temp_dir()
            .join(format!("mcpdoc-missing-{}", uuid::Uuid::now_v7()))
            .join("mcpdoc.toml");
        let err = load_config_from(&path).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::ConfigFileError);
    }
}
