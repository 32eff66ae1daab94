//! Application configuration management
//!
//! Two layers:
//! - [AppConfig]: process settings from environment variables, read once at start
//! - [RetentionConfig]: users and subscriptions from a YAML file, reloaded while running
//!   (see [ConfigWatcher])

pub mod watcher;

use std::collections::BTreeSet;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub use watcher::{ConfigProvider, ConfigWatcher};

/// Configuration failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse retention config")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid retention config: {0}")]
    Invalid(String),

    #[error("invalid {name}: {reason}")]
    Env { name: &'static str, reason: String },
}

/// Process settings loaded from environment variables
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Plex server base URL
    pub plex_url: String,

    /// Per-request timeout against Plex
    pub plex_timeout: Duration,

    /// Path of the retention YAML file
    pub retention_config_path: PathBuf,

    /// How often the retention file is re-read
    pub config_reload_interval: Duration,

    /// Time between retention cycles
    pub poll_interval: Duration,

    /// Directory receiving the progress logs
    pub log_dir: PathBuf,

    /// Emit console logs as JSON
    pub log_json: bool,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let plex_url = env::var("PLEX_URL").unwrap_or_else(|_| "http://127.0.0.1:32400".to_string());
        reqwest::Url::parse(&plex_url).map_err(|e| ConfigError::Env {
            name: "PLEX_URL",
            reason: e.to_string(),
        })?;

        Ok(Self {
            plex_url,

            plex_timeout: Duration::from_secs(parse_env("PLEX_TIMEOUT_SECS", 30)?),

            retention_config_path: env::var("RETENTION_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./config.yaml")),

            config_reload_interval: Duration::from_secs(parse_env("CONFIG_RELOAD_SECS", 60)?),

            poll_interval: Duration::from_secs(60 * parse_env("POLL_INTERVAL_MINUTES", 15)?),

            log_dir: env::var("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_log_dir()),

            log_json: env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }
}

/// Parse a positive integer variable, falling back to `default` when unset
fn parse_env(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    let Ok(raw) = env::var(name) else {
        return Ok(default);
    };

    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::Env {
            name,
            reason: "must be greater than zero".to_string(),
        }),
        Ok(value) => Ok(value),
        Err(e) => Err(ConfigError::Env {
            name,
            reason: e.to_string(),
        }),
    }
}

/// `logs/` next to the executable
fn default_log_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("logs")))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// A subscriber and the titles they follow
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    /// Display name, only used in logs
    pub name: String,
    pub token: String,
    #[serde(default)]
    pub subscriptions: Vec<String>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("name", &self.name)
            .field("token", &"<redacted>")
            .field("subscriptions", &self.subscriptions)
            .finish()
    }
}

/// Snapshot of the retention rules, as read from the YAML file
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionConfig {
    /// Filesystem root under which the server's paths resolve
    #[serde(default, rename = "plexBaseDirectory")]
    pub base_directory: Option<PathBuf>,

    /// Extensions removed by the directory sweep, without the dot, lowercase
    #[serde(default, rename = "unwantedFileExtensions")]
    pub unwanted_extensions: BTreeSet<String>,

    /// Token of the library owner; used for every catalog read
    #[serde(rename = "mainUserToken")]
    pub owner_token: String,

    #[serde(default)]
    pub users: Vec<User>,
}

impl fmt::Debug for RetentionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetentionConfig")
            .field("base_directory", &self.base_directory)
            .field("unwanted_extensions", &self.unwanted_extensions)
            .field("owner_token", &"<redacted>")
            .field("users", &self.users)
            .finish()
    }
}

impl RetentionConfig {
    /// Parse, normalise and validate a YAML document
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let mut config: RetentionConfig = serde_yaml::from_str(contents)?;

        config.unwanted_extensions = config
            .unwanted_extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();

        config.validate()?;
        Ok(config)
    }

    /// Read and parse the YAML file at `path`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.owner_token.trim().is_empty() {
            return Err(ConfigError::Invalid("mainUserToken is empty".to_string()));
        }

        for user in &self.users {
            if user.token.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("user {} has no token", user.name)));
            }
            if user.subscriptions.iter().any(|title| title.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "user {} has an empty subscription",
                    user.name
                )));
            }
        }

        Ok(())
    }

    /// Base directory, empty when not configured
    pub fn base_dir(&self) -> &Path {
        self.base_directory.as_deref().unwrap_or(Path::new(""))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    use super::*;

    const SAMPLE: &str = r#"
plexBaseDirectory: /srv/plex
unwantedFileExtensions: [exe, ".TXT", " nfo "]
mainUserToken: owner-token
users:
  - name: alice
    token: alice-token
    subscriptions: [Succession, All]
  - name: bob
    token: bob-token
    subscriptions: ["-Succession"]
"#;

    #[test]
    fn test_parse_retention_config() {
        let config = RetentionConfig::from_yaml(SAMPLE).unwrap();

        assert_eq!(config.base_dir(), Path::new("/srv/plex"));
        assert_eq!(
            config.unwanted_extensions,
            ["exe", "nfo", "txt"]
                .iter()
                .map(|s| s.to_string())
                .collect::<BTreeSet<_>>()
        );
        assert_eq!(config.owner_token, "owner-token");
        assert_eq!(config.users.len(), 2);
        assert_eq!(config.users[1].subscriptions, vec!["-Succession".to_string()]);
    }

    #[test]
    fn test_optional_fields_default() {
        let config = RetentionConfig::from_yaml("mainUserToken: t\nplexBaseDirectory: null\n").unwrap();

        assert_eq!(config.base_dir(), Path::new(""));
        assert!(config.unwanted_extensions.is_empty());
        assert!(config.users.is_empty());
    }

    #[test]
    fn test_empty_owner_token_is_rejected() {
        assert_matches!(
            RetentionConfig::from_yaml("mainUserToken: '  '\n"),
            Err(ConfigError::Invalid(_))
        );
    }

    #[test]
    fn test_user_without_token_is_rejected() {
        let yaml = "mainUserToken: t\nusers:\n  - name: eve\n    token: ''\n";
        assert_matches!(RetentionConfig::from_yaml(yaml), Err(ConfigError::Invalid(_)));
    }

    #[test]
    fn test_missing_owner_token_is_a_parse_error() {
        assert_matches!(RetentionConfig::from_yaml("users: []\n"), Err(ConfigError::Parse(_)));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let config = RetentionConfig::from_yaml(SAMPLE).unwrap();
        let debug = format!("{config:?}");

        assert!(!debug.contains("owner-token"));
        assert!(!debug.contains("alice-token"));
        assert!(debug.contains("alice"));
    }

    #[test]
    fn test_load_missing_file() {
        assert_matches!(
            RetentionConfig::load(Path::new("/nonexistent/plexsweep.yaml")),
            Err(ConfigError::Read { .. })
        );
    }
}
