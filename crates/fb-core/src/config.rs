use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable that overrides `api.base_url`.
pub const API_URL_ENV: &str = "FUNNELBOARD_API_URL";

/// Top-level configuration loaded from `~/.funnelboard/config.toml`.
///
/// **Security**: this struct never stores the session token. The token is
/// persisted separately by [`crate::session_store::SessionStore`].
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub board: BoardConfig,
}

impl Config {
    /// Load config from `~/.funnelboard/config.toml`, falling back to
    /// defaults when the file does not exist. The `FUNNELBOARD_API_URL`
    /// environment variable is applied last.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        let mut cfg = if path.exists() {
            Self::read(&path)?
        } else {
            Config::default()
        };
        cfg.apply_env();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from a specific path, applying the environment override.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let mut cfg = Self::read(&path.into())?;
        cfg.apply_env();
        cfg.validate()?;
        Ok(cfg)
    }

    fn read(path: &PathBuf) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        toml::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize config to TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        self.validate()?;
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_env(&mut self) {
        self.override_base_url(std::env::var(API_URL_ENV).ok().as_deref());
    }

    /// Replace `api.base_url` when `url` is present and non-blank.
    pub fn override_base_url(&mut self, url: Option<&str>) {
        if let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) {
            self.api.base_url = url.trim_end_matches('/').to_string();
        }
    }

    /// Semantic validation for settings that are not expressible via types.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api.validate()?;
        self.board.validate()?;
        Ok(())
    }

    /// `~/.funnelboard/config.toml`
    pub fn default_path() -> PathBuf {
        home_dir().join("config.toml")
    }
}

/// `~/.funnelboard`, or `./.funnelboard` when no home directory is known.
pub fn home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".funnelboard")
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(String),
    #[error("parse: {0}")]
    Parse(String),
    #[error("validation: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Section structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// `human` or `json`.
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "human".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ApiConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::Validation("api.base_url must not be empty".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "api.base_url must start with http:// or https:// (got '{url}')"
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "api.request_timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".into()
}
fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    /// Where the bearer token is persisted. Defaults to
    /// `~/.funnelboard/session.json`.
    #[serde(default)]
    pub token_path: Option<String>,
}

impl SessionConfig {
    pub fn resolved_token_path(&self) -> PathBuf {
        match &self.token_path {
            Some(p) if !p.trim().is_empty() => PathBuf::from(p),
            _ => home_dir().join("session.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Number of leads shown in the "recent leads" table.
    #[serde(default = "default_recent_leads")]
    pub recent_leads: usize,
    /// Maximum notices kept on the notice channel.
    #[serde(default = "default_notice_history")]
    pub notice_history: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            recent_leads: default_recent_leads(),
            notice_history: default_notice_history(),
        }
    }
}

impl BoardConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.notice_history == 0 {
            return Err(ConfigError::Validation(
                "board.notice_history must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

fn default_recent_leads() -> usize {
    10
}
fn default_notice_history() -> usize {
    50
}
