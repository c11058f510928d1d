use std::{path::PathBuf, time::Duration};

use crate::error::{Result, ScopeError};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_MAX_ARTICLES: u32 = 10;

pub const ENV_BASE_URL: &str = "SENTISCOPE_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "SENTISCOPE_TIMEOUT_SECS";
pub const ENV_CSRF_TOKEN: &str = "SENTISCOPE_CSRF_TOKEN";
pub const ENV_EXPORT_DIR: &str = "SENTISCOPE_EXPORT_DIR";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
    /// Pre-shared CSRF token. When absent the header is simply not sent.
    pub csrf_token: Option<String>,
    pub export_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("sentiscope/{}", env!("CARGO_PKG_VERSION")),
            csrf_token: None,
            export_dir: default_export_dir(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(base_url) = get(ENV_BASE_URL) {
            config.base_url = base_url;
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.parse().map_err(|_| {
                ScopeError::InvalidConfig(format!(
                    "{ENV_TIMEOUT_SECS} must be a whole number of seconds, got {raw:?}"
                ))
            })?;
            if secs == 0 {
                return Err(ScopeError::InvalidConfig(format!(
                    "{ENV_TIMEOUT_SECS} must be greater than zero"
                )));
            }
            config.timeout = Duration::from_secs(secs);
        }
        config.csrf_token = get(ENV_CSRF_TOKEN);
        if let Some(dir) = get(ENV_EXPORT_DIR) {
            config.export_dir = PathBuf::from(dir);
        }

        Ok(config)
    }
}

/// Downloads folder when the platform has one, otherwise the working directory.
pub fn default_export_dir() -> PathBuf {
    dirs::download_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sentiscope")
}
