use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Base URL of the backend, without a trailing path.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bounded-call window applied to every request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}
fn default_timeout_secs() -> u64 {
    20
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            top_k: default_top_k(),
        }
    }
}

fn default_history_limit() -> usize {
    50
}
fn default_top_k() -> u32 {
    5
}

impl Config {
    /// Default config pointed at a specific backend. Used by the `--api-url`
    /// override and by tests against an ephemeral mock server.
    pub fn with_base_url(base_url: &str) -> Self {
        let mut cfg = Config::default();
        cfg.api.base_url = base_url.to_string();
        cfg
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    if config.api.base_url.trim().is_empty() {
        anyhow::bail!("api.base_url must not be empty");
    }
    if config.api.timeout_secs == 0 {
        anyhow::bail!("api.timeout_secs must be > 0");
    }
    if config.session.history_limit < 1 {
        anyhow::bail!("session.history_limit must be >= 1");
    }
    if config.session.top_k < 1 {
        anyhow::bail!("session.top_k must be >= 1");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.api.base_url, "http://127.0.0.1:8080");
        assert_eq!(cfg.api.timeout_secs, 20);
        assert_eq!(cfg.session.history_limit, 50);
        assert_eq!(cfg.session.top_k, 5);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let cfg: Config = toml::from_str("[api]\nbase_url = \"http://backend:9090\"\n").unwrap();
        assert_eq!(cfg.api.base_url, "http://backend:9090");
        assert_eq!(cfg.api.timeout_secs, 20);
        assert_eq!(cfg.session.history_limit, 50);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let cfg: Config = toml::from_str("[api]\ntimeout_secs = 0\n").unwrap();
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let cfg: Config = toml::from_str("[api]\nbase_url = \"\"\n").unwrap();
        assert!(validate(&cfg).is_err());
    }
}
