//! Configuration loading for Colloquy.
//! Reads colloquy.toml from the current directory or path in COLLOQUY_CONFIG env var.

use std::path::Path;
use std::time::Duration;

use colloquy_client::{ClientConfig, RetryConfig};
use colloquy_session::SessionConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub client: ClientSection,
    #[serde(default)]
    pub session: SessionSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Name of the env var holding the bearer token, when the endpoint
    /// requires auth. The token itself never lives in the config file.
    pub bearer_token_env: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String { "http://127.0.0.1:8000".to_string() }
fn default_timeout_secs() -> u64 { 30 }

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            bearer_token_env: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSection {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_base_backoff_secs")]
    pub base_backoff_secs: u64,
}

fn default_max_retries() -> u32 { 3 }
fn default_base_backoff_secs() -> u64 { 1 }

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_backoff_secs: default_base_backoff_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSection {
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,
}

fn default_stale_after_secs() -> u64 { 300 }

impl Default for SessionSection {
    fn default() -> Self {
        Self { stale_after_secs: default_stale_after_secs() }
    }
}


impl Config {
    /// Load configuration from colloquy.toml.
    /// Checks COLLOQUY_CONFIG env var first, then the current directory.
    /// A missing file falls back to the local-dev defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("COLLOQUY_CONFIG")
            .unwrap_or_else(|_| "colloquy.toml".to_string());

        if !Path::new(&path).exists() {
            tracing::warn!("Config file not found: {path} — using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn client_config(&self) -> ClientConfig {
        let bearer_token = self
            .endpoint
            .bearer_token_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|token| !token.is_empty());

        ClientConfig {
            base_url: self.endpoint.base_url.clone(),
            bearer_token,
            timeout_secs: self.endpoint.timeout_secs,
            retry: RetryConfig {
                max_retries: self.client.max_retries,
                base_backoff_secs: self.client.base_backoff_secs,
            },
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            stale_after: Duration::from_secs(self.session.stale_after_secs),
        }
    }
}
