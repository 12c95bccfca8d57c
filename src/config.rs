use crate::adapters::outbound::{ClientConfig, LockStoreConfig};
use crate::domain::value_objects::Endpoint;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "http://localhost:1104/v1";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 3;
const DEFAULT_KEEPALIVE_SECS: u64 = 30;
/// Back-off window as a multiple of the HTTP timeout.
const LOCK_TIME_FACTOR: u64 = 10;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // Directory service endpoints
    pub api_endpoints: Vec<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub ssl_verify: bool,

    // Timeouts
    pub http_timeout_secs: u64,
    pub keepalive_secs: u64,

    // Back-off lock records
    pub lock_time_secs: u64,
    pub lock_dir: PathBuf,

    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_endpoints: vec![DEFAULT_ENDPOINT.to_string()],
            user: None,
            password: None,
            ssl_verify: true,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            keepalive_secs: DEFAULT_KEEPALIVE_SECS,
            lock_time_secs: DEFAULT_HTTP_TIMEOUT_SECS * LOCK_TIME_FACTOR,
            lock_dir: std::env::temp_dir(),
            debug: false,
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("at least one api endpoint is required")]
    NoEndpoints,
    #[error("http timeout must be greater than zero")]
    ZeroTimeout,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_endpoints.iter().all(|e| e.trim().is_empty()) {
            return Err(ConfigError::NoEndpoints);
        }
        if self.http_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.api_endpoints
            .iter()
            .map(|e| e.trim())
            .filter(|e| !e.is_empty())
            .map(Endpoint::from)
            .collect()
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            user: self.user.clone(),
            password: self.password.clone(),
            ssl_verify: self.ssl_verify,
            timeout: Duration::from_secs(self.http_timeout_secs),
            keepalive: Duration::from_secs(self.keepalive_secs),
        }
    }

    pub fn lock_store_config(&self) -> LockStoreConfig {
        LockStoreConfig {
            dir: self.lock_dir.clone(),
            lock_time: Duration::from_secs(self.lock_time_secs),
            ..Default::default()
        }
    }
}

pub fn load_config() -> anyhow::Result<Config> {
    let api_endpoints = std::env::var("STNS_API_ENDPOINTS")
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_else(|_| vec![DEFAULT_ENDPOINT.to_string()]);

    let user = std::env::var("STNS_USER").ok();
    let password = std::env::var("STNS_PASSWORD").ok();

    let ssl_verify = std::env::var("STNS_SSL_VERIFY")
        .map(|v| !(v == "0" || v.to_lowercase() == "false"))
        .unwrap_or(true);

    let http_timeout_secs = std::env::var("STNS_HTTP_TIMEOUT_SECS")
        .unwrap_or_else(|_| DEFAULT_HTTP_TIMEOUT_SECS.to_string())
        .parse()
        .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);

    let keepalive_secs = std::env::var("STNS_KEEPALIVE_SECS")
        .unwrap_or_else(|_| DEFAULT_KEEPALIVE_SECS.to_string())
        .parse()
        .unwrap_or(DEFAULT_KEEPALIVE_SECS);

    let default_lock_time = http_timeout_secs.saturating_mul(LOCK_TIME_FACTOR);
    let lock_time_secs = std::env::var("STNS_LOCK_TIME_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default_lock_time);

    let lock_dir = std::env::var("STNS_LOCK_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir());

    let debug = std::env::var("DEBUG").is_ok();

    let cfg = Config {
        api_endpoints,
        user,
        password,
        ssl_verify,
        http_timeout_secs,
        keepalive_secs,
        lock_time_secs,
        lock_dir,
        debug,
    };
    cfg.validate()?;

    Ok(cfg)
}
