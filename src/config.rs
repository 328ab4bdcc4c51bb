use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Application configuration, loaded from `config/default.toml` (optional)
/// with `APP__`-prefixed environment variables layered on top, e.g.
/// `APP__DATABASE_URL=postgres://...` or `APP__PORT=8080`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub db_min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub db_connect_timeout_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub db_acquire_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub db_idle_timeout_secs: u64,
    /// Per-request handler timeout applied by the HTTP layer.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_database_url() -> String {
    "sqlite::memory:".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_max_connections() -> u32 {
    10
}
fn default_min_connections() -> u32 {
    1
}
fn default_connect_timeout() -> u64 {
    30
}
fn default_acquire_timeout() -> u64 {
    8
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_request_timeout() -> u64 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            db_max_connections: default_max_connections(),
            db_min_connections: default_min_connections(),
            db_connect_timeout_secs: default_connect_timeout(),
            db_acquire_timeout_secs: default_acquire_timeout(),
            db_idle_timeout_secs: default_idle_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let cfg = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;
        cfg.try_deserialize()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
