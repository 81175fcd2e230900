use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    /// `None` selects the in-memory backend.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub database_acquire_timeout_secs: u64,
    pub log_level: tracing::Level,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 5000,
            database_url: None,
            database_max_connections: 20,
            database_acquire_timeout_secs: 30,
            log_level: tracing::Level::INFO,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: env::var("PORT")
                .or_else(|_| env::var("SERVER_PORT"))
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(defaults.server_port),
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS")
                .filter(|max| *max > 0)
                .unwrap_or(defaults.database_max_connections),
            database_acquire_timeout_secs: parse_var("DATABASE_ACQUIRE_TIMEOUT_SECS")
                .unwrap_or(defaults.database_acquire_timeout_secs),
            log_level: parse_var("LOG_LEVEL").unwrap_or(defaults.log_level),
        }
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.database_acquire_timeout_secs)
    }
}

pub(crate) fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|value| value.trim().parse().ok())
}
