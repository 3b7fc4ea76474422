use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    /// Postgres connection string. `None` runs against the in-memory collections.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub store_timeout: Duration,
    pub host: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: 5,
            store_timeout: Duration::from_millis(5000),
            host: "0.0.0.0".to_string(),
            port: 5001,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let max_connections: u32 = env_or("DB_MAX_CONNECTIONS", defaults.max_connections);

        let store_timeout = std::env::var("STORE_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(defaults.store_timeout);

        let host = std::env::var("HOST").unwrap_or(defaults.host);
        let port: u16 = env_or("PORT", defaults.port);

        Ok(Self {
            database_url,
            max_connections,
            store_timeout,
            host,
            port,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parses `key` from the environment, falling back to `default` when it is
/// unset or unparsable.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
