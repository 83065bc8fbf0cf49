use std::{env, fmt::Display, str::FromStr, time::Duration};

use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub backend: StoreBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub store_timeout: Duration,
}

impl Config {
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        Self {
            port: try_load("PORT", "5000"),
            backend: try_load("STORE_BACKEND", "postgres"),
            database_url: env::var("DATABASE_URL").ok(),
            max_connections: try_load("DB_MAX_CONNECTIONS", "5"),
            store_timeout: Duration::from_millis(try_load("STORE_TIMEOUT_MS", "5000")),
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    parse_or_default(key, &raw, default)
}

fn parse_or_default<T: FromStr>(key: &str, raw: &str, default: &str) -> T
where
    T::Err: Display,
{
    raw.parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value `{raw}`: {e}, using default: {default}");
        match default.parse() {
            Ok(value) => value,
            Err(e) => panic!("default for {key} does not parse: {e}"),
        }
    })
}
