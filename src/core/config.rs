use crate::core::state::ChatSettings;
use dotenv::dotenv;
use std::env;
use std::time::Duration;
use tracing::{info, warn};

const DEFAULT_JWT_SECRET: &str = "insecure-development-secret";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_host: String,
    pub server_port: u16,
    pub max_connections: u32,
    pub store_timeout_ms: u64,
    pub outbound_queue_capacity: usize,
    pub ws_idle_timeout_secs: u64,
    pub app_env: String,
}

impl Config {
    /// Loads the configuration from environment variables.
    /// Calls dotenv() first so a local `.env` file is honoured.
    pub fn from_env() -> Result<Self, String> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL must be set in .env file".to_string())?;

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set, using default (not secure for production!)");
            DEFAULT_JWT_SECRET.to_string()
        });

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let server_port = parse_var("SERVER_PORT", 3000u16)
            .map_err(|_| "Invalid SERVER_PORT: must be a number between 0-65535".to_string())?;

        let max_connections = parse_var("MAX_DB_CONNECTIONS", 10u32)
            .map_err(|_| "Invalid MAX_DB_CONNECTIONS: must be a positive number".to_string())?;

        let store_timeout_ms = parse_var("STORE_TIMEOUT_MS", 5000u64)
            .map_err(|_| "Invalid STORE_TIMEOUT_MS: must be a positive number".to_string())?;

        let outbound_queue_capacity = parse_var("OUTBOUND_QUEUE_CAPACITY", 64usize)
            .map_err(|_| "Invalid OUTBOUND_QUEUE_CAPACITY: must be a positive number".to_string())?;

        let ws_idle_timeout_secs = parse_var("WS_IDLE_TIMEOUT_SECS", 300u64)
            .map_err(|_| "Invalid WS_IDLE_TIMEOUT_SECS: must be a positive number".to_string())?;

        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config {
            database_url,
            jwt_secret,
            server_host,
            server_port,
            max_connections,
            store_timeout_ms,
            outbound_queue_capacity,
            ws_idle_timeout_secs,
            app_env,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects zero sizes and durations: a zero idle timeout would close every
    /// connection on its first read.
    fn validate(&self) -> Result<(), String> {
        if self.max_connections == 0
            || self.store_timeout_ms == 0
            || self.outbound_queue_capacity == 0
            || self.ws_idle_timeout_secs == 0
        {
            return Err(
                "MAX_DB_CONNECTIONS, STORE_TIMEOUT_MS, OUTBOUND_QUEUE_CAPACITY and WS_IDLE_TIMEOUT_SECS must be greater than zero"
                    .to_string(),
            );
        }
        Ok(())
    }

    pub fn chat_settings(&self) -> ChatSettings {
        ChatSettings {
            store_timeout: Duration::from_millis(self.store_timeout_ms),
            outbound_queue_capacity: self.outbound_queue_capacity,
            ws_idle_timeout: Duration::from_secs(self.ws_idle_timeout_secs),
        }
    }

    /// Logs the configuration (secrets hidden)
    pub fn print_info(&self) {
        info!(
            environment = %self.app_env,
            address = %format!("{}:{}", self.server_host, self.server_port),
            database = %Self::mask_url(&self.database_url),
            max_db_connections = self.max_connections,
            store_timeout_ms = self.store_timeout_ms,
            outbound_queue_capacity = self.outbound_queue_capacity,
            ws_idle_timeout_secs = self.ws_idle_timeout_secs,
            "Server configuration loaded"
        );
        if self.jwt_secret == DEFAULT_JWT_SECRET {
            warn!("JWT secret: USING DEFAULT (INSECURE!)");
        }
    }

    /// Masks credentials in the database URL for logging
    fn mask_url(url: &str) -> String {
        if let Some(at_pos) = url.find('@') {
            if let Some(scheme_end) = url.find("://") {
                let scheme = &url[..scheme_end + 3];
                let after_at = &url[at_pos..];
                return format!("{}***{}", scheme, after_at);
            }
        }
        // sqlite urls carry no credentials
        if url.starts_with("sqlite:") {
            return url.to_string();
        }
        "***".to_string()
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, T::Err> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<T>(),
        Err(_) => Ok(default),
    }
}
