//! Configuration management for the schedule server

use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub source: SourceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Where workbook editions are fetched from
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Edition index; edition slugs are appended to it
    pub base_url: String,
    /// Language weeks are stored under
    pub language: String,
    /// Pause between consecutive issues of one ingest run
    pub request_delay_ms: u64,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl SourceConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

const DEFAULT_BASE_URL: &str = "https://www.jw.org/pt/biblioteca/jw-apostila-do-mes";
const DEFAULT_LANGUAGE: &str = "pt-BR";
const DEFAULT_USER_AGENT: &str = concat!("mwb-schedule-server/", env!("CARGO_PKG_VERSION"));

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            request_delay_ms: 300,
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: "sqlite:./mwb.db".to_string(),
            },
            source: SourceConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .unwrap_or(3000),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:./mwb.db".to_string()),
            },
            source: SourceConfig {
                base_url: env::var("SOURCE_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
                language: env::var("SOURCE_LANGUAGE")
                    .unwrap_or_else(|_| DEFAULT_LANGUAGE.to_string()),
                request_delay_ms: env::var("SOURCE_REQUEST_DELAY_MS")
                    .unwrap_or_else(|_| "300".to_string())
                    .parse()
                    .unwrap_or(300),
                timeout_secs: env::var("SOURCE_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .unwrap_or(30),
                user_agent: env::var("SOURCE_USER_AGENT")
                    .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
            },
        })
    }
}
