use crate::core::{AppError, Result};
use serde::Deserialize;
use std::env;

pub mod gateway;
pub mod server;

pub use gateway::{CacheConfig, CallbackConfig, EndpointsConfig, HttpConfig, PakaiLinkConfig};
pub use server::ServerConfig;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub server: ServerConfig,
    pub pakailink: PakaiLinkConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// `sandbox` or `production`
    pub env: String,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = Config {
            app: AppConfig {
                env: env::var("PAKAILINK_ENV").unwrap_or_else(|_| "sandbox".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
            server: ServerConfig::from_env()?,
            pakailink: PakaiLinkConfig::from_env()?,
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.app.env.as_str(), "sandbox" | "production") {
            return Err(AppError::Configuration(format!(
                "PAKAILINK_ENV must be 'sandbox' or 'production', got '{}'",
                self.app.env
            )));
        }

        if self.server.port == 0 {
            return Err(AppError::Configuration(
                "SERVER_PORT must be greater than 0".to_string(),
            ));
        }

        self.pakailink.validate()
    }
}
