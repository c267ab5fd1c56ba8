use std::env;
use thiserror::Error;

use crate::services::advisory;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing credential: {0} is not set")]
    MissingCredential(&'static str),
}

/// Process configuration, read once at startup before any advisory call
/// is attempted.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub database_url: String,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var("OPENROUTER_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingCredential("OPENROUTER_API_KEY"))?;

        let model =
            env::var("OPENROUTER_MODEL").unwrap_or_else(|_| advisory::DEFAULT_MODEL.to_string());

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:upload_history.db".to_string());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        Ok(Config {
            api_key,
            model,
            database_url,
            bind_addr,
        })
    }
}
