//! Worker configuration management
//!
//! This module handles loading and validating configuration from environment
//! variables. All configuration is loaded at startup and validated before
//! the worker starts consuming.

use std::env;

use crate::constants::EXTRA_DB_CONNECTIONS;

/// Main worker configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub broker: BrokerConfig,
    pub judge: JudgeConfig,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Message broker configuration
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    pub url: String,
}

/// Judge execution configuration
#[derive(Debug, Clone)]
pub struct JudgeConfig {
    /// Number of concurrently judged submissions
    pub max_processes: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let judge = JudgeConfig::from_env()?;
        Ok(Self {
            database: DatabaseConfig::from_env(&judge)?,
            broker: BrokerConfig::from_env()?,
            judge,
        })
    }
}

impl DatabaseConfig {
    fn from_env(judge: &JudgeConfig) -> Result<Self, ConfigError> {
        let default_connections = judge.max_processes as u32 + EXTRA_DB_CONNECTIONS;
        Ok(Self {
            url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL".to_string()))?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| default_connections.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS".to_string()))?,
        })
    }
}

impl BrokerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env::var("MQ_URL").map_err(|_| ConfigError::Missing("MQ_URL".to_string()))?,
        })
    }
}

impl JudgeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let max_processes: usize = env::var("MAX_PROCESSES")
            .unwrap_or_else(|_| "0".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("MAX_PROCESSES".to_string()))?;
        Ok(Self {
            // 0 or unset means one slot per available CPU
            max_processes: if max_processes == 0 {
                num_cpus::get()
            } else {
                max_processes
            },
        })
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_is_sized_for_slots_and_io_thread() {
        let judge = JudgeConfig { max_processes: 4 };
        let db = DatabaseConfig {
            url: "postgres://localhost/judge".to_string(),
            max_connections: judge.max_processes as u32 + EXTRA_DB_CONNECTIONS,
        };
        assert_eq!(db.max_connections, 6);
    }
}
