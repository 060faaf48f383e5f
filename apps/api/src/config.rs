//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;

/// Development-only encryption key (32 bytes, hex).
/// In production, ENCRYPTION_KEY MUST be set via environment variable.
const DEV_ENCRYPTION_KEY: &str =
    "b41c40b41c40b41c40b41c40b41c40b41c40b41c40b41c40b41c40b41c40b41c";

/// API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP server port
    pub http_port: u16,

    /// Path to the SQLite database file
    pub database_path: String,

    /// Hex-encoded 32-byte key for the customer tax-ID cipher
    pub encryption_key: String,

    /// Whether the encryption key fell back to the development default
    pub encryption_key_is_default: bool,

    /// Seconds between reconciliation sweeps (0 disables the sweep)
    pub sweep_interval_secs: u64,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let encryption_key = env::var("ENCRYPTION_KEY").ok();
        let encryption_key_is_default = encryption_key.is_none();

        let config = ApiConfig {
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "3333".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("HTTP_PORT".to_string()))?,

            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "./balcao.db".to_string()),

            encryption_key: encryption_key.unwrap_or_else(|| DEV_ENCRYPTION_KEY.to_string()),

            encryption_key_is_default,

            sweep_interval_secs: env::var("SWEEP_INTERVAL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SWEEP_INTERVAL_SECS".to_string()))?,
        };

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dev_key_is_valid_hex() {
        assert_eq!(DEV_ENCRYPTION_KEY.len(), 64);
        assert!(DEV_ENCRYPTION_KEY.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
