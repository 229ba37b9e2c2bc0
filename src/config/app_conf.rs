use std::env;
use tracing::{debug, warn};

use crate::config::ConfigError;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Minutes an untouched form draft is kept
    pub draft_ttl_minutes: u64,
    pub max_drafts: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("APP_HOST").unwrap_or_else(|_| {
            warn!("APP_HOST not set, using default: 127.0.0.1");
            "127.0.0.1".to_string()
        });
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidValue("Invalid APP_PORT value".to_string()))?;
        debug!("Listening address: {}:{}", host, port);

        let draft_ttl_minutes = env::var("FORM_DRAFT_TTL_MINUTES")
            .unwrap_or_else(|_| "120".to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidValue("Invalid FORM_DRAFT_TTL_MINUTES value".to_string()))?;
        let max_drafts = env::var("FORM_MAX_DRAFTS")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<usize>()
            .map_err(|_| ConfigError::InvalidValue("Invalid FORM_MAX_DRAFTS value".to_string()))?;

        let config = AppConfig { host, port, draft_ttl_minutes, max_drafts };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.parse::<std::net::IpAddr>().is_err() {
            return Err(ConfigError::ValidationError(format!("APP_HOST is not an IP address: {}", self.host)));
        }
        if self.port == 0 {
            return Err(ConfigError::ValidationError("APP_PORT cannot be 0".to_string()));
        }
        if self.draft_ttl_minutes == 0 || self.max_drafts == 0 {
            return Err(ConfigError::ValidationError("Form draft TTL and limit must be greater than 0".to_string()));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig { host: "127.0.0.1".to_string(), port: 8080, draft_ttl_minutes: 120, max_drafts: 5000 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_hostname_rejected() {
        let config = AppConfig { host: "localhost".to_string(), ..AppConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_draft_limit_rejected() {
        let config = AppConfig { max_drafts: 0, ..AppConfig::default() };
        assert!(config.validate().is_err());
    }
}
