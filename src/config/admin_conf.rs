use std::env;
use serde::{Serialize, Deserialize};
use tracing::{debug, error, info};

use crate::config::ConfigError;

/// Admin allow-list plus an optional bootstrap account.
///
/// Expected environment variables:
/// - ADMIN_EMAILS: comma separated admin email addresses (required)
/// - ADMIN_PASSWORD: initial password of every allow-listed account, created at startup if absent (optional)
/// - ADMIN_DISPLAY_NAME: display name of that bootstrap account (defaults to "Administrator")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub emails: Vec<String>,
    pub bootstrap_password: Option<String>,
    pub bootstrap_display_name: String,
}

impl AdminConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading admin configuration from environment variables");
        let raw = env::var("ADMIN_EMAILS").map_err(|_| {
            error!("ADMIN_EMAILS environment variable not found");
            ConfigError::EnvVarNotFound("ADMIN_EMAILS".to_string())
        })?;
        let emails = parse_email_list(&raw);
        debug!("Admin allow-list size: {}", emails.len());

        let config = AdminConfig {
            emails,
            bootstrap_password: env::var("ADMIN_PASSWORD").ok(),
            bootstrap_display_name: env::var("ADMIN_DISPLAY_NAME").unwrap_or_else(|_| "Administrator".to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.emails.is_empty() {
            return Err(ConfigError::ValidationError("ADMIN_EMAILS must list at least one address".to_string()));
        }
        if let Some(bad) = self.emails.iter().find(|e| !e.contains('@')) {
            return Err(ConfigError::ValidationError(format!("Invalid admin email: {}", bad)));
        }
        if let Some(ref pass) = self.bootstrap_password {
            if pass.len() < 8 {
                return Err(ConfigError::ValidationError("ADMIN_PASSWORD must be at least 8 characters".to_string()));
            }
        }
        Ok(())
    }

    /// Addresses whose accounts are created at startup: every allow-listed
    /// email once a bootstrap password is configured, none otherwise.
    pub fn bootstrap_emails(&self) -> Vec<&str> {
        match self.bootstrap_password {
            Some(_) => self.emails.iter().map(String::as_str).collect(),
            None => Vec::new(),
        }
    }
}

fn parse_email_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_email_list_trims_and_lowercases() {
        let emails = parse_email_list(" Boss@Movers.test, ,ops@movers.test ");
        assert_eq!(emails, vec!["boss@movers.test", "ops@movers.test"]);
    }

    #[test]
    fn test_empty_allow_list_rejected() {
        let config = AdminConfig { emails: vec![], bootstrap_password: None, bootstrap_display_name: "x".into() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bootstrap_covers_every_admin_once_password_set() {
        let mut config = AdminConfig {
            emails: vec!["boss@movers.test".into(), "ops@movers.test".into()],
            bootstrap_password: None,
            bootstrap_display_name: "Boss".into(),
        };
        assert!(config.bootstrap_emails().is_empty());
        config.bootstrap_password = Some("changeme123".into());
        assert_eq!(config.bootstrap_emails(), vec!["boss@movers.test", "ops@movers.test"]);
    }
}
