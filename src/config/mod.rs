pub mod admin_conf;
pub mod app_conf;
pub mod email_conf;
pub mod jwt_conf;
pub mod minio_conf;
pub mod mongo_conf;

pub use admin_conf::AdminConfig;
pub use app_conf::AppConfig;
pub use email_conf::EmailConfig;
pub use jwt_conf::JwtConfig;
pub use minio_conf::MinioConfig;
pub use mongo_conf::MongoConfig;

use tracing::info;

/// Common configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Every configuration section the service needs at startup.
///
/// Loading fails on the first missing or invalid required value so the
/// process never starts half configured.
#[derive(Debug, Clone)]
pub struct Settings {
    pub app: AppConfig,
    pub mongo: MongoConfig,
    pub jwt: JwtConfig,
    pub minio: MinioConfig,
    pub email: EmailConfig,
    pub admin: AdminConfig,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading service settings");
        let settings = Settings {
            app: AppConfig::from_env()?,
            mongo: MongoConfig::from_env()?,
            jwt: JwtConfig::from_env()?,
            minio: MinioConfig::from_env()?,
            email: EmailConfig::from_env()?,
            admin: AdminConfig::from_env()?,
        };
        info!("All settings loaded and validated");
        Ok(settings)
    }
}
