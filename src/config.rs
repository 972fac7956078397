//! Configuration with validation at startup.

use clap::Parser;
use secrecy::{ExposeSecret, SecretString};

/// Clinic HTTP service configuration.
///
/// All values can be set via environment variables or CLI arguments.
#[derive(Debug, Clone, Parser)]
#[command(name = "clinic-service", about = "Clinic management HTTP service")]
pub struct Config {
    /// Server listen address
    #[arg(long, env = "SERVER_ADDRESS", default_value = "0.0.0.0:8080")]
    pub server_address: String,

    /// CORS allowed origins (comma-separated, or "*" for any)
    #[arg(long, env = "CORS_ALLOW_ORIGINS")]
    pub cors_allow_origins: Option<String>,

    /// Database connection URL
    #[arg(long, env = "DB_URL")]
    pub db_url: String,

    /// Database pool minimum connections
    #[arg(long, env = "DB_POOL_MIN", default_value = "2")]
    pub db_pool_min: u32,

    /// Database pool maximum connections
    #[arg(long, env = "DB_POOL_MAX", default_value = "10")]
    pub db_pool_max: u32,

    /// Database connection timeout in seconds
    #[arg(long, env = "DB_CONNECT_TIMEOUT", default_value = "30")]
    pub db_connect_timeout_secs: u64,

    /// Enable outbound WhatsApp messages via Twilio
    #[arg(long, env = "TWILIO_ENABLED", default_value = "false")]
    pub twilio_enabled: bool,

    /// Twilio account SID
    #[arg(long, env = "TWILIO_ACCOUNT_SID")]
    pub twilio_account_sid: Option<String>,

    /// Twilio auth token
    #[arg(long, env = "TWILIO_AUTH_TOKEN")]
    pub twilio_auth_token: Option<SecretString>,

    /// WhatsApp sender number (e.g. "whatsapp:+14155238886")
    #[arg(long, env = "TWILIO_WHATSAPP_FROM")]
    pub twilio_whatsapp_from: Option<String>,

    /// Staff number receiving internal booking notices
    #[arg(long, env = "CLINIC_STAFF_NUMBER")]
    pub clinic_staff_number: Option<String>,

    /// Webhook URL new leads are forwarded to (optional)
    #[arg(long, env = "LEAD_WEBHOOK_URL")]
    pub lead_webhook_url: Option<String>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(long, env = "LOG_LEVEL", default_value = "INFO")]
    pub log_level: String,

    /// Use JSON log format
    #[arg(long, env = "JSON_LOGS", default_value = "true")]
    pub json_logs: bool,
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Database pool max ({max}) must be >= min ({min})")]
    InvalidPoolSize { min: u32, max: u32 },
    #[error("Twilio is enabled but {0} is not set")]
    MissingTwilioCredential(&'static str),
}

impl Config {
    /// Parse and validate configuration.
    ///
    /// # Errors
    /// Returns an error if any configuration value fails validation.
    pub fn init() -> anyhow::Result<Self> {
        let config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.db_pool_max < self.db_pool_min {
            return Err(ConfigError::InvalidPoolSize {
                min: self.db_pool_min,
                max: self.db_pool_max,
            });
        }
        if self.twilio_enabled {
            if self
                .twilio_account_sid
                .as_deref()
                .map_or(true, str::is_empty)
            {
                return Err(ConfigError::MissingTwilioCredential("TWILIO_ACCOUNT_SID"));
            }
            if self
                .twilio_auth_token
                .as_ref()
                .map_or(true, |s| s.expose_secret().is_empty())
            {
                return Err(ConfigError::MissingTwilioCredential("TWILIO_AUTH_TOKEN"));
            }
        }
        Ok(())
    }
}
