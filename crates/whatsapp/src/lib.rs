//! Twilio WhatsApp client using the Messages API (2010-04-01).
//!
//! Sends plain-text WhatsApp messages through a Twilio account. Addresses
//! must carry the `whatsapp:` channel prefix (e.g. `whatsapp:+14155238886`);
//! the caller is responsible for normalizing them.
//!
//! # Configuration
//!
//! Environment variables (read by the service, passed in as [`TwilioConfig`]):
//! - `TWILIO_ACCOUNT_SID` - Account SID
//! - `TWILIO_AUTH_TOKEN` - Auth token (secret)
//!
//! # Example
//!
//! ```ignore
//! let client = TwilioClient::new(config);
//! let sid = client
//!     .send_message("whatsapp:+14155238886", "whatsapp:+15551234567", "Hello")
//!     .await?;
//! ```

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

/// Base URL for the Twilio REST API.
const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";

/// Twilio client errors.
#[derive(Debug, thiserror::Error)]
pub enum TwilioError {
    #[error("Failed to send message: {0}")]
    SendError(String),
    #[error("Twilio API error ({status}): {message}")]
    ApiError { status: u16, message: String },
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Twilio account configuration.
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    /// Account SID (public identifier).
    pub account_sid: String,
    /// Auth token (private).
    pub auth_token: SecretString,
}

/// Twilio WhatsApp messaging client.
#[derive(Clone)]
pub struct TwilioClient {
    client: reqwest::Client,
    config: TwilioConfig,
}

impl std::fmt::Debug for TwilioClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioClient")
            .field("account_sid", &self.config.account_sid)
            .finish_non_exhaustive()
    }
}

/// Subset of the Twilio message resource we care about.
#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
}

/// Twilio error response body.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl TwilioClient {
    /// Create a new Twilio client.
    ///
    /// # Panics
    /// Panics if the HTTP client fails to create.
    #[must_use]
    pub fn new(config: TwilioConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        info!(account_sid = %config.account_sid, "Twilio client initialized");

        Self { client, config }
    }

    /// Send a WhatsApp message and return the provider message SID.
    ///
    /// # Errors
    /// Returns `TwilioError::SendError` on transport failure and
    /// `TwilioError::ApiError` when Twilio rejects the request.
    #[instrument(skip(self, body), fields(to = %to))]
    pub async fn send_message(
        &self,
        from: &str,
        to: &str,
        body: &str,
    ) -> Result<String, TwilioError> {
        let url = format!(
            "{TWILIO_API_BASE}/Accounts/{}/Messages.json",
            self.config.account_sid
        );

        debug!(%from, "Sending WhatsApp message via Twilio");

        let response = self
            .client
            .post(&url)
            .basic_auth(
                &self.config.account_sid,
                Some(self.config.auth_token.expose_secret()),
            )
            .form(&[("From", from), ("To", to), ("Body", body)])
            .send()
            .await
            .map_err(|e| TwilioError::SendError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| "unknown error".to_string());
            error!(status, %message, "Twilio API error");
            return Err(TwilioError::ApiError { status, message });
        }

        let resource: MessageResource = response
            .json()
            .await
            .map_err(|e| TwilioError::SendError(e.to_string()))?;

        info!(sid = %resource.sid, "WhatsApp message sent");
        Ok(resource.sid)
    }

    /// Validate configuration (does not make network calls).
    ///
    /// # Errors
    /// Returns `TwilioError::ConfigError` if any required configuration is missing.
    pub fn validate_config(&self) -> Result<(), TwilioError> {
        if self.config.account_sid.is_empty() {
            return Err(TwilioError::ConfigError(
                "Account SID is empty".to_string(),
            ));
        }
        if self.config.auth_token.expose_secret().is_empty() {
            return Err(TwilioError::ConfigError("Auth token is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> TwilioConfig {
        TwilioConfig {
            account_sid: "AC_test_sid".to_string(),
            auth_token: SecretString::from("test_auth_token"),
        }
    }

    #[test]
    fn debug_does_not_leak_auth_token() {
        let client = TwilioClient::new(test_config());
        let debug = format!("{client:?}");
        assert!(debug.contains("AC_test_sid"));
        assert!(!debug.contains("test_auth_token"));
    }

    #[test]
    fn validate_config_rejects_empty_sid() {
        let mut config = test_config();
        config.account_sid = String::new();
        let client = TwilioClient::new(config);
        assert!(matches!(
            client.validate_config(),
            Err(TwilioError::ConfigError(_))
        ));
    }

    #[test]
    fn validate_config_accepts_complete_config() {
        let client = TwilioClient::new(test_config());
        assert!(client.validate_config().is_ok());
    }
}
