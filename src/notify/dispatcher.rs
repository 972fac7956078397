//! Notification dispatch boundary.
//!
//! A dispatch attempt either yields a provider message reference or nothing.
//! Every failure past the orchestrator's own validation is absorbed here:
//! a notification that cannot be sent must never fail, roll back, or delay
//! the appointment write that triggered it.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use clinic_whatsapp::TwilioClient;
use tracing::{debug, error, info};

use super::{composer, phone};
use crate::db::models::Appointment;

/// Boxed async error type for provider calls.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Prefix of locally-generated placeholder references, returned when the
/// provider path is intentionally turned off. Distinguishes "configured
/// off" from "call failed" by the reference's shape alone.
pub const PLACEHOLDER_PREFIX: &str = "local-";

/// Which party receives the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Confirmation copy, sent to the patient's number.
    Confirmation,
    /// Internal booking notice, sent to the fixed staff number.
    StaffNotice,
}

/// Outbound message transport.
///
/// Implemented by the Twilio client; test code substitutes mocks.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Deliver one message and return the provider-assigned reference.
    async fn send(&self, from: &str, to: &str, body: &str) -> Result<String, BoxError>;
}

#[async_trait]
impl MessageSender for TwilioClient {
    async fn send(&self, from: &str, to: &str, body: &str) -> Result<String, BoxError> {
        self.send_message(from, to, body).await.map_err(Into::into)
    }
}

/// Dispatcher configuration, injected at construction.
#[derive(Debug, Clone, Default)]
pub struct DispatchConfig {
    /// Whether the provider path is enabled at all.
    pub enabled: bool,
    /// Sender address (the clinic's WhatsApp number).
    pub from_number: Option<String>,
    /// Recipient of internal booking notices.
    pub staff_number: Option<String>,
}

/// Sends composed messages to normalized addresses, absorbing all failures.
pub struct NotificationDispatcher {
    provider: Option<Arc<dyn MessageSender>>,
    config: DispatchConfig,
}

impl NotificationDispatcher {
    #[must_use]
    pub fn new(provider: Option<Arc<dyn MessageSender>>, config: DispatchConfig) -> Self {
        Self { provider, config }
    }

    /// Attempt one delivery for the given appointment and direction.
    ///
    /// Returns the provider message reference on success, a `local-`
    /// placeholder when the provider is disabled or unconfigured, and
    /// `None` on any failure. Never returns an error.
    pub async fn dispatch(&self, appointment: &Appointment, direction: Direction) -> Option<String> {
        let body = match direction {
            Direction::Confirmation => composer::confirmation_message(appointment),
            Direction::StaffNotice => composer::staff_notice(appointment),
        };

        let recipient = match direction {
            Direction::Confirmation => appointment.phone_number.clone(),
            Direction::StaffNotice => match &self.config.staff_number {
                Some(number) if !number.trim().is_empty() => number.clone(),
                _ => {
                    debug!(
                        appointment_id = %appointment.id,
                        "No staff number configured, skipping booking notice"
                    );
                    return None;
                }
            },
        };

        let from_number = self.config.from_number.as_deref().unwrap_or_default();
        let provider = match &self.provider {
            Some(provider) if self.config.enabled && !from_number.is_empty() => provider,
            _ => {
                info!(
                    appointment_id = %appointment.id,
                    ?direction,
                    to = %recipient,
                    %body,
                    "Messaging provider disabled, message logged only"
                );
                return Some(placeholder_reference());
            }
        };

        let to = match phone::normalize(&recipient) {
            Ok(to) => to,
            Err(e) => {
                error!(
                    appointment_id = %appointment.id,
                    ?direction,
                    error = %e,
                    "Invalid recipient address, notification dropped"
                );
                return None;
            }
        };
        let from = match phone::normalize(from_number) {
            Ok(from) => from,
            Err(e) => {
                error!(
                    appointment_id = %appointment.id,
                    ?direction,
                    error = %e,
                    "Invalid sender address, notification dropped"
                );
                return None;
            }
        };

        match provider.send(&from, &to, &body).await {
            Ok(reference) => {
                info!(
                    appointment_id = %appointment.id,
                    ?direction,
                    %reference,
                    "Notification sent"
                );
                Some(reference)
            }
            Err(e) => {
                // Absorbed: the appointment is already persisted and must
                // stay valid whatever the provider does.
                error!(
                    appointment_id = %appointment.id,
                    ?direction,
                    error = %e,
                    "Failed to send notification"
                );
                None
            }
        }
    }
}

/// Unique reference for sends skipped because the provider is off.
fn placeholder_reference() -> String {
    format!("{PLACEHOLDER_PREFIX}{}", Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, NaiveDate, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::db::models::AppointmentStatus;

    struct OkSender {
        reference: &'static str,
    }

    #[async_trait]
    impl MessageSender for OkSender {
        async fn send(&self, _from: &str, _to: &str, _body: &str) -> Result<String, BoxError> {
            Ok(self.reference.to_string())
        }
    }

    struct FailingSender;

    #[async_trait]
    impl MessageSender for FailingSender {
        async fn send(&self, _from: &str, _to: &str, _body: &str) -> Result<String, BoxError> {
            Err("connection timed out".into())
        }
    }

    fn test_appointment(phone: &str) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            patient_name: "Jane Doe".to_string(),
            phone_number: phone.to_string(),
            email: "jane@x.com".to_string(),
            appointment_date_time: NaiveDate::from_ymd_opt(2025, 1, 10)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            reason: None,
            notes: None,
            status: AppointmentStatus::Pending,
            whatsapp_message_id: None,
            created_at: DateTime::<Utc>::MIN_UTC,
        }
    }

    fn enabled_config() -> DispatchConfig {
        DispatchConfig {
            enabled: true,
            from_number: Some("+14155238886".to_string()),
            staff_number: Some("+14155230000".to_string()),
        }
    }

    #[tokio::test]
    async fn disabled_provider_returns_placeholder_reference() {
        let dispatcher = NotificationDispatcher::new(
            None,
            DispatchConfig {
                enabled: false,
                from_number: Some("+14155238886".to_string()),
                staff_number: None,
            },
        );
        let reference = dispatcher
            .dispatch(&test_appointment("555-123-4567"), Direction::Confirmation)
            .await;
        assert!(reference.unwrap().starts_with(PLACEHOLDER_PREFIX));
    }

    #[tokio::test]
    async fn missing_sender_address_returns_placeholder_reference() {
        let dispatcher = NotificationDispatcher::new(
            Some(Arc::new(OkSender { reference: "SM1" })),
            DispatchConfig {
                enabled: true,
                from_number: None,
                staff_number: None,
            },
        );
        let reference = dispatcher
            .dispatch(&test_appointment("555-123-4567"), Direction::Confirmation)
            .await;
        assert!(reference.unwrap().starts_with(PLACEHOLDER_PREFIX));
    }

    #[tokio::test]
    async fn successful_send_returns_provider_reference() {
        let dispatcher = NotificationDispatcher::new(
            Some(Arc::new(OkSender { reference: "SM123" })),
            enabled_config(),
        );
        let reference = dispatcher
            .dispatch(&test_appointment("555-123-4567"), Direction::Confirmation)
            .await;
        assert_eq!(reference.as_deref(), Some("SM123"));
    }

    #[tokio::test]
    async fn provider_failure_is_absorbed() {
        let dispatcher =
            NotificationDispatcher::new(Some(Arc::new(FailingSender)), enabled_config());
        let reference = dispatcher
            .dispatch(&test_appointment("555-123-4567"), Direction::Confirmation)
            .await;
        assert!(reference.is_none());
    }

    #[tokio::test]
    async fn malformed_recipient_is_absorbed() {
        let dispatcher = NotificationDispatcher::new(
            Some(Arc::new(OkSender { reference: "SM1" })),
            enabled_config(),
        );
        let reference = dispatcher
            .dispatch(&test_appointment("   "), Direction::Confirmation)
            .await;
        assert!(reference.is_none());
    }

    #[tokio::test]
    async fn staff_notice_goes_to_staff_number() {
        struct CaptureTo;

        #[async_trait]
        impl MessageSender for CaptureTo {
            async fn send(&self, _from: &str, to: &str, _body: &str) -> Result<String, BoxError> {
                Ok(to.to_string())
            }
        }

        let dispatcher = NotificationDispatcher::new(Some(Arc::new(CaptureTo)), enabled_config());
        let reference = dispatcher
            .dispatch(&test_appointment("555-123-4567"), Direction::StaffNotice)
            .await;
        assert_eq!(reference.as_deref(), Some("whatsapp:+14155230000"));
    }

    #[tokio::test]
    async fn staff_notice_without_staff_number_is_skipped() {
        let dispatcher = NotificationDispatcher::new(
            Some(Arc::new(OkSender { reference: "SM1" })),
            DispatchConfig {
                enabled: true,
                from_number: Some("+14155238886".to_string()),
                staff_number: None,
            },
        );
        let reference = dispatcher
            .dispatch(&test_appointment("555-123-4567"), Direction::StaffNotice)
            .await;
        assert!(reference.is_none());
    }
}
