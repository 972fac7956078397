//! Domain models and request payloads.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Appointment lifecycle status matching the PostgreSQL enum.
///
/// Defaults to `Pending` at creation; changed only through the explicit
/// status-update operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "appointment_status", rename_all = "UPPERCASE")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl Default for AppointmentStatus {
    fn default() -> Self {
        AppointmentStatus::Pending
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "PENDING"),
            AppointmentStatus::Confirmed => write!(f, "CONFIRMED"),
            AppointmentStatus::Cancelled => write!(f, "CANCELLED"),
            AppointmentStatus::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// Appointment record.
///
/// `whatsapp_message_id` is set only after a successful confirmation
/// dispatch; it stays `None` when the provider call fails and is never
/// required for the record to be valid.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub patient_name: String,
    pub phone_number: String,
    pub email: String,
    pub appointment_date_time: NaiveDateTime,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub whatsapp_message_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Appointment creation payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRequest {
    pub patient_name: String,
    pub phone_number: String,
    pub email: String,
    pub appointment_date_time: NaiveDateTime,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Lead lifecycle status matching the PostgreSQL enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "lead_status", rename_all = "UPPERCASE")]
pub enum LeadStatus {
    New,
    Contacted,
    Converted,
    Lost,
}

impl Default for LeadStatus {
    fn default() -> Self {
        LeadStatus::New
    }
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeadStatus::New => write!(f, "NEW"),
            LeadStatus::Contacted => write!(f, "CONTACTED"),
            LeadStatus::Converted => write!(f, "CONVERTED"),
            LeadStatus::Lost => write!(f, "LOST"),
        }
    }
}

/// Source tag assigned to leads that arrive without one.
pub const DEFAULT_LEAD_SOURCE: &str = "WEBSITE";

/// Marketing/contact lead record.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub message: Option<String>,
    pub source: String,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
}

/// Lead creation payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRequest {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appointment_status_serializes_uppercase() {
        let json = serde_json::to_string(&AppointmentStatus::Pending).unwrap();
        assert_eq!(json, "\"PENDING\"");
        let back: AppointmentStatus = serde_json::from_str("\"CONFIRMED\"").unwrap();
        assert_eq!(back, AppointmentStatus::Confirmed);
    }

    #[test]
    fn appointment_request_accepts_missing_optional_fields() {
        let req: AppointmentRequest = serde_json::from_str(
            r#"{
                "patientName": "Jane Doe",
                "phoneNumber": "555-123-4567",
                "email": "jane@x.com",
                "appointmentDateTime": "2025-01-10T09:00:00"
            }"#,
        )
        .unwrap();
        assert_eq!(req.patient_name, "Jane Doe");
        assert!(req.reason.is_none());
        assert!(req.notes.is_none());
    }

    #[test]
    fn lead_status_defaults_to_new() {
        assert_eq!(LeadStatus::default(), LeadStatus::New);
    }
}
