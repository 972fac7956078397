//! Request validation for business rules.
//!
//! Validation runs before any persistence; a failure here means nothing
//! was written. Messages follow the `field: description` shape so clients
//! can attribute each violation.

use crate::db::models::{AppointmentRequest, LeadRequest};
use crate::error::AppError;

/// Maximum name length.
pub const MAX_NAME_LENGTH: usize = 255;
/// Maximum email length.
pub const MAX_EMAIL_LENGTH: usize = 255;
/// Maximum phone number length.
pub const MAX_PHONE_LENGTH: usize = 32;
/// Maximum appointment reason length.
pub const MAX_REASON_LENGTH: usize = 500;
/// Maximum appointment notes length.
pub const MAX_NOTES_LENGTH: usize = 1000;
/// Maximum lead message length.
pub const MAX_MESSAGE_LENGTH: usize = 500;

/// Validate an appointment creation request.
///
/// # Errors
/// Returns `AppError::InvalidArgument` with a field violation message for
/// the first failing rule.
pub fn validate_appointment(request: &AppointmentRequest) -> Result<(), AppError> {
    validate_name("patientName", &request.patient_name)?;
    validate_phone("phoneNumber", &request.phone_number)?;
    validate_email("email", &request.email)?;
    validate_optional_length("reason", request.reason.as_deref(), MAX_REASON_LENGTH)?;
    validate_optional_length("notes", request.notes.as_deref(), MAX_NOTES_LENGTH)?;
    Ok(())
}

/// Validate a lead creation request.
///
/// # Errors
/// Returns `AppError::InvalidArgument` with a field violation message for
/// the first failing rule.
pub fn validate_lead(request: &LeadRequest) -> Result<(), AppError> {
    validate_name("name", &request.name)?;
    validate_email("email", &request.email)?;
    validate_phone("phoneNumber", &request.phone_number)?;
    validate_optional_length("message", request.message.as_deref(), MAX_MESSAGE_LENGTH)?;
    Ok(())
}

fn validate_name(field: &str, name: &str) -> Result<(), AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::field_violation(field, "Name cannot be empty"));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(AppError::field_violation(
            field,
            &format!("Name must not exceed {MAX_NAME_LENGTH} characters"),
        ));
    }
    Ok(())
}

fn validate_phone(field: &str, phone: &str) -> Result<(), AppError> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(AppError::field_violation(
            field,
            "Phone number cannot be empty",
        ));
    }
    if phone.len() > MAX_PHONE_LENGTH {
        return Err(AppError::field_violation(
            field,
            &format!("Phone number must not exceed {MAX_PHONE_LENGTH} characters"),
        ));
    }
    if !phone.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::field_violation(
            field,
            "Phone number must contain digits",
        ));
    }
    Ok(())
}

fn validate_email(field: &str, email: &str) -> Result<(), AppError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AppError::field_violation(field, "Email cannot be empty"));
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(AppError::field_violation(
            field,
            &format!("Email must not exceed {MAX_EMAIL_LENGTH} characters"),
        ));
    }
    if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(AppError::field_violation(field, "Invalid email format"));
    }
    Ok(())
}

fn validate_optional_length(
    field: &str,
    value: Option<&str>,
    max_length: usize,
) -> Result<(), AppError> {
    if let Some(value) = value {
        if value.len() > max_length {
            return Err(AppError::field_violation(
                field,
                &format!("Must not exceed {max_length} characters"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn appointment_request() -> AppointmentRequest {
        AppointmentRequest {
            patient_name: "Jane Doe".to_string(),
            phone_number: "555-123-4567".to_string(),
            email: "jane@x.com".to_string(),
            appointment_date_time: NaiveDate::from_ymd_opt(2025, 1, 10)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            reason: None,
            notes: None,
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(validate_appointment(&appointment_request()).is_ok());
    }

    #[test]
    fn empty_phone_is_rejected() {
        let mut request = appointment_request();
        request.phone_number = "".to_string();
        let err = validate_appointment(&request).unwrap_err();
        assert!(err.to_string().contains("phoneNumber"));
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut request = appointment_request();
        request.patient_name = "   ".to_string();
        assert!(validate_appointment(&request).is_err());
    }

    #[test]
    fn malformed_email_is_rejected() {
        let mut request = appointment_request();
        for email in ["not-an-email", "@x.com", "jane@"] {
            request.email = email.to_string();
            assert!(validate_appointment(&request).is_err(), "{email}");
        }
    }

    #[test]
    fn oversized_reason_is_rejected() {
        let mut request = appointment_request();
        request.reason = Some("x".repeat(MAX_REASON_LENGTH + 1));
        assert!(validate_appointment(&request).is_err());
    }

    #[test]
    fn lead_without_message_passes() {
        let request = LeadRequest {
            name: "John".to_string(),
            email: "john@x.com".to_string(),
            phone_number: "555-000-1111".to_string(),
            message: None,
            source: None,
        };
        assert!(validate_lead(&request).is_ok());
    }
}
