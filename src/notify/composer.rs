//! Notification message templates.
//!
//! Pure functions: output is fully determined by the appointment, so the
//! same record always produces the same message body.

use chrono::NaiveDateTime;

use crate::db::models::Appointment;

/// Build the confirmation message sent to the patient.
///
/// The reason line is included only when the reason is non-empty after
/// trimming.
pub fn confirmation_message(appointment: &Appointment) -> String {
    let mut message = String::new();
    message.push_str("🏥 *Appointment Confirmation*\n\n");
    message.push_str(&format!("Dear {},\n\n", appointment.patient_name));
    message.push_str("Your appointment has been scheduled:\n");
    message.push_str(&format!(
        "📅 Date & Time: {}\n",
        format_date_time(appointment.appointment_date_time)
    ));
    if let Some(reason) = trimmed_reason(appointment) {
        message.push_str(&format!("📋 Reason: {reason}\n"));
    }
    message.push_str("\nPlease arrive 10 minutes early.\n");
    message.push_str("If you need to reschedule, please contact us.\n\n");
    message.push_str("Thank you!");
    message
}

/// Build the internal booking notice sent to the staff number.
pub fn staff_notice(appointment: &Appointment) -> String {
    let mut message = String::new();
    message.push_str("📥 *New Appointment Request*\n\n");
    message.push_str(&format!("Patient: {}\n", appointment.patient_name));
    message.push_str(&format!("Phone: {}\n", appointment.phone_number));
    message.push_str(&format!(
        "📅 Date & Time: {}\n",
        format_date_time(appointment.appointment_date_time)
    ));
    if let Some(reason) = trimmed_reason(appointment) {
        message.push_str(&format!("📋 Reason: {reason}\n"));
    }
    message.push_str(&format!("\nStatus: {}", appointment.status));
    message
}

/// Render an appointment date-time in a stable human-readable format,
/// e.g. "Friday, January 10, 2025 at 09:00".
fn format_date_time(date_time: NaiveDateTime) -> String {
    date_time.format("%A, %B %-d, %Y at %H:%M").to_string()
}

fn trimmed_reason(appointment: &Appointment) -> Option<&str> {
    appointment
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
}
