//! Phone number normalization for the WhatsApp channel.

use crate::error::AppError;

/// Channel scheme tag required by the provider.
pub const CHANNEL_PREFIX: &str = "whatsapp:";

/// Normalize a free-form phone number into a provider address.
///
/// Strips whitespace, hyphens, and parentheses, then ensures the result
/// carries the `whatsapp:` channel prefix followed by a leading `+` -
/// including when the input already carries the prefix but no sign.
/// Idempotent: an already-canonical address is returned unchanged.
///
/// # Errors
/// Returns `AppError::InvalidArgument` if the input is empty after trimming.
pub fn normalize(phone_number: &str) -> Result<String, AppError> {
    let cleaned: String = phone_number
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect();

    if cleaned.is_empty() {
        return Err(AppError::InvalidArgument(
            "Phone number cannot be empty".to_string(),
        ));
    }

    let number = cleaned.strip_prefix(CHANNEL_PREFIX).unwrap_or(&cleaned);
    let with_sign = if number.starts_with('+') {
        number.to_string()
    } else {
        format!("+{number}")
    };

    Ok(format!("{CHANNEL_PREFIX}{with_sign}"))
}
