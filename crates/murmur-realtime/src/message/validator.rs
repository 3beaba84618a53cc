//! Inbound frame validation.

use murmur_core::error::AppError;

/// Validates an inbound payload and parses it as JSON.
///
/// Rejects oversized, blank, and structurally invalid payloads.
pub fn validate_inbound(raw: &[u8], max_bytes: usize) -> Result<serde_json::Value, AppError> {
    if raw.len() > max_bytes {
        return Err(AppError::validation(format!(
            "Message exceeds maximum size of {max_bytes} bytes"
        )));
    }

    if raw.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::validation("Empty message"));
    }

    serde_json::from_slice(raw)
        .map_err(|e| AppError::validation(format!("Message is not valid JSON: {e}")))
}
