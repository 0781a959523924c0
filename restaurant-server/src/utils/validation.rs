//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement, so limits are applied
//! at the API boundary.

use chrono::NaiveDate;

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: customer, menu item
pub const MAX_NAME_LEN: usize = 200;

/// Menu item descriptions
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Phone numbers
pub const MAX_PHONE_LEN: usize = 15;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

// ── Validation helpers (CRUD handlers) ──────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate an optional email address: length plus a minimal shape check.
pub fn validate_optional_email(value: &Option<String>) -> Result<(), AppError> {
    if let Some(email) = value {
        if email.len() > MAX_EMAIL_LEN {
            return Err(AppError::validation(format!(
                "email is too long ({} chars, max {MAX_EMAIL_LEN})",
                email.len()
            )));
        }
        if !email.contains('@') {
            return Err(AppError::validation("email is not a valid address"));
        }
    }
    Ok(())
}

/// Validate an ISO date string (YYYY-MM-DD).
pub fn validate_date(value: &str, field: &str) -> Result<(), AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("{field} must be an ISO date (YYYY-MM-DD)")))?;
    Ok(())
}

/// Validate that a quantity is a positive integer.
pub fn validate_quantity(quantity: i32, field: &str) -> Result<(), AppError> {
    if quantity <= 0 {
        return Err(AppError::validation(format!(
            "{field} must be positive: {quantity}"
        )));
    }
    Ok(())
}

/// Validate that a price is finite and non-negative.
pub fn validate_price(price: f64, field: &str) -> Result<(), AppError> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::validation(format!(
            "{field} must be non-negative: {price}"
        )));
    }
    Ok(())
}
