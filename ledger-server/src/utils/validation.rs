//! Request field guards shared by the API handlers

use super::{AppError, AppResult};

pub const MAX_NAME_LEN: usize = 120;
pub const MAX_NOTE_LEN: usize = 500;
pub const MAX_REFERENCE_LEN: usize = 64;

/// Maximum allowed monetary amount per row
pub const MAX_AMOUNT: f64 = 1_000_000.0;
/// Maximum allowed quantity per line
pub const MAX_QUANTITY: i64 = 9999;

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
pub fn require_finite(value: f64, field_name: &str) -> AppResult<()> {
    if !value.is_finite() {
        return Err(AppError::validation(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    Ok(())
}

/// Amount must be finite, strictly positive and within bounds
pub fn validate_positive_amount(value: f64, field_name: &str) -> AppResult<()> {
    require_finite(value, field_name)?;
    if value <= 0.0 {
        return Err(AppError::validation(format!(
            "{} must be positive, got {}",
            field_name, value
        )));
    }
    if value > MAX_AMOUNT {
        return Err(AppError::validation(format!(
            "{} exceeds maximum allowed ({}), got {}",
            field_name, MAX_AMOUNT, value
        )));
    }
    Ok(())
}

/// Amount must be finite and >= 0
pub fn validate_non_negative_amount(value: f64, field_name: &str) -> AppResult<()> {
    require_finite(value, field_name)?;
    if value < 0.0 {
        return Err(AppError::validation(format!(
            "{} must be non-negative, got {}",
            field_name, value
        )));
    }
    if value > MAX_AMOUNT {
        return Err(AppError::validation(format!(
            "{} exceeds maximum allowed ({}), got {}",
            field_name, MAX_AMOUNT, value
        )));
    }
    Ok(())
}

/// Quantity must be positive and within bounds
pub fn validate_quantity(value: i64, field_name: &str) -> AppResult<()> {
    if value <= 0 {
        return Err(AppError::validation(format!(
            "{} must be positive, got {}",
            field_name, value
        )));
    }
    if value > MAX_QUANTITY {
        return Err(AppError::validation(format!(
            "{} exceeds maximum allowed ({}), got {}",
            field_name, MAX_QUANTITY, value
        )));
    }
    Ok(())
}

/// Required text: non-empty after trim, within the length limit
pub fn validate_required_text(value: &str, field_name: &str, max_len: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{} is required", field_name)));
    }
    if value.chars().count() > max_len {
        return Err(AppError::validation(format!(
            "{} exceeds maximum length of {} characters",
            field_name, max_len
        )));
    }
    Ok(())
}

/// Optional text: within the length limit when present
pub fn validate_optional_text(
    value: &Option<String>,
    field_name: &str,
    max_len: usize,
) -> AppResult<()> {
    if let Some(text) = value
        && text.chars().count() > max_len
    {
        return Err(AppError::validation(format!(
            "{} exceeds maximum length of {} characters",
            field_name, max_len
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_amount_rejects_zero_and_nan() {
        assert!(validate_positive_amount(0.0, "amount").is_err());
        assert!(validate_positive_amount(-5.0, "amount").is_err());
        assert!(validate_positive_amount(f64::NAN, "amount").is_err());
        assert!(validate_positive_amount(f64::INFINITY, "amount").is_err());
        assert!(validate_positive_amount(10.5, "amount").is_ok());
    }

    #[test]
    fn test_quantity_bounds() {
        assert!(validate_quantity(0, "quantity").is_err());
        assert!(validate_quantity(10_000, "quantity").is_err());
        assert!(validate_quantity(1, "quantity").is_ok());
    }

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("  ", "reason", 10).is_err());
        assert!(validate_required_text("damaged", "reason", 10).is_ok());
        assert!(validate_required_text("damaged too long", "reason", 10).is_err());
    }
}
