use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer};

use crate::error::AppError;

/// Total digits allowed in a price, fractional digits included.
pub const PRICE_MAX_DIGITS: u32 = 7;
/// Fractional digits allowed in a price.
pub const PRICE_DECIMAL_PLACES: u32 = 2;

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Unicode case folding shared by stored search columns and search terms.
pub fn fold_case(s: &str) -> String {
    s.to_lowercase()
}

/// Serde helper for PATCH semantics on nullable fields.
///
/// * JSON field absent  => `None`          (don't update)
/// * JSON field = null  => `Some(None)`    (set to NULL)
/// * JSON field = value => `Some(Some(v))` (set to value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Trim a required text field and check it is 1..=`max_chars` Unicode characters.
pub fn validate_text(field: &'static str, value: &str, max_chars: usize) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::invalid_field(field, "This field may not be blank"));
    }
    if value.chars().count() > max_chars {
        return Err(AppError::invalid_field(
            field,
            format!("Ensure this field has no more than {max_chars} characters"),
        ));
    }
    Ok(value.to_string())
}

/// Convert a decimal amount to integer cents, enforcing the price precision
/// (at most 7 digits, 2 of them fractional). Sign is not checked here.
pub fn decimal_to_cents(field: &'static str, value: Decimal) -> Result<i64, AppError> {
    let value = value.normalize();
    if value.scale() > PRICE_DECIMAL_PLACES {
        return Err(AppError::invalid_field(
            field,
            format!("Ensure that there are no more than {PRICE_DECIMAL_PLACES} decimal places"),
        ));
    }
    let limit = Decimal::from(10i64.pow(PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES));
    if value.abs() >= limit {
        return Err(AppError::invalid_field(
            field,
            format!("Ensure that there are no more than {PRICE_MAX_DIGITS} digits in total"),
        ));
    }
    (value * Decimal::ONE_HUNDRED)
        .to_i64()
        .ok_or_else(|| AppError::invalid_field(field, "A valid number is required"))
}

/// Render stored cents as a two-decimal amount (`12345` => `123.45`).
pub fn cents_to_decimal(cents: i64) -> Decimal {
    Decimal::new(cents, PRICE_DECIMAL_PLACES)
}
