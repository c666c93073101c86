//! Natural-key validation.
//!
//! Category names and serial numbers are the lookup keys of the catalog, so
//! they must be non-empty and free of control characters. Anything else,
//! including spaces and punctuation such as `#`, is accepted.

use crate::error::{Result, TypeError};

/// Validate a category name.
///
/// ```
/// use catalog_types::validate_category_name;
///
/// assert!(validate_category_name("Resistors").is_ok());
/// assert!(validate_category_name("").is_err());
/// ```
pub fn validate_category_name(name: &str) -> Result<()> {
    validate_key(name, "category name")
}

/// Validate a part serial number.
pub fn validate_serial_number(serial_number: &str) -> Result<()> {
    validate_key(serial_number, "serial number")
}

fn validate_key(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TypeError::InvalidName {
            name: value.to_string(),
            reason: format!("{what} must not be empty"),
        });
    }

    if let Some(ch) = value.chars().find(|c| c.is_control()) {
        return Err(TypeError::InvalidName {
            name: value.to_string(),
            reason: format!("{what} contains control character {ch:?}"),
        });
    }

    Ok(())
}
