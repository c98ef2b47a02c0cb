//! Request validation helpers shared by HTTP handlers.

use crate::domain::Error;

/// Build the validation error for a missing request field.
pub fn missing_field_error(field: &str) -> Error {
    Error::validation_failed(format!("missing required field: {field}"))
}

/// Reject non-positive identifiers before they reach a repository.
pub fn require_positive_id(value: i64, field: &str) -> Result<i64, Error> {
    if value <= 0 {
        return Err(Error::validation_failed(format!(
            "{field} must be a positive identifier"
        )));
    }
    Ok(value)
}
