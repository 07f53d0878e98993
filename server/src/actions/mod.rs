//! Store actions: the operations the HTTP layer exposes.
//!
//! Each action authorizes the caller through the identity gate, talks to the
//! store, and returns `Result<T, AppError>`. Handlers turn that into the
//! uniform JSON body.

pub mod calendar;
pub mod comments;
pub mod events;
pub mod roles;
pub mod signups;
pub mod slots;

use crate::utils::AppError;

pub(crate) fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

pub(crate) fn require_positive(field: &str, value: i32) -> Result<(), AppError> {
    if value <= 0 {
        return Err(AppError::Validation(format!("{} must be at least 1", field)));
    }
    Ok(())
}
