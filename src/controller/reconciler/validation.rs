//! # Validation
//!
//! Preconditions checked before a frontend is created.

use crate::controller::reconciler::types::ValidationError;
use crate::crd::{BBBFrontendSpec, Credentials};

/// Return the credentials of `spec` if they are complete
///
/// # Errors
/// Returns the first missing or empty field.
pub fn validate_credentials(spec: &BBBFrontendSpec) -> Result<&Credentials, ValidationError> {
    let credentials = spec
        .credentials
        .as_ref()
        .ok_or(ValidationError::MissingCredentials)?;

    if credentials.frontend_key.trim().is_empty() {
        return Err(ValidationError::EmptyFrontendKey);
    }
    if credentials.secret_ref.name.trim().is_empty() || credentials.secret_ref.key.trim().is_empty()
    {
        return Err(ValidationError::EmptySecretRef);
    }

    Ok(credentials)
}
