//! # Secret Resolution
//!
//! Reads the frontend secret referenced by `spec.credentials.secretRef`.

use crate::constants::MIN_SECRET_LENGTH;
use crate::controller::reconciler::types::SecretError;
use crate::crd::SecretKeyRef;
use crate::store::SecretStore;
use tracing::debug;
use zeroize::Zeroizing;

/// Fetch `reference` from `namespace` and return its value
///
/// The value is wiped from memory when dropped.
///
/// # Errors
/// `NotFound` if the secret or key is absent, `InvalidEncoding` for non UTF-8
/// bytes, `TooShort` below the minimum length.
pub async fn resolve_frontend_secret(
    store: &dyn SecretStore,
    namespace: &str,
    reference: &SecretKeyRef,
) -> Result<Zeroizing<String>, SecretError> {
    let secret_id = format!("{namespace}/{}", reference.name);
    let not_found = || SecretError::NotFound {
        secret: secret_id.clone(),
        key: reference.key.clone(),
    };

    let secret = store
        .get(namespace, &reference.name)
        .await?
        .ok_or_else(not_found)?;

    let bytes = secret
        .data
        .as_ref()
        .and_then(|data| data.get(&reference.key))
        .ok_or_else(not_found)?;

    let value = match std::str::from_utf8(&bytes.0) {
        Ok(text) => Zeroizing::new(text.to_owned()),
        Err(_utf8_error) => {
            return Err(SecretError::InvalidEncoding {
                secret: secret_id,
                key: reference.key.clone(),
            })
        }
    };

    let length = value.chars().count();
    if length < MIN_SECRET_LENGTH {
        return Err(SecretError::TooShort {
            secret: secret_id,
            key: reference.key.clone(),
            length,
            min: MIN_SECRET_LENGTH,
        });
    }

    debug!("Resolved frontend secret from {}[{}]", secret_id, reference.key);
    Ok(value)
}
