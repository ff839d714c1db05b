pub mod channels;
pub mod health;
pub mod import;
pub mod messages;
pub mod patients;
pub mod tasks;

use axum::Json;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use solace_core::validate::{ValidationErrors, parse_uuid};

/// A `{id}` path segment that must be a UUID.
pub(crate) fn path_id(raw: &str) -> Result<Uuid, ValidationErrors> {
    parse_uuid(raw).ok_or_else(|| ValidationErrors::single("id", "Invalid uuid"))
}

/// Decode a JSON body into its request type.
///
/// Handlers take the raw bytes and call this after the rate limit, so a
/// throttled client is refused before its body is looked at. Serde's
/// rejection (syntax, missing member, unknown enum value) becomes a form
/// error carrying the offending path.
pub(crate) fn json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ValidationErrors> {
    if body.is_empty() {
        return Err(ValidationErrors::form_error("Request body is required"));
    }
    Json::<T>::from_bytes(body)
        .map(|Json(value)| value)
        .map_err(|rejection| {
            ValidationErrors::form_error(format!("Invalid JSON body: {}", rejection.body_text()))
        })
}
