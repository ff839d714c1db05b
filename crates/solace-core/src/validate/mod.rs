//! Request validation schemas.
//!
//! Query strings are read from raw parameters. JSON bodies are deserialized
//! into the `*Request` types first (shape, enums, dates), then each schema
//! applies the checks serde cannot express: lengths, channel caps, strict
//! UUIDs, key traversal. Either way the result is a typed value or a
//! [`ValidationErrors`] in the flattened `{formErrors, fieldErrors}` shape the
//! front-end already renders.
//! The same functions back the API boundary and any server-side caller, so
//! limits like the SMS length cap live in exactly one place.

pub mod import;
pub mod messages;
pub mod patients;
pub mod tasks;

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::{Uuid, Variant};

/// Raw query-string parameters.
pub type Params = HashMap<String, String>;

pub const DEFAULT_LIMIT: u32 = 50;
pub const MAX_LIMIT: u32 = 100;

/// Flattened validation failure: errors that concern the whole input, and
/// errors keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationErrors {
    pub form_errors: Vec<String>,
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.field(field, message);
        errors
    }

    pub fn form_error(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.form(message);
        errors
    }

    pub fn field(&mut self, field: &str, message: impl Into<String>) {
        self.field_errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn form(&mut self, message: impl Into<String>) {
        self.form_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.field_errors.contains_key(field)
    }

    /// `Ok(value)` when nothing was recorded, otherwise `Err(self)`.
    pub fn finish<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.form_errors.clone();
        for (field, messages) in &self.field_errors {
            for message in messages {
                parts.push(format!("{field}: {message}"));
            }
        }
        write!(f, "invalid input: {}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Strict UUID check: hyphenated form, RFC-4122 variant, version 1–8 (or nil).
pub fn parse_uuid(raw: &str) -> Option<Uuid> {
    if raw.len() != 36 {
        return None;
    }
    let id = Uuid::try_parse(raw).ok()?;
    if id.is_nil() {
        return Some(id);
    }
    let version_ok = (1..=8).contains(&id.get_version_num());
    (version_ok && id.get_variant() == Variant::RFC4122).then_some(id)
}

// ── Query-string helpers ─────────────────────────────────────────────────────

/// A query parameter, treating an empty value as absent.
pub(crate) fn param<'a>(params: &'a Params, name: &str) -> Option<&'a str> {
    params.get(name).map(String::as_str).filter(|v| !v.is_empty())
}

/// Coerce an optional numeric parameter into `1..=MAX_LIMIT`.
pub(crate) fn limit(params: &Params, errors: &mut ValidationErrors) -> u32 {
    let Some(raw) = param(params, "limit") else {
        return DEFAULT_LIMIT;
    };
    match raw.trim().parse::<i64>() {
        Ok(n) if n < 1 => {
            errors.field("limit", "Number must be greater than or equal to 1");
            DEFAULT_LIMIT
        }
        Ok(n) if n > i64::from(MAX_LIMIT) => {
            errors.field(
                "limit",
                format!("Number must be less than or equal to {MAX_LIMIT}"),
            );
            DEFAULT_LIMIT
        }
        Ok(n) => n as u32,
        Err(_) => {
            errors.field("limit", "Expected number, received nan");
            DEFAULT_LIMIT
        }
    }
}

pub(crate) fn optional_uuid(
    value: Option<&str>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<Uuid> {
    let raw = value?;
    let parsed = parse_uuid(raw);
    if parsed.is_none() {
        errors.field(field, "Invalid uuid");
    }
    parsed
}

/// Match `raw` against a closed set of wire names.
pub(crate) fn one_of<T: Copy>(
    raw: &str,
    field: &str,
    options: &[(&'static str, T)],
    errors: &mut ValidationErrors,
) -> Option<T> {
    if let Some((_, value)) = options.iter().find(|(name, _)| *name == raw) {
        return Some(*value);
    }
    let expected = options
        .iter()
        .map(|(name, _)| format!("'{name}'"))
        .collect::<Vec<_>>()
        .join(" | ");
    errors.field(
        field,
        format!("Invalid enum value. Expected {expected}, received '{raw}'"),
    );
    None
}

pub(crate) fn max_chars(value: &str, max: usize, field: &str, errors: &mut ValidationErrors) {
    if value.chars().count() > max {
        errors.field(
            field,
            format!("String must contain at most {max} character(s)"),
        );
    }
}

// ── Request body helpers ─────────────────────────────────────────────────────

/// `deserialize_with` for patch fields where `null` differs from absent:
/// absent stays `None` (via `#[serde(default)]`), `null` becomes `Some(None)`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Strict UUID check for an id carried in a request body.
pub(crate) fn body_uuid(raw: &str, field: &str, errors: &mut ValidationErrors) -> Option<Uuid> {
    optional_uuid(Some(raw.trim()), field, errors)
}

/// Trim a free-text field; blank means absent.
pub(crate) fn trimmed(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
