use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// A structured audit event for an API action.
///
/// `actor` is the client address the request arrived from; there is no
/// user identity at this layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    pub occurred_at: jiff::Timestamp,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub actor: String,
    pub details: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn new(
        action: impl Into<String>,
        resource_type: impl Into<String>,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            occurred_at: jiff::Timestamp::now(),
            action: action.into(),
            resource_type: resource_type.into(),
            resource_id: None,
            actor: actor.into(),
            details: None,
        }
    }

    pub fn with_resource_id(mut self, resource_id: impl ToString) -> Self {
        self.resource_id = Some(resource_id.to_string());
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// UTC calendar day the event belongs to.
    pub fn day(&self) -> jiff::civil::Date {
        self.occurred_at.to_zoned(jiff::tz::TimeZone::UTC).date()
    }

    /// Emit this audit event via tracing.
    pub fn emit(&self) {
        info!(
            audit.id = %self.id,
            audit.action = %self.action,
            audit.resource_type = %self.resource_type,
            audit.resource_id = self.resource_id.as_deref().unwrap_or("-"),
            audit.actor = %self.actor,
            "audit event"
        );
    }
}
