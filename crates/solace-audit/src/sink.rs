use async_trait::async_trait;

use solace_core::keys;
use solace_storage::{SharedStore, json};

use crate::error::AuditError;
use crate::events::AuditEvent;

/// Destination for audit events.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn write(&self, event: &AuditEvent) -> Result<(), AuditError>;
}

/// Writes each event as a JSON object under `audit/{day}/`.
pub struct StoreSink {
    store: SharedStore,
}

impl StoreSink {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AuditSink for StoreSink {
    async fn write(&self, event: &AuditEvent) -> Result<(), AuditError> {
        let key = keys::audit_event(event.day(), event.id);
        json::save(self.store.as_ref(), &key, event).await?;
        Ok(())
    }
}

/// Read back every event recorded on a UTC day, oldest first.
pub async fn load_day(
    store: &SharedStore,
    day: jiff::civil::Date,
) -> Result<Vec<AuditEvent>, AuditError> {
    let mut events: Vec<AuditEvent> =
        json::load_all(store.as_ref(), &keys::audit_day_prefix(day)).await?;
    events.sort_by_key(|e| e.occurred_at);
    Ok(events)
}
