use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::warn;

use crate::error::AuditError;
use crate::events::AuditEvent;
use crate::sink::AuditSink;

/// Fire-and-forget front end for an [`AuditSink`].
#[derive(Clone)]
pub struct AuditLog {
    sink: Arc<dyn AuditSink>,
}

impl AuditLog {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    /// Emit the event and write it to the sink in the background.
    ///
    /// The returned handle may be dropped; sink failures are logged at
    /// `warn` and otherwise ignored.
    pub fn record(&self, event: AuditEvent) -> JoinHandle<()> {
        event.emit();
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            if let Err(e) = sink.write(&event).await {
                warn!(audit.id = %event.id, audit.action = %event.action, error = %e, "audit write failed");
            }
        })
    }

    /// Emit the event and wait for the sink write.
    pub async fn write(&self, event: &AuditEvent) -> Result<(), AuditError> {
        event.emit();
        self.sink.write(event).await
    }
}
