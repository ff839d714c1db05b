use std::sync::Arc;

use solace_audit::events::AuditEvent;
use solace_audit::log::AuditLog;
use solace_import::wizard::ImportWizard;
use solace_practice::messaging::MessagingService;
use solace_practice::patients::PatientDirectory;
use solace_practice::tasks::TaskService;
use solace_storage::SharedStore;

use crate::rate_limit::RateLimiter;

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub messaging: MessagingService,
    pub tasks: TaskService,
    pub imports: Arc<ImportWizard>,
    pub audit: AuditLog,
    pub limiter: RateLimiter,
}

impl AppState {
    pub fn patients(&self) -> &PatientDirectory {
        self.messaging.patients()
    }

    /// Record an audit event without waiting for the write.
    pub fn audit(&self, event: AuditEvent) {
        drop(self.audit.record(event));
    }
}
