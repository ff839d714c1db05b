//! solace-audit
//!
//! Best-effort audit trail of read and write actions. Events are emitted via
//! `tracing` and written to an [`AuditSink`]; a failed write is logged and
//! never surfaces to the caller.

pub mod error;
pub mod events;
pub mod log;
pub mod sink;

pub use events::AuditEvent;
pub use log::AuditLog;
pub use sink::{AuditSink, StoreSink};
