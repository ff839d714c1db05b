use async_trait::async_trait;
use tracing::info;

use solace_core::models::message::Message;
use solace_core::models::patient::Patient;

/// Downstream transport for outbound messages (SMS gateway, mail relay, ...).
#[async_trait]
pub trait MessageDispatcher: Send + Sync {
    /// Hand the message to the transport. `Err` carries a human-readable reason.
    async fn dispatch(&self, patient: &Patient, message: &Message) -> Result<(), String>;
}

/// Records the dispatch in the log and reports success.
pub struct LoggingDispatcher;

#[async_trait]
impl MessageDispatcher for LoggingDispatcher {
    async fn dispatch(&self, patient: &Patient, message: &Message) -> Result<(), String> {
        info!(
            message_id = %message.id,
            patient_id = %patient.id,
            channel = %message.channel_code,
            chars = message.content_text.chars().count(),
            "message dispatched"
        );
        Ok(())
    }
}
