use thiserror::Error;
use uuid::Uuid;

use solace_core::channel::ChannelCode;
use solace_core::error::CoreError;
use solace_storage::error::StorageError;

#[derive(Debug, Error)]
pub enum PracticeError {
    #[error("patient not found: {0}")]
    PatientNotFound(Uuid),

    #[error("conversation not found: {0}")]
    ConversationNotFound(Uuid),

    #[error("task not found: {0}")]
    TaskNotFound(Uuid),

    #[error("cursor {0} does not belong to this conversation")]
    InvalidCursor(Uuid),

    #[error("{channel} is not available for this patient")]
    ChannelUnavailable { channel: ChannelCode },

    #[error(transparent)]
    Content(#[from] CoreError),

    #[error("message delivery failed: {0}")]
    Dispatch(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
