use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::channel::ChannelCode;

/// A single message within a [`Conversation`](super::conversation::Conversation).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub patient_id: Uuid,
    pub direction: MessageDirection,
    pub channel_code: ChannelCode,
    pub status: MessageStatus,
    #[serde(default)]
    pub subject: Option<String>,
    pub content_text: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub audio_url: Option<String>,
    /// Failure reason reported by the transport when `status` is `failed`.
    #[serde(default)]
    pub error: Option<String>,
    pub created_at: jiff::Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum MessageDirection {
    Inbound,
    Outbound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum MessageStatus {
    Sent,
    Delivered,
    Read,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Attachment {
    pub name: String,
    pub object_key: String,
    pub content_type: String,
    pub size_bytes: u64,
}
