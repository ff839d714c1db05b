use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::channel::ChannelCode;

/// Maximum number of characters kept in [`Conversation::last_message_preview`].
pub const PREVIEW_LEN: usize = 120;

/// A patient-scoped thread aggregating messages across all channels.
///
/// Created implicitly by the first message for a patient and never deleted,
/// only archived.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Conversation {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub patient_name: String,
    pub last_message_at: jiff::Timestamp,
    pub last_message_channel: ChannelCode,
    pub last_message_preview: String,
    pub unread_count: u32,
    pub is_flagged: bool,
    pub archived: bool,
    pub created_at: jiff::Timestamp,
}

/// Conversation list filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ConversationFilter {
    #[default]
    All,
    Unread,
    Flagged,
    Archived,
}

impl ConversationFilter {
    pub fn matches(self, conversation: &Conversation) -> bool {
        match self {
            ConversationFilter::All => !conversation.archived,
            ConversationFilter::Unread => !conversation.archived && conversation.unread_count > 0,
            ConversationFilter::Flagged => !conversation.archived && conversation.is_flagged,
            ConversationFilter::Archived => conversation.archived,
        }
    }
}

/// State changes a provider can apply to a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ConversationAction {
    MarkRead,
    Flag,
    Unflag,
    Archive,
    Unarchive,
}

impl Conversation {
    pub fn apply(&mut self, action: ConversationAction) {
        match action {
            ConversationAction::MarkRead => self.unread_count = 0,
            ConversationAction::Flag => self.is_flagged = true,
            ConversationAction::Unflag => self.is_flagged = false,
            ConversationAction::Archive => self.archived = true,
            ConversationAction::Unarchive => self.archived = false,
        }
    }
}

/// Single-line preview of message content, ellipsised past [`PREVIEW_LEN`].
pub fn preview(content: &str) -> String {
    let flat = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_LEN {
        return flat;
    }
    let mut cut: String = flat.chars().take(PREVIEW_LEN - 1).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_flattens_whitespace() {
        assert_eq!(preview("See you\n\nThursday  at 3"), "See you Thursday at 3");
    }

    #[test]
    fn preview_truncates_long_content() {
        let p = preview(&"x".repeat(500));
        assert_eq!(p.chars().count(), PREVIEW_LEN);
        assert!(p.ends_with('…'));
    }
}
