use serde::Deserialize;
use uuid::Uuid;

use super::{
    Params, ValidationErrors, body_uuid, limit, max_chars, one_of, optional_uuid, param, trimmed,
};
use crate::channel::{self, ChannelCode};
use crate::error::CoreError;
use crate::models::conversation::{ConversationAction, ConversationFilter};

pub const MAX_CONTENT_LEN: usize = 10_000;
pub const MAX_SUBJECT_LEN: usize = 200;
pub const MAX_SEARCH_LEN: usize = 200;

const CHANNELS: [(&str, ChannelCode); 6] = [
    ("sms", ChannelCode::Sms),
    ("email", ChannelCode::Email),
    ("voice", ChannelCode::Voice),
    ("fax", ChannelCode::Fax),
    ("in_app", ChannelCode::InApp),
    ("chat", ChannelCode::Chat),
];

const FILTERS: [(&str, ConversationFilter); 4] = [
    ("all", ConversationFilter::All),
    ("unread", ConversationFilter::Unread),
    ("flagged", ConversationFilter::Flagged),
    ("archived", ConversationFilter::Archived),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationQuery {
    pub filter: ConversationFilter,
    pub channel_code: Option<ChannelCode>,
    pub search: Option<String>,
    pub patient_id: Option<Uuid>,
    pub limit: u32,
}

impl Default for ConversationQuery {
    fn default() -> Self {
        Self {
            filter: ConversationFilter::All,
            channel_code: None,
            search: None,
            patient_id: None,
            limit: super::DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageQuery {
    pub conversation_id: Uuid,
    pub limit: u32,
    /// Id of the oldest message already shown; only older messages are returned.
    pub cursor: Option<Uuid>,
}

/// The two shapes `GET /api/messages` serves, selected by `type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagesQuery {
    Conversations(ConversationQuery),
    Messages(MessageQuery),
}

/// `GET /api/messages?type=conversations|messages&...`
pub fn messages_query(params: &Params) -> Result<MessagesQuery, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let kind = match param(params, "type") {
        Some(raw) => one_of(
            raw,
            "type",
            &[("conversations", true), ("messages", false)],
            &mut errors,
        ),
        None => {
            errors.field("type", "Required");
            None
        }
    };
    let limit = limit(params, &mut errors);

    let query = match kind {
        Some(true) => {
            let filter = param(params, "filter")
                .and_then(|raw| one_of(raw, "filter", &FILTERS, &mut errors))
                .unwrap_or_default();
            let channel_code = param(params, "channelCode")
                .and_then(|raw| one_of(raw, "channelCode", &CHANNELS, &mut errors));
            let search = param(params, "search").and_then(|raw| {
                max_chars(raw, MAX_SEARCH_LEN, "search", &mut errors);
                let trimmed = raw.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            });
            let patient_id = optional_uuid(param(params, "patientId"), "patientId", &mut errors);
            Some(MessagesQuery::Conversations(ConversationQuery {
                filter,
                channel_code,
                search,
                patient_id,
                limit,
            }))
        }
        Some(false) => {
            let conversation_id =
                optional_uuid(param(params, "conversationId"), "conversationId", &mut errors);
            if param(params, "conversationId").is_none() {
                errors.field("conversationId", "Required");
            }
            let cursor = optional_uuid(param(params, "cursor"), "cursor", &mut errors);
            conversation_id.map(|conversation_id| {
                MessagesQuery::Messages(MessageQuery {
                    conversation_id,
                    limit,
                    cursor,
                })
            })
        }
        None => None,
    };

    match query {
        Some(query) if errors.is_empty() => Ok(query),
        _ => Err(errors),
    }
}

/// Body of `POST /api/messages`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeRequest {
    pub patient_id: String,
    pub channel_code: ChannelCode,
    #[serde(default)]
    pub subject: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeMessage {
    pub patient_id: Uuid,
    pub channel_code: ChannelCode,
    pub subject: Option<String>,
    pub content: String,
}

/// `POST /api/messages`
///
/// Enforces the channel's content cap here, before the request reaches the
/// messaging service.
pub fn compose_message(request: ComposeRequest) -> Result<ComposeMessage, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let patient_id = body_uuid(&request.patient_id, "patientId", &mut errors);

    if let Some(subject) = &request.subject {
        max_chars(subject, MAX_SUBJECT_LEN, "subject", &mut errors);
    }
    let subject = trimmed(request.subject);

    let content = request.content;
    if content.trim().is_empty() {
        errors.field("content", "Message content is required");
    } else {
        max_chars(&content, MAX_CONTENT_LEN, "content", &mut errors);
        check_channel_content(request.channel_code, &content, &mut errors);
    }

    match patient_id {
        Some(patient_id) if errors.is_empty() => Ok(ComposeMessage {
            patient_id,
            channel_code: request.channel_code,
            subject,
            content,
        }),
        _ => Err(errors),
    }
}

fn check_channel_content(channel: ChannelCode, content: &str, errors: &mut ValidationErrors) {
    if let Err(CoreError::ContentTooLong { channel: name, limit, .. }) =
        channel::check_content(channel, content)
    {
        errors.field(
            "content",
            format!("{name} messages are limited to {limit} characters"),
        );
    }
}

/// Body of `PATCH /api/messages`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationUpdateRequest {
    pub conversation_id: String,
    pub action: ConversationAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationUpdate {
    pub conversation_id: Uuid,
    pub action: ConversationAction,
}

/// `PATCH /api/messages`
pub fn conversation_update(
    request: ConversationUpdateRequest,
) -> Result<ConversationUpdate, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    match body_uuid(&request.conversation_id, "conversationId", &mut errors) {
        Some(conversation_id) => Ok(ConversationUpdate {
            conversation_id,
            action: request.action,
        }),
        None => Err(errors),
    }
}
