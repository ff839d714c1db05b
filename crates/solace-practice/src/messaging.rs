//! Messaging service: conversation list, message threads, compose/send.
//!
//! One conversation exists per patient and shares the patient's id. It is
//! created by the first message in either direction and afterwards tracks
//! the latest message's time, channel and preview. Only inbound messages raise `unreadCount`.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use ts_rs::TS;
use uuid::Uuid;

use solace_core::channel::{self, ChannelCode};
use solace_core::keys;
use solace_core::models::conversation::{self, Conversation};
use solace_core::models::message::{Message, MessageDirection, MessageStatus};
use solace_core::models::patient::Patient;
use solace_core::validate::messages::{
    ComposeMessage, ConversationQuery, ConversationUpdate, MessageQuery,
};
use solace_storage::error::StorageError;
use solace_storage::{SharedStore, json};

use crate::dispatch::MessageDispatcher;
use crate::error::PracticeError;
use crate::patients::PatientDirectory;

#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ConversationList {
    pub conversations: Vec<Conversation>,
    pub unread_total: u32,
}

#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MessagePage {
    /// Chronological, oldest first.
    pub messages: Vec<Message>,
    /// Pass back as `cursor` to fetch the preceding page.
    pub next_cursor: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SendOutcome {
    pub success: bool,
    pub message_id: Uuid,
    pub conversation_id: Uuid,
}

/// A message arriving from a patient.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub patient_id: Uuid,
    pub channel_code: ChannelCode,
    pub subject: Option<String>,
    pub content: String,
}

#[derive(Clone)]
pub struct MessagingService {
    store: SharedStore,
    patients: PatientDirectory,
    dispatcher: Arc<dyn MessageDispatcher>,
}

impl MessagingService {
    pub fn new(store: SharedStore, dispatcher: Arc<dyn MessageDispatcher>) -> Self {
        Self {
            patients: PatientDirectory::new(store.clone()),
            store,
            dispatcher,
        }
    }

    pub fn patients(&self) -> &PatientDirectory {
        &self.patients
    }

    pub async fn get_conversations(
        &self,
        query: &ConversationQuery,
    ) -> Result<ConversationList, PracticeError> {
        let all = self.all_conversations().await?;

        let unread_total = all
            .iter()
            .filter(|c| !c.archived)
            .map(|c| c.unread_count)
            .sum();

        let needle = query.search.as_deref().map(str::to_lowercase);
        let mut conversations: Vec<Conversation> = all
            .into_iter()
            .filter(|c| query.filter.matches(c))
            .filter(|c| query.channel_code.is_none_or(|code| c.last_message_channel == code))
            .filter(|c| query.patient_id.is_none_or(|id| c.patient_id == id))
            .filter(|c| {
                needle.as_deref().is_none_or(|n| {
                    c.patient_name.to_lowercase().contains(n)
                        || c.last_message_preview.to_lowercase().contains(n)
                })
            })
            .collect();

        conversations.sort_by(|a, b| {
            b.last_message_at
                .cmp(&a.last_message_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        conversations.truncate(query.limit as usize);

        Ok(ConversationList {
            conversations,
            unread_total,
        })
    }

    pub async fn get_messages(&self, query: &MessageQuery) -> Result<MessagePage, PracticeError> {
        self.load_conversation(query.conversation_id).await?;

        let mut messages: Vec<Message> = json::load_all(
            self.store.as_ref(),
            &keys::messages_prefix(query.conversation_id),
        )
        .await?;
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        let end = match query.cursor {
            Some(cursor) => messages
                .iter()
                .position(|m| m.id == cursor)
                .ok_or(PracticeError::InvalidCursor(cursor))?,
            None => messages.len(),
        };
        let start = end.saturating_sub(query.limit as usize);

        let page: Vec<Message> = messages.drain(start..end).collect();
        let next_cursor = if start > 0 {
            page.first().map(|m| m.id)
        } else {
            None
        };

        Ok(MessagePage {
            messages: page,
            next_cursor,
        })
    }

    /// Send an outbound message.
    ///
    /// The message is persisted even when dispatch fails, with status
    /// `failed`, and the failure is then returned to the caller.
    pub async fn send_message(&self, compose: &ComposeMessage) -> Result<SendOutcome, PracticeError> {
        let patient = self.patients.get(compose.patient_id).await?;

        let channel_code = compose.channel_code;
        if !patient.available_channels().contains(&channel_code) {
            return Err(PracticeError::ChannelUnavailable {
                channel: channel_code,
            });
        }
        channel::check_content(channel_code, &compose.content)?;

        let now = jiff::Timestamp::now();
        let mut conversation = self.conversation_for(&patient, channel_code, now).await?;

        let subject = compose
            .subject
            .clone()
            .filter(|_| channel_code.capability().supports_subject);
        let mut message = Message {
            id: Uuid::new_v4(),
            conversation_id: conversation.id,
            patient_id: patient.id,
            direction: MessageDirection::Outbound,
            channel_code,
            status: MessageStatus::Sent,
            subject,
            content_text: compose.content.clone(),
            attachments: Vec::new(),
            audio_url: None,
            error: None,
            created_at: now,
        };

        let failure = self.dispatcher.dispatch(&patient, &message).await.err();
        if let Some(reason) = &failure {
            warn!(
                message_id = %message.id,
                channel = %channel_code,
                reason = %reason,
                "dispatch failed"
            );
            message.status = MessageStatus::Failed;
            message.error = Some(reason.clone());
        }

        self.save_message(&message).await?;
        touch(&mut conversation, &message);
        conversation.archived = false;
        self.save_conversation(&conversation).await?;

        if let Some(reason) = failure {
            return Err(PracticeError::Dispatch(reason));
        }

        info!(
            message_id = %message.id,
            conversation_id = %conversation.id,
            channel = %channel_code,
            "message sent"
        );

        Ok(SendOutcome {
            success: true,
            message_id: message.id,
            conversation_id: conversation.id,
        })
    }

    /// Record a message received from a patient and bump the unread count.
    pub async fn record_inbound(&self, inbound: &InboundMessage) -> Result<Message, PracticeError> {
        let patient = self.patients.get(inbound.patient_id).await?;
        let now = jiff::Timestamp::now();
        let mut conversation = self
            .conversation_for(&patient, inbound.channel_code, now)
            .await?;

        let message = Message {
            id: Uuid::new_v4(),
            conversation_id: conversation.id,
            patient_id: patient.id,
            direction: MessageDirection::Inbound,
            channel_code: inbound.channel_code,
            status: MessageStatus::Delivered,
            subject: inbound.subject.clone(),
            content_text: inbound.content.clone(),
            attachments: Vec::new(),
            audio_url: None,
            error: None,
            created_at: now,
        };

        self.save_message(&message).await?;
        touch(&mut conversation, &message);
        conversation.unread_count += 1;
        self.save_conversation(&conversation).await?;

        Ok(message)
    }

    pub async fn update_conversation(
        &self,
        update: &ConversationUpdate,
    ) -> Result<Conversation, PracticeError> {
        let mut conversation = self.load_conversation(update.conversation_id).await?;
        conversation.apply(update.action);
        self.save_conversation(&conversation).await?;
        Ok(conversation)
    }

    async fn all_conversations(&self) -> Result<Vec<Conversation>, PracticeError> {
        Ok(json::load_all(self.store.as_ref(), keys::CONVERSATIONS_PREFIX).await?)
    }

    async fn load_conversation(&self, id: Uuid) -> Result<Conversation, PracticeError> {
        match json::load(self.store.as_ref(), &keys::conversation(id)).await {
            Ok(conversation) => Ok(conversation),
            Err(StorageError::NotFound { .. }) => Err(PracticeError::ConversationNotFound(id)),
            Err(e) => Err(e.into()),
        }
    }

    /// The patient's conversation, or a fresh unsaved one for a first message.
    ///
    /// The conversation id is the patient id, so concurrent first messages
    /// land on the same record instead of opening a second thread.
    async fn conversation_for(
        &self,
        patient: &Patient,
        channel_code: ChannelCode,
        now: jiff::Timestamp,
    ) -> Result<Conversation, PracticeError> {
        let key = keys::conversation_for_patient(patient.id);
        let existing: Option<Conversation> = json::load_opt(self.store.as_ref(), &key).await?;

        Ok(existing.unwrap_or_else(|| Conversation {
            id: patient.id,
            patient_id: patient.id,
            patient_name: patient.full_name(),
            last_message_at: now,
            last_message_channel: channel_code,
            last_message_preview: String::new(),
            unread_count: 0,
            is_flagged: false,
            archived: false,
            created_at: now,
        }))
    }

    async fn save_message(&self, message: &Message) -> Result<(), PracticeError> {
        let key = keys::message(message.conversation_id, message.id);
        json::save(self.store.as_ref(), &key, message).await?;
        Ok(())
    }

    async fn save_conversation(&self, conversation: &Conversation) -> Result<(), PracticeError> {
        json::save(
            self.store.as_ref(),
            &keys::conversation(conversation.id),
            conversation,
        )
        .await?;
        Ok(())
    }
}

fn touch(conversation: &mut Conversation, message: &Message) {
    conversation.last_message_at = message.created_at;
    conversation.last_message_channel = message.channel_code;
    conversation.last_message_preview = conversation::preview(&message.content_text);
}
