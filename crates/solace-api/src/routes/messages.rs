use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use solace_audit::events::AuditEvent;
use solace_core::models::conversation::Conversation;
use solace_core::validate::messages::{self, MessagesQuery};
use solace_core::validate::Params;
use solace_practice::error::PracticeError;
use solace_practice::messaging::SendOutcome;

use crate::client_ip::ClientIp;
use crate::error::ApiError;
use crate::rate_limit::Access;
use crate::routes::json_body;
use crate::state::AppState;

/// `GET /api/messages?type=conversations|messages&...`
pub async fn get_messages(
    State(state): State<AppState>,
    ip: ClientIp,
    Query(params): Query<Params>,
) -> Result<Response, ApiError> {
    state.limiter.check(Access::Read, "messages", ip.as_str())?;

    match messages::messages_query(&params)? {
        MessagesQuery::Conversations(query) => {
            let list = state.messaging.get_conversations(&query).await?;
            state.audit(
                AuditEvent::new("list_conversations", "conversation", ip.as_str()).with_details(
                    json!({
                        "filter": query.filter,
                        "count": list.conversations.len(),
                    }),
                ),
            );
            Ok(Json(list).into_response())
        }
        MessagesQuery::Messages(query) => {
            let page = state.messaging.get_messages(&query).await?;
            state.audit(
                AuditEvent::new("view_messages", "conversation", ip.as_str())
                    .with_resource_id(query.conversation_id)
                    .with_details(json!({ "count": page.messages.len() })),
            );
            Ok(Json(page).into_response())
        }
    }
}

/// `POST /api/messages`
pub async fn send_message(
    State(state): State<AppState>,
    ip: ClientIp,
    body: Bytes,
) -> Result<Json<SendOutcome>, ApiError> {
    state.limiter.check(Access::Write, "messages", ip.as_str())?;
    let compose = messages::compose_message(json_body(&body)?)?;

    let result = state.messaging.send_message(&compose).await;

    let event = AuditEvent::new("send_message", "message", ip.as_str()).with_details(json!({
        "patientId": compose.patient_id,
        "channelCode": compose.channel_code,
        "length": compose.content.chars().count(),
        "success": result.is_ok(),
    }));
    match &result {
        Ok(outcome) => state.audit(event.with_resource_id(outcome.message_id)),
        Err(PracticeError::Dispatch(_)) => state.audit(event),
        Err(_) => {}
    }

    Ok(Json(result?))
}

/// `PATCH /api/messages`
pub async fn update_conversation(
    State(state): State<AppState>,
    ip: ClientIp,
    body: Bytes,
) -> Result<Json<Conversation>, ApiError> {
    state.limiter.check(Access::Write, "messages", ip.as_str())?;
    let update = messages::conversation_update(json_body(&body)?)?;

    let conversation = state.messaging.update_conversation(&update).await?;
    state.audit(
        AuditEvent::new("update_conversation", "conversation", ip.as_str())
            .with_resource_id(conversation.id)
            .with_details(json!({ "action": update.action })),
    );
    Ok(Json(conversation))
}
