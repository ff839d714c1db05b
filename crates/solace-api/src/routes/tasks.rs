use std::convert::Infallible;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;

use solace_audit::events::AuditEvent;
use solace_core::models::task::SubstrateTask;
use solace_core::validate::{Params, tasks};

use crate::client_ip::ClientIp;
use crate::error::ApiError;
use crate::rate_limit::Access;
use crate::routes::{json_body, path_id};
use crate::state::AppState;

/// `GET /api/tasks?status=&patientId=&limit=`
pub async fn list_tasks(
    State(state): State<AppState>,
    ip: ClientIp,
    Query(params): Query<Params>,
) -> Result<Json<Vec<SubstrateTask>>, ApiError> {
    state.limiter.check(Access::Read, "tasks", ip.as_str())?;
    let query = tasks::task_query(&params)?;

    let tasks = state.tasks.list(&query).await?;
    state.audit(
        AuditEvent::new("list_tasks", "task", ip.as_str())
            .with_details(json!({ "status": query.status, "count": tasks.len() })),
    );
    Ok(Json(tasks))
}

/// `POST /api/tasks`
pub async fn create_task(
    State(state): State<AppState>,
    ip: ClientIp,
    body: Bytes,
) -> Result<(StatusCode, Json<SubstrateTask>), ApiError> {
    state.limiter.check(Access::Write, "tasks", ip.as_str())?;
    let new = tasks::task_create(json_body(&body)?)?;

    let task = state.tasks.create(new).await?;
    state.audit(AuditEvent::new("create_task", "task", ip.as_str()).with_resource_id(task.id));
    Ok((StatusCode::CREATED, Json(task)))
}

/// `PATCH /api/tasks/{id}`
pub async fn update_task(
    State(state): State<AppState>,
    ip: ClientIp,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<SubstrateTask>, ApiError> {
    state.limiter.check(Access::Write, "tasks", ip.as_str())?;
    let id = path_id(&id)?;
    let patch = tasks::task_update(json_body(&body)?)?;

    let task = state.tasks.update(id, patch).await?;
    state.audit(
        AuditEvent::new("update_task", "task", ip.as_str())
            .with_resource_id(id)
            .with_details(json!({ "status": task.status })),
    );
    Ok(Json(task))
}

/// `DELETE /api/tasks/{id}`
pub async fn delete_task(
    State(state): State<AppState>,
    ip: ClientIp,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.limiter.check(Access::Write, "tasks", ip.as_str())?;
    let id = path_id(&id)?;

    state.tasks.delete(id).await?;
    state.audit(AuditEvent::new("delete_task", "task", ip.as_str()).with_resource_id(id));
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/tasks/events`: the task change feed as server-sent events.
///
/// Each change is a `task` event carrying a JSON [`TaskChange`]. A subscriber
/// that falls behind the feed gets a `resync` event and should refetch.
///
/// [`TaskChange`]: solace_core::models::task::TaskChange
pub async fn task_events(
    State(state): State<AppState>,
    ip: ClientIp,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    state.limiter.check(Access::Read, "tasks", ip.as_str())?;
    let receiver = state.tasks.subscribe();

    let stream = futures::stream::unfold(receiver, |mut receiver| async move {
        loop {
            let event = match receiver.recv().await {
                Ok(change) => match Event::default().event("task").json_data(&change) {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to encode task change");
                        continue;
                    }
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "task feed subscriber lagged");
                    Event::default().event("resync").data(skipped.to_string())
                }
                Err(RecvError::Closed) => return None,
            };
            return Some((Ok::<_, Infallible>(event), receiver));
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
