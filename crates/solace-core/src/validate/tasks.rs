use serde::Deserialize;
use uuid::Uuid;

use super::{
    Params, ValidationErrors, body_uuid, limit, max_chars, nullable, one_of, optional_uuid, param,
    trimmed,
};
use crate::models::task::{TaskPriority, TaskStatus};

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 2000;

const STATUSES: [(&str, TaskStatus); 4] = [
    ("pending", TaskStatus::Pending),
    ("completed", TaskStatus::Completed),
    ("dismissed", TaskStatus::Dismissed),
    ("expired", TaskStatus::Expired),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    pub status: TaskStatus,
    pub patient_id: Option<Uuid>,
    pub limit: u32,
}

/// `GET /api/tasks?status=&patientId=&limit=`
pub fn task_query(params: &Params) -> Result<TaskQuery, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let status = match param(params, "status") {
        Some(raw) => one_of(raw, "status", &STATUSES, &mut errors).unwrap_or_default(),
        None => TaskStatus::Pending,
    };
    let patient_id = optional_uuid(param(params, "patientId"), "patientId", &mut errors);
    let limit = limit(params, &mut errors);

    errors.finish(TaskQuery {
        status,
        patient_id,
        limit,
    })
}

pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Body of `POST /api/tasks`. Task bodies keep snake_case member names.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskCreateRequest {
    #[serde(default)]
    pub patient_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub due_date: Option<jiff::civil::Date>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub patient_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub due_date: Option<jiff::civil::Date>,
    pub metadata: Metadata,
}

/// `POST /api/tasks`
pub fn task_create(request: TaskCreateRequest) -> Result<NewTask, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let patient_id = request
        .patient_id
        .as_deref()
        .and_then(|raw| body_uuid(raw, "patient_id", &mut errors));
    let title = title(&request.title, &mut errors);
    let description = description(request.description, &mut errors);

    errors.finish(NewTask {
        patient_id,
        title,
        description,
        priority: request.priority,
        due_date: request.due_date,
        metadata: request.metadata.unwrap_or_default(),
    })
}

/// Body of `PATCH /api/tasks/{id}`. `null` clears `description` and `due_date`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskUpdateRequest {
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub due_date: Option<Option<jiff::civil::Date>>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

/// Partial update for `PATCH /api/tasks/{id}`. `Some(None)` clears a field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub due_date: Option<Option<jiff::civil::Date>>,
    pub metadata: Option<Metadata>,
}

/// `PATCH /api/tasks/{id}`
pub fn task_update(request: TaskUpdateRequest) -> Result<TaskPatch, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let title = request.title.as_deref().map(|raw| title(raw, &mut errors));
    let description = request
        .description
        .map(|raw| description(raw, &mut errors));

    let patch = TaskPatch {
        status: request.status,
        priority: request.priority,
        title,
        description,
        due_date: request.due_date,
        metadata: request.metadata,
    };
    if errors.is_empty() && patch == TaskPatch::default() {
        errors.form("At least one field must be provided");
    }
    errors.finish(patch)
}

fn title(raw: &str, errors: &mut ValidationErrors) -> String {
    let title = raw.trim();
    if title.is_empty() {
        errors.field("title", "String must contain at least 1 character(s)");
    }
    max_chars(title, MAX_TITLE_LEN, "title", errors);
    title.to_string()
}

/// Blank descriptions are stored as absent.
fn description(raw: Option<String>, errors: &mut ValidationErrors) -> Option<String> {
    let description = trimmed(raw)?;
    max_chars(&description, MAX_DESCRIPTION_LEN, "description", errors);
    Some(description)
}
