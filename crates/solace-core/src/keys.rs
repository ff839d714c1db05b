//! Object key conventions.
//!
//! Pure string functions with no storage dependency. These define the canonical
//! layout of records in the Solace bucket.

use uuid::Uuid;

pub const PATIENTS_PREFIX: &str = "patients/";

pub fn patient(id: Uuid) -> String {
    format!("patients/{id}.json")
}

pub const CONVERSATIONS_PREFIX: &str = "conversations/";

pub fn conversation(id: Uuid) -> String {
    format!("conversations/{id}.json")
}

/// A patient has exactly one conversation, and it carries the patient's id.
pub fn conversation_for_patient(patient_id: Uuid) -> String {
    conversation(patient_id)
}

pub fn messages_prefix(conversation_id: Uuid) -> String {
    format!("messages/{conversation_id}/")
}

pub fn message(conversation_id: Uuid, message_id: Uuid) -> String {
    format!("messages/{conversation_id}/{message_id}.json")
}

pub const TASKS_PREFIX: &str = "tasks/";

pub fn task(id: Uuid) -> String {
    format!("tasks/{id}.json")
}

pub fn import_batch_prefix(batch_id: Uuid) -> String {
    format!("imports/{batch_id}/")
}

/// Key for an uploaded import file. `filename` must already be sanitized.
pub fn import_file(batch_id: Uuid, filename: &str) -> String {
    format!("imports/{batch_id}/{filename}")
}

/// Audit events are partitioned by UTC day so a day can be listed cheaply.
pub fn audit_event(day: jiff::civil::Date, id: Uuid) -> String {
    format!("audit/{day}/{id}.json")
}

pub fn audit_day_prefix(day: jiff::civil::Date) -> String {
    format!("audit/{day}/")
}
