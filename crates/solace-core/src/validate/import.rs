use serde::Deserialize;
use uuid::Uuid;

use super::{Params, ValidationErrors, body_uuid, max_chars, param};
use crate::models::import::{ColumnMapping, ImportSource, TargetField};

pub const MAX_FILE_KEY_LEN: usize = 512;
pub const MAX_FILENAME_LEN: usize = 255;

/// Why a file key was refused.
pub fn file_key_problem(key: &str) -> Option<&'static str> {
    if key.trim().is_empty() {
        return Some("File key is required");
    }
    if key.chars().count() > MAX_FILE_KEY_LEN {
        return Some("File key is too long");
    }
    if key.starts_with('/') || key.contains('\\') || key.contains('\0') {
        return Some("Invalid file key");
    }
    if key.split('/').any(|segment| segment == ".." || segment == ".") || key.contains("../") {
        return Some("Invalid file key: path traversal is not allowed");
    }
    None
}

/// Body of `POST /api/import/batches`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ImportCreateRequest {
    pub source: ImportSource,
}

/// Body of `POST /api/import/analyze`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub batch_id: String,
    pub file_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportAnalyze {
    pub batch_id: Uuid,
    pub file_key: String,
}

/// `POST /api/import/analyze`
pub fn import_analyze(request: AnalyzeRequest) -> Result<ImportAnalyze, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let batch_id = body_uuid(&request.batch_id, "batchId", &mut errors);
    if let Some(problem) = file_key_problem(&request.file_key) {
        errors.field("fileKey", problem);
    }

    match batch_id {
        Some(batch_id) if errors.is_empty() => Ok(ImportAnalyze {
            batch_id,
            file_key: request.file_key,
        }),
        _ => Err(errors),
    }
}

/// `?filename=` of the upload route. Only plain `.csv` / `.txt` names are accepted.
pub fn upload_filename(params: &Params) -> Result<String, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let Some(name) = param(params, "filename").map(str::trim) else {
        return Err(ValidationErrors::single("filename", "Required"));
    };

    max_chars(name, MAX_FILENAME_LEN, "filename", &mut errors);
    if name.contains('/') || name.contains('\\') || name.starts_with('.') || name.contains("..") {
        errors.field("filename", "Invalid filename");
    }
    let lower = name.to_ascii_lowercase();
    if !(lower.ends_with(".csv") || lower.ends_with(".txt")) {
        errors.field("filename", "Only .csv and .txt files can be imported");
    }
    errors.finish(name.to_string())
}

/// One pair of `POST /api/import/batches/{id}/mapping`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingItem {
    pub source_column: String,
    pub target_field: TargetField,
    #[serde(default = "confirmed")]
    pub confidence: f64,
}

fn confirmed() -> f64 {
    1.0
}

/// Body of `POST /api/import/batches/{id}/mapping`.
#[derive(Debug, Clone, Deserialize)]
pub struct MappingRequest {
    pub mappings: Vec<MappingItem>,
}

/// `POST /api/import/batches/{id}/mapping`
///
/// Shape only: the confirmed pairs are not checked against target-field
/// constraints.
pub fn mapping_confirm(request: MappingRequest) -> Result<Vec<ColumnMapping>, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut mappings = Vec::with_capacity(request.mappings.len());

    for (i, item) in request.mappings.into_iter().enumerate() {
        let source = item.source_column.trim();
        if source.is_empty() {
            errors.field(&format!("mappings.{i}.sourceColumn"), "Required");
            continue;
        }
        if !item.confidence.is_finite() {
            errors.field(&format!("mappings.{i}.confidence"), "Expected a number");
            continue;
        }
        mappings.push(ColumnMapping::new(source, item.target_field, item.confidence));
    }

    errors.finish(mappings)
}
