use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde_json::json;

use solace_audit::events::AuditEvent;
use solace_core::validate::import::{self, ImportCreateRequest};
use solace_core::validate::Params;
use solace_import::wizard::ImportSession;

use crate::client_ip::ClientIp;
use crate::error::ApiError;
use crate::rate_limit::Access;
use crate::routes::{json_body, path_id};
use crate::state::AppState;

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// `POST /api/import/batches` body `{source}`
pub async fn create_batch(
    State(state): State<AppState>,
    ip: ClientIp,
    body: Bytes,
) -> Result<(StatusCode, Json<ImportSession>), ApiError> {
    state.limiter.check(Access::Write, "import", ip.as_str())?;
    let ImportCreateRequest { source } = json_body(&body)?;

    let session = state.imports.start(source)?;
    state.audit(
        AuditEvent::new("create_import", "import_batch", ip.as_str())
            .with_resource_id(session.batch_id)
            .with_details(json!({ "source": source })),
    );
    Ok((StatusCode::CREATED, Json(session)))
}

/// `GET /api/import/batches/{id}`
pub async fn get_batch(
    State(state): State<AppState>,
    ip: ClientIp,
    Path(id): Path<String>,
) -> Result<Json<ImportSession>, ApiError> {
    state.limiter.check(Access::Read, "import", ip.as_str())?;
    let id = path_id(&id)?;
    Ok(Json(state.imports.get(id)?))
}

/// `POST /api/import/batches/{id}/upload?filename=` with the raw file as body.
pub async fn upload_file(
    State(state): State<AppState>,
    ip: ClientIp,
    Path(id): Path<String>,
    Query(params): Query<Params>,
    body: Bytes,
) -> Result<Json<ImportSession>, ApiError> {
    state.limiter.check(Access::Write, "import", ip.as_str())?;
    let id = path_id(&id)?;
    let filename = import::upload_filename(&params)?;

    let size = body.len();
    let session = state.imports.upload(id, &filename, body.to_vec()).await?;
    state.audit(
        AuditEvent::new("upload_import", "import_batch", ip.as_str())
            .with_resource_id(id)
            .with_details(json!({ "filename": filename, "size": size })),
    );
    Ok(Json(session))
}

/// `POST /api/import/analyze` body `{batchId, fileKey}`
pub async fn analyze(
    State(state): State<AppState>,
    ip: ClientIp,
    body: Bytes,
) -> Result<Json<ImportSession>, ApiError> {
    state.limiter.check(Access::Write, "import", ip.as_str())?;
    let request = import::import_analyze(json_body(&body)?)?;

    let session = state
        .imports
        .analyze(request.batch_id, &request.file_key)
        .await?;
    state.audit(
        AuditEvent::new("analyze_import", "import_batch", ip.as_str())
            .with_resource_id(request.batch_id)
            .with_details(json!({
                "analysis": session.analysis,
                "suggestions": session.suggested.len(),
            })),
    );
    Ok(Json(session))
}

/// `POST /api/import/batches/{id}/mapping` body `{mappings: [...]}`
pub async fn confirm_mapping(
    State(state): State<AppState>,
    ip: ClientIp,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<ImportSession>, ApiError> {
    state.limiter.check(Access::Write, "import", ip.as_str())?;
    let id = path_id(&id)?;
    let mappings = import::mapping_confirm(json_body(&body)?)?;

    let session = state.imports.confirm_mapping(id, mappings).await?;
    state.audit(
        AuditEvent::new("confirm_import_mapping", "import_batch", ip.as_str())
            .with_resource_id(id)
            .with_details(json!({ "mappings": session.mappings.len() })),
    );
    Ok(Json(session))
}

/// `POST /api/import/batches/{id}/complete`
pub async fn complete(
    State(state): State<AppState>,
    ip: ClientIp,
    Path(id): Path<String>,
) -> Result<Json<ImportSession>, ApiError> {
    state.limiter.check(Access::Write, "import", ip.as_str())?;
    let id = path_id(&id)?;

    let session = state.imports.complete(id).await?;
    state.audit(
        AuditEvent::new("complete_import", "import_batch", ip.as_str())
            .with_resource_id(id)
            .with_details(json!({ "totalRows": session.total_rows })),
    );
    Ok(Json(session))
}
