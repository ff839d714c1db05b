use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Serialize;
use serde_json::json;

use solace_audit::events::AuditEvent;
use solace_core::channel::ChannelCode;
use solace_core::models::patient::{Patient, PatientSummary};
use solace_core::validate::{Params, patients};

use crate::client_ip::ClientIp;
use crate::error::ApiError;
use crate::rate_limit::Access;
use crate::state::AppState;

/// A patient record plus the channels the compose form may offer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDetail {
    #[serde(flatten)]
    pub patient: Patient,
    pub available_channels: Vec<ChannelCode>,
}

/// `GET /api/patients/search?q=&limit=`
pub async fn search_patients(
    State(state): State<AppState>,
    ip: ClientIp,
    Query(params): Query<Params>,
) -> Result<Json<Vec<PatientSummary>>, ApiError> {
    state.limiter.check(Access::Read, "patients", ip.as_str())?;
    let search = patients::patient_search(&params)?;

    let results = state.patients().search(&search).await?;
    state.audit(
        AuditEvent::new("search_patients", "patient", ip.as_str())
            .with_details(json!({ "hasQuery": search.q.is_some(), "count": results.len() })),
    );
    Ok(Json(results))
}

/// `GET /api/patients/{id}`
pub async fn get_patient(
    State(state): State<AppState>,
    ip: ClientIp,
    Path(id): Path<String>,
) -> Result<Json<PatientDetail>, ApiError> {
    state.limiter.check(Access::Read, "patients", ip.as_str())?;
    let id = patients::patient_id(&id)?;

    let patient = state.patients().get(id).await?;
    state.audit(AuditEvent::new("view_patient", "patient", ip.as_str()).with_resource_id(id));
    Ok(Json(PatientDetail {
        available_channels: patient.available_channels(),
        patient,
    }))
}
