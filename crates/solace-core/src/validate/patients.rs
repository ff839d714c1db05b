use uuid::Uuid;

use super::{Params, ValidationErrors, limit, max_chars, parse_uuid};

pub const MAX_QUERY_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientSearch {
    /// Trimmed search text; `None` lists patients unfiltered.
    pub q: Option<String>,
    pub limit: u32,
}

/// `GET /api/patients/search?q=&limit=`
pub fn patient_search(params: &Params) -> Result<PatientSearch, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let q = params.get("q").map(String::as_str);
    if let Some(q) = q {
        max_chars(q, MAX_QUERY_LEN, "q", &mut errors);
    }
    let q = q.map(str::trim).filter(|q| !q.is_empty()).map(str::to_string);

    let limit = limit(params, &mut errors);

    errors.finish(PatientSearch { q, limit })
}

/// Path parameter of `GET /api/patients/{id}`.
pub fn patient_id(raw: &str) -> Result<Uuid, ValidationErrors> {
    parse_uuid(raw).ok_or_else(|| ValidationErrors::single("id", "Invalid uuid"))
}
