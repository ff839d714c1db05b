use uuid::Uuid;

use solace_core::keys;
use solace_core::models::patient::{Patient, PatientSummary};
use solace_core::validate::patients::PatientSearch;
use solace_storage::error::StorageError;
use solace_storage::{SharedStore, json};

use crate::error::PracticeError;

/// Read access to patient records.
#[derive(Clone)]
pub struct PatientDirectory {
    store: SharedStore,
}

impl PatientDirectory {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: Uuid) -> Result<Patient, PracticeError> {
        match json::load(self.store.as_ref(), &keys::patient(id)).await {
            Ok(patient) => Ok(patient),
            Err(StorageError::NotFound { .. }) => Err(PracticeError::PatientNotFound(id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Case-insensitive match on name, email or phone, ordered by last name.
    pub async fn search(&self, search: &PatientSearch) -> Result<Vec<PatientSummary>, PracticeError> {
        let mut patients: Vec<Patient> =
            json::load_all(self.store.as_ref(), keys::PATIENTS_PREFIX).await?;

        if let Some(q) = &search.q {
            let needle = q.to_lowercase();
            patients.retain(|p| matches(p, &needle));
        }

        patients.sort_by(|a, b| {
            (a.last_name.to_lowercase(), a.first_name.to_lowercase())
                .cmp(&(b.last_name.to_lowercase(), b.first_name.to_lowercase()))
        });
        patients.truncate(search.limit as usize);

        Ok(patients.iter().map(Patient::summary).collect())
    }

    pub async fn save(&self, patient: &Patient) -> Result<(), PracticeError> {
        json::save(self.store.as_ref(), &keys::patient(patient.id), patient).await?;
        Ok(())
    }
}

fn matches(patient: &Patient, needle: &str) -> bool {
    let contains = |field: &str| field.to_lowercase().contains(needle);
    contains(&patient.full_name())
        || patient.email.as_deref().is_some_and(contains)
        || patient.phone.as_deref().is_some_and(contains)
}
