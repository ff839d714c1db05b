use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::channel::{self, ChannelCode, ContactField};

/// A patient record as held by the practice's system of record.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Patient {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: jiff::civil::Date,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub fax: Option<String>,
    #[serde(default)]
    pub portal_enabled: bool,
    #[serde(default)]
    pub diagnoses: Vec<Diagnosis>,
    pub created_at: jiff::Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Diagnosis {
    /// ICD-10 code, e.g. `F41.1`.
    pub code: String,
    pub description: String,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whether the given contact field is present. Blank strings count as absent.
    pub fn has_contact(&self, field: ContactField) -> bool {
        fn present(value: &Option<String>) -> bool {
            value.as_deref().is_some_and(|v| !v.trim().is_empty())
        }

        match field {
            ContactField::Phone => present(&self.phone),
            ContactField::Email => present(&self.email),
            ContactField::Fax => present(&self.fax),
            ContactField::Portal => self.portal_enabled,
        }
    }

    pub fn available_channels(&self) -> Vec<ChannelCode> {
        channel::available_channels(self)
    }

    pub fn summary(&self) -> PatientSummary {
        PatientSummary {
            id: self.id,
            full_name: self.full_name(),
            date_of_birth: self.date_of_birth,
            email: self.email.clone(),
            phone: self.phone.clone(),
            primary_diagnosis: self.diagnoses.first().map(|d| d.code.clone()),
        }
    }
}

/// Search-result projection of a [`Patient`].
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PatientSummary {
    pub id: Uuid,
    pub full_name: String,
    pub date_of_birth: jiff::civil::Date,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub primary_diagnosis: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient() -> Patient {
        Patient {
            id: Uuid::new_v4(),
            first_name: "Ada".to_string(),
            last_name: "Byron".to_string(),
            date_of_birth: jiff::civil::date(1985, 12, 10),
            email: None,
            phone: Some("+15555550100".to_string()),
            fax: Some("   ".to_string()),
            portal_enabled: false,
            diagnoses: Vec::new(),
            created_at: jiff::Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn phone_enables_sms_and_voice_only() {
        assert_eq!(
            patient().available_channels(),
            vec![ChannelCode::Sms, ChannelCode::Voice]
        );
    }

    #[test]
    fn email_and_portal_extend_available_channels() {
        let mut p = patient();
        p.email = Some("ada@example.com".to_string());
        p.portal_enabled = true;
        let channels = p.available_channels();
        assert!(channels.contains(&ChannelCode::Email));
        assert!(channels.contains(&ChannelCode::InApp));
        assert!(channels.contains(&ChannelCode::Chat));
        assert!(!channels.contains(&ChannelCode::Fax));
    }

    #[test]
    fn missing_fields_default_when_deserializing() {
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "firstName": "Grace",
            "lastName": "Hopper",
            "dateOfBirth": "1906-12-09",
            "createdAt": "2026-01-01T00:00:00Z",
        });
        let p: Patient = serde_json::from_value(json).unwrap();
        assert!(p.available_channels().is_empty());
        assert!(p.diagnoses.is_empty());
    }
}
