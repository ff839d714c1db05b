use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Steps of the data-import wizard, in the only order they may be visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum ImportStep {
    SourceSelection,
    Upload,
    Mapping,
    Preview,
    Complete,
}

impl ImportStep {
    /// The step that follows this one, or `None` once complete.
    pub fn next(self) -> Option<ImportStep> {
        match self {
            ImportStep::SourceSelection => Some(ImportStep::Upload),
            ImportStep::Upload => Some(ImportStep::Mapping),
            ImportStep::Mapping => Some(ImportStep::Preview),
            ImportStep::Preview => Some(ImportStep::Complete),
            ImportStep::Complete => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ImportStep::SourceSelection => "source-selection",
            ImportStep::Upload => "upload",
            ImportStep::Mapping => "mapping",
            ImportStep::Preview => "preview",
            ImportStep::Complete => "complete",
        }
    }
}

impl fmt::Display for ImportStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the imported data comes from. Every source is delivered as CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ImportSource {
    Csv,
    SimplePractice,
    TherapyNotes,
    TheraNest,
    Other,
}

/// Patient fields an imported column can be mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum TargetField {
    FirstName,
    LastName,
    FullName,
    DateOfBirth,
    Email,
    Phone,
    Address,
    InsuranceProvider,
    InsuranceMemberId,
    DiagnosisCode,
    ExternalId,
}

impl TargetField {
    pub const ALL: [TargetField; 11] = [
        TargetField::FirstName,
        TargetField::LastName,
        TargetField::FullName,
        TargetField::DateOfBirth,
        TargetField::Email,
        TargetField::Phone,
        TargetField::Address,
        TargetField::InsuranceProvider,
        TargetField::InsuranceMemberId,
        TargetField::DiagnosisCode,
        TargetField::ExternalId,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TargetField::FirstName => "first_name",
            TargetField::LastName => "last_name",
            TargetField::FullName => "full_name",
            TargetField::DateOfBirth => "date_of_birth",
            TargetField::Email => "email",
            TargetField::Phone => "phone",
            TargetField::Address => "address",
            TargetField::InsuranceProvider => "insurance_provider",
            TargetField::InsuranceMemberId => "insurance_member_id",
            TargetField::DiagnosisCode => "diagnosis_code",
            TargetField::ExternalId => "external_id",
        }
    }

    pub fn parse(s: &str) -> Option<TargetField> {
        TargetField::ALL.into_iter().find(|f| f.as_str() == s)
    }
}

/// A suggested source-column → target-field pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ColumnMapping {
    pub source_column: String,
    pub target_field: TargetField,
    /// In `[0, 1]`.
    pub confidence: f64,
}

impl ColumnMapping {
    pub fn new(source_column: impl Into<String>, target_field: TargetField, confidence: f64) -> Self {
        Self {
            source_column: source_column.into(),
            target_field,
            confidence: clamp_confidence(confidence),
        }
    }

    pub fn band(&self) -> ConfidenceBand {
        ConfidenceBand::from_score(self.confidence)
    }
}

/// Badge colour bucket for a mapping confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    pub fn from_score(score: f64) -> ConfidenceBand {
        if score >= 0.9 {
            ConfidenceBand::High
        } else if score >= 0.7 {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }
}

/// Clamp into `[0, 1]`; NaN becomes 0.
pub fn clamp_confidence(score: f64) -> f64 {
    if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) }
}
