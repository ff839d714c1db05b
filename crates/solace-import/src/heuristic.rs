//! Column mapping from header names and sample values alone.
//!
//! Each header is normalized (lowercased, punctuation folded to spaces) and
//! compared with a synonym list per target field. Exact synonyms score
//! high; partial token overlap scores medium or low. Columns whose header
//! says nothing useful fall back to sniffing the sample values. Each column
//! and each target field is used at most once, best score first.

use std::collections::HashSet;

use async_trait::async_trait;

use solace_core::models::import::{ColumnMapping, TargetField};

use crate::analyzer::MappingAnalyzer;
use crate::error::ImportError;
use crate::sample::CsvSample;

const EXACT: f64 = 0.95;
const EXACT_COMPACT: f64 = 0.92;
const EXACT_AFTER_PREFIX: f64 = 0.9;
const MIN_OVERLAP: f64 = 0.5;
const SNIFFED_EMAIL: f64 = 0.8;
const SNIFFED_DATE: f64 = 0.6;
const SNIFFED_PHONE: f64 = 0.6;

/// Prefixes that add nothing to a header ("Patient DOB", "Client Email").
const NOISE_PREFIXES: [&str; 3] = ["patient", "client", "primary"];

fn synonyms(field: TargetField) -> &'static [&'static str] {
    match field {
        TargetField::FirstName => &["first name", "first", "fname", "given name", "forename"],
        TargetField::LastName => &["last name", "last", "lname", "surname", "family name"],
        TargetField::FullName => &["name", "full name", "patient name", "client name", "patient"],
        TargetField::DateOfBirth => &["dob", "date of birth", "birth date", "birthdate", "birthday"],
        TargetField::Email => &["email", "email address", "e mail", "mail"],
        TargetField::Phone => &[
            "phone",
            "phone number",
            "mobile",
            "cell",
            "telephone",
            "tel",
            "mobile phone",
            "cell phone",
            "contact number",
        ],
        TargetField::Address => &[
            "address",
            "street",
            "street address",
            "address line 1",
            "home address",
            "mailing address",
        ],
        TargetField::InsuranceProvider => &[
            "insurance",
            "insurance provider",
            "insurer",
            "payer",
            "insurance company",
            "carrier",
        ],
        TargetField::InsuranceMemberId => &[
            "member id",
            "insurance id",
            "policy number",
            "subscriber id",
            "policy id",
            "member number",
        ],
        TargetField::DiagnosisCode => &[
            "diagnosis",
            "diagnosis code",
            "dx",
            "dx code",
            "icd",
            "icd10",
            "icd 10",
            "icd code",
        ],
        TargetField::ExternalId => &[
            "id",
            "patient id",
            "client id",
            "mrn",
            "record number",
            "external id",
            "chart number",
            "account number",
        ],
    }
}

/// Lowercase, fold anything that is not alphanumeric to a single space.
pub fn normalize(header: &str) -> String {
    header
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// How well a normalized header matches one synonym, in `[0, 1]`.
fn header_score(header: &str, synonym: &str) -> f64 {
    if header == synonym {
        return EXACT;
    }
    if header.replace(' ', "") == synonym.replace(' ', "") {
        return EXACT_COMPACT;
    }
    for prefix in NOISE_PREFIXES {
        if header.strip_prefix(prefix).map(str::trim_start) == Some(synonym) {
            return EXACT_AFTER_PREFIX;
        }
    }

    let header_tokens: HashSet<&str> = header.split(' ').collect();
    let synonym_tokens: HashSet<&str> = synonym.split(' ').collect();
    let shared = header_tokens.intersection(&synonym_tokens).count();
    if shared == 0 {
        return 0.0;
    }
    let jaccard = shared as f64 / header_tokens.union(&synonym_tokens).count() as f64;
    if jaccard < MIN_OVERLAP {
        return 0.0;
    }
    0.5 + 0.35 * jaccard
}

fn best_header_match(header: &str) -> Vec<(TargetField, f64)> {
    TargetField::ALL
        .into_iter()
        .filter_map(|field| {
            let score = synonyms(field)
                .iter()
                .map(|s| header_score(header, s))
                .fold(0.0, f64::max);
            (score > 0.0).then_some((field, score))
        })
        .collect()
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    }
}

fn looks_like_date(value: &str) -> bool {
    ["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%m-%d-%Y"]
        .iter()
        .any(|fmt| jiff::civil::Date::strptime(fmt, value).is_ok())
}

fn looks_like_phone(value: &str) -> bool {
    let digits = value.chars().filter(char::is_ascii_digit).count();
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_digit() || " +-().".contains(c));
    allowed && (10..=15).contains(&digits)
}

/// Guess a field from sample values when every value agrees.
fn sniff(values: &[&str]) -> Option<(TargetField, f64)> {
    if values.is_empty() {
        return None;
    }
    if values.iter().all(|v| looks_like_email(v)) {
        Some((TargetField::Email, SNIFFED_EMAIL))
    } else if values.iter().all(|v| looks_like_date(v)) {
        Some((TargetField::DateOfBirth, SNIFFED_DATE))
    } else if values.iter().all(|v| looks_like_phone(v)) {
        Some((TargetField::Phone, SNIFFED_PHONE))
    } else {
        None
    }
}

/// Suggest mappings for a sample, in column order.
pub fn suggest(sample: &CsvSample) -> Vec<ColumnMapping> {
    let mut candidates: Vec<(usize, TargetField, f64)> = Vec::new();
    for (index, column) in sample.columns.iter().enumerate() {
        let header = normalize(column);
        let mut matches = best_header_match(&header);
        if matches.is_empty() {
            let values: Vec<&str> = sample.values(index).collect();
            matches.extend(sniff(&values));
        }
        candidates.extend(matches.into_iter().map(|(field, score)| (index, field, score)));
    }

    // Highest score first; ties go to the leftmost column.
    candidates.sort_by(|a, b| b.2.total_cmp(&a.2).then(a.0.cmp(&b.0)));

    let mut used_columns = HashSet::new();
    let mut used_fields = HashSet::new();
    let mut chosen: Vec<(usize, TargetField, f64)> = Vec::new();
    for (index, field, score) in candidates {
        if used_columns.contains(&index) || used_fields.contains(&field) {
            continue;
        }
        used_columns.insert(index);
        used_fields.insert(field);
        chosen.push((index, field, score));
    }

    chosen.sort_by_key(|(index, _, _)| *index);
    chosen
        .into_iter()
        .map(|(index, field, score)| ColumnMapping::new(&sample.columns[index], field, score))
        .collect()
}

/// [`MappingAnalyzer`] backed by [`suggest`]. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicAnalyzer;

#[async_trait]
impl MappingAnalyzer for HeuristicAnalyzer {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn analyze(&self, sample: &CsvSample) -> Result<Vec<ColumnMapping>, ImportError> {
        Ok(suggest(sample))
    }
}

#[cfg(test)]
mod tests {
    use solace_core::models::import::ConfidenceBand;

    use super::*;

    fn sample(columns: &[&str], rows: &[&[&str]]) -> CsvSample {
        CsvSample {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|v| v.to_string()).collect())
                .collect(),
        }
    }

    fn field_for<'a>(mappings: &'a [ColumnMapping], column: &str) -> Option<&'a ColumnMapping> {
        mappings.iter().find(|m| m.source_column == column)
    }

    #[test]
    fn normalizes_punctuation_and_case() {
        assert_eq!(normalize("  Date_of-Birth "), "date of birth");
        assert_eq!(normalize("E-Mail"), "e mail");
    }

    #[test]
    fn exact_synonyms_are_high_confidence() {
        let mappings = suggest(&sample(&["First Name", "Last Name", "DOB", "E-mail"], &[]));
        assert_eq!(mappings.len(), 4);
        for m in &mappings {
            assert_eq!(m.band(), ConfidenceBand::High, "{}", m.source_column);
        }
        assert_eq!(mappings[2].target_field, TargetField::DateOfBirth);
        assert_eq!(mappings[3].target_field, TargetField::Email);
    }

    #[test]
    fn compact_and_prefixed_headers_still_match() {
        let mappings = suggest(&sample(&["FirstName", "Patient DOB", "Client Phone"], &[]));
        assert_eq!(field_for(&mappings, "FirstName").unwrap().target_field, TargetField::FirstName);
        assert_eq!(
            field_for(&mappings, "Patient DOB").unwrap().target_field,
            TargetField::DateOfBirth
        );
        assert_eq!(
            field_for(&mappings, "Client Phone").unwrap().confidence,
            EXACT_AFTER_PREFIX
        );
    }

    #[test]
    fn partial_overlap_is_not_high_confidence() {
        let mappings = suggest(&sample(&["Insurance Member"], &[]));
        let m = &mappings[0];
        assert_ne!(m.band(), ConfidenceBand::High);
    }

    #[test]
    fn each_field_is_assigned_once() {
        let mappings = suggest(&sample(&["Email", "Email Address"], &[]));
        let emails: Vec<_> = mappings
            .iter()
            .filter(|m| m.target_field == TargetField::Email)
            .collect();
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].source_column, "Email");
        assert_ne!(
            field_for(&mappings, "Email Address").map(|m| m.target_field),
            Some(TargetField::Email)
        );
    }

    #[test]
    fn opaque_headers_fall_back_to_values() {
        let mappings = suggest(&sample(
            &["col1", "col2", "col3", "notes"],
            &[
                &["a@example.com", "1990-01-02", "(555) 555-0101", "prefers mornings"],
                &["b@example.org", "03/04/1985", "+1 555 555 0102", ""],
            ],
        ));
        assert_eq!(field_for(&mappings, "col1").unwrap().target_field, TargetField::Email);
        assert_eq!(
            field_for(&mappings, "col2").unwrap().target_field,
            TargetField::DateOfBirth
        );
        assert_eq!(field_for(&mappings, "col3").unwrap().target_field, TargetField::Phone);
        assert!(field_for(&mappings, "notes").is_none());
    }
}
