//! [`MappingAnalyzer`] that asks a Bedrock model for column mappings.
//!
//! The model's reply is treated as untrusted: unknown columns and fields are
//! dropped, confidences are clamped, and each column and field is kept once
//! (highest confidence wins).

use std::collections::HashSet;

use async_trait::async_trait;
use aws_sdk_bedrockruntime::Client;
use serde::Deserialize;
use tracing::{info, warn};

use solace_core::models::import::{ColumnMapping, TargetField};
use solace_import::analyzer::MappingAnalyzer;
use solace_import::error::ImportError;
use solace_import::sample::CsvSample;

use crate::converse::invoke_converse;
use crate::error::BedrockError;
use crate::prompt;

pub struct BedrockMappingAnalyzer {
    client: Client,
    model_id: String,
}

impl BedrockMappingAnalyzer {
    pub fn new(config: &aws_config::SdkConfig, model_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(config),
            model_id: model_id.into(),
        }
    }
}

#[async_trait]
impl MappingAnalyzer for BedrockMappingAnalyzer {
    fn name(&self) -> &'static str {
        "bedrock"
    }

    async fn analyze(&self, sample: &CsvSample) -> Result<Vec<ColumnMapping>, ImportError> {
        info!(model_id = %self.model_id, columns = sample.columns.len(), "requesting column mapping");
        let text = invoke_converse(
            &self.client,
            &self.model_id,
            &prompt::system_prompt(),
            &prompt::build_sample_block(sample),
        )
        .await?;
        Ok(parse_mappings(&text, sample)?)
    }
}

#[derive(Deserialize)]
struct MappingResponse {
    mappings: Vec<RawMapping>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMapping {
    source_column: String,
    target_field: String,
    confidence: f64,
}

/// Parse a model reply into mappings for `sample`'s columns, in column order.
pub fn parse_mappings(text: &str, sample: &CsvSample) -> Result<Vec<ColumnMapping>, BedrockError> {
    let json = strip_code_fence(text);
    let response: MappingResponse = serde_json::from_str(json).map_err(|e| {
        BedrockError::SchemaViolation(format!("failed to parse mapping response: {e}"))
    })?;

    let mut candidates: Vec<(usize, ColumnMapping)> = Vec::new();
    for raw in response.mappings {
        let Some(index) = sample.column_index(&raw.source_column) else {
            warn!(column = %raw.source_column, "model mapped a column that is not in the file");
            continue;
        };
        let Some(field) = TargetField::parse(&raw.target_field) else {
            warn!(field = %raw.target_field, "model suggested an unknown target field");
            continue;
        };
        candidates.push((index, ColumnMapping::new(raw.source_column, field, raw.confidence)));
    }

    candidates.sort_by(|a, b| b.1.confidence.total_cmp(&a.1.confidence));
    let mut columns = HashSet::new();
    let mut fields = HashSet::new();
    candidates.retain(|(index, m)| {
        if columns.contains(index) || fields.contains(&m.target_field) {
            return false;
        }
        columns.insert(*index);
        fields.insert(m.target_field);
        true
    });

    candidates.sort_by_key(|(index, _)| *index);
    Ok(candidates.into_iter().map(|(_, m)| m).collect())
}

/// Models sometimes wrap JSON in a Markdown code fence despite instructions.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
