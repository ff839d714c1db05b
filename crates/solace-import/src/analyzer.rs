use async_trait::async_trait;
use serde::Serialize;
use tracing::warn;
use ts_rs::TS;

use solace_core::models::import::ColumnMapping;

use crate::error::ImportError;
use crate::heuristic;
use crate::sample::CsvSample;

/// Produces confidence-scored column mappings for a CSV sample.
#[async_trait]
pub trait MappingAnalyzer: Send + Sync {
    /// Short identifier for logs and the session record.
    fn name(&self) -> &'static str;

    async fn analyze(&self, sample: &CsvSample) -> Result<Vec<ColumnMapping>, ImportError>;
}

/// Which analyzer produced a session's suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum AnalysisSource {
    Ai,
    Heuristic,
}

/// Ask `analyzer` first and fall back to the heuristic analyzer when it
/// fails or suggests nothing.
pub async fn analyze_with_fallback(
    analyzer: Option<&dyn MappingAnalyzer>,
    sample: &CsvSample,
) -> (Vec<ColumnMapping>, AnalysisSource) {
    if let Some(analyzer) = analyzer {
        match analyzer.analyze(sample).await {
            Ok(mappings) if !mappings.is_empty() => return (mappings, AnalysisSource::Ai),
            Ok(_) => warn!(
                analyzer = analyzer.name(),
                "analyzer returned no mappings, using heuristics"
            ),
            Err(e) => warn!(
                analyzer = analyzer.name(),
                error = %e,
                "analyzer failed, using heuristics"
            ),
        }
    }
    (heuristic::suggest(sample), AnalysisSource::Heuristic)
}
