//! Import sessions and the forward-only step machine.
//!
//! A session starts at `upload` (choosing the source is the first step) and
//! moves `upload → mapping → preview → complete`. Each operation checks the
//! step under the session lock, does its I/O unlocked, then re-checks
//! before committing, so two racing requests cannot both advance a batch.
//! Sessions are held in memory only.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tracing::info;
use ts_rs::TS;
use uuid::Uuid;

use solace_core::keys;
use solace_core::models::import::{ColumnMapping, ImportSource, ImportStep, TargetField};
use solace_storage::SharedStore;

use crate::analyzer::{AnalysisSource, MappingAnalyzer, analyze_with_fallback};
use crate::error::ImportError;
use crate::sample::{self, CsvSample, SAMPLE_ROWS};

/// Rows projected for the confirmation preview.
pub const PREVIEW_ROWS: usize = 10;

/// One previewed row: target field → raw source value.
pub type PreviewRow = BTreeMap<TargetField, String>;

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ImportSession {
    pub batch_id: Uuid,
    pub source: ImportSource,
    pub step: ImportStep,
    pub file_key: Option<String>,
    pub columns: Vec<String>,
    pub sample_rows: Vec<Vec<String>>,
    pub suggested: Vec<ColumnMapping>,
    pub analysis: Option<AnalysisSource>,
    pub mappings: Vec<ColumnMapping>,
    #[ts(type = "Array<Record<string, string>>")]
    pub preview: Vec<PreviewRow>,
    pub total_rows: Option<usize>,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

impl ImportSession {
    fn new(source: ImportSource) -> Self {
        let now = jiff::Timestamp::now();
        Self {
            batch_id: Uuid::new_v4(),
            source,
            step: ImportStep::Upload,
            file_key: None,
            columns: Vec::new(),
            sample_rows: Vec::new(),
            suggested: Vec::new(),
            analysis: None,
            mappings: Vec::new(),
            preview: Vec::new(),
            total_rows: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample(&self) -> CsvSample {
        CsvSample {
            columns: self.columns.clone(),
            rows: self.sample_rows.clone(),
        }
    }
}

pub struct ImportWizard {
    store: SharedStore,
    analyzer: Option<Arc<dyn MappingAnalyzer>>,
    sessions: Mutex<HashMap<Uuid, ImportSession>>,
}

impl ImportWizard {
    /// `analyzer` is consulted before the heuristics when present.
    pub fn new(store: SharedStore, analyzer: Option<Arc<dyn MappingAnalyzer>>) -> Self {
        Self {
            store,
            analyzer,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Open a batch for the chosen source.
    pub fn start(&self, source: ImportSource) -> Result<ImportSession, ImportError> {
        let session = ImportSession::new(source);
        self.lock()?.insert(session.batch_id, session.clone());
        info!(batch_id = %session.batch_id, ?source, "import batch started");
        Ok(session)
    }

    pub fn get(&self, batch_id: Uuid) -> Result<ImportSession, ImportError> {
        self.lock()?
            .get(&batch_id)
            .cloned()
            .ok_or(ImportError::BatchNotFound(batch_id))
    }

    /// Store the uploaded file and read its header and sample rows.
    /// `filename` must already be validated as a bare file name.
    pub async fn upload(
        &self,
        batch_id: Uuid,
        filename: &str,
        body: Vec<u8>,
    ) -> Result<ImportSession, ImportError> {
        self.expect_step(batch_id, ImportStep::Upload)?;

        let sample = sample::read(&body, SAMPLE_ROWS)?;
        let file_key = keys::import_file(batch_id, filename);
        let size = body.len();
        self.store.put(&file_key, body, Some("text/csv")).await?;
        info!(%batch_id, file_key, size, columns = sample.columns.len(), "import file uploaded");

        self.commit(batch_id, ImportStep::Upload, |session| {
            session.file_key = Some(file_key);
            session.columns = sample.columns;
            session.sample_rows = sample.rows;
        })
    }

    /// Suggest mappings for the uploaded file. May be repeated while the
    /// batch is at the mapping step.
    pub async fn analyze(
        &self,
        batch_id: Uuid,
        file_key: &str,
    ) -> Result<ImportSession, ImportError> {
        let session = self.expect_step(batch_id, ImportStep::Mapping)?;
        if session.file_key.as_deref() != Some(file_key) {
            return Err(ImportError::FileMismatch(file_key.to_string()));
        }

        let sample = session.sample();
        let (suggested, analysis) = analyze_with_fallback(self.analyzer.as_deref(), &sample).await;
        info!(%batch_id, suggestions = suggested.len(), ?analysis, "import columns analyzed");

        self.update(batch_id, ImportStep::Mapping, |session| {
            session.suggested = suggested;
            session.analysis = Some(analysis);
        })
    }

    /// Accept the user's mappings and build a preview from the stored file.
    /// Values are shown as found; nothing is checked against the target field.
    pub async fn confirm_mapping(
        &self,
        batch_id: Uuid,
        mappings: Vec<ColumnMapping>,
    ) -> Result<ImportSession, ImportError> {
        let session = self.expect_step(batch_id, ImportStep::Mapping)?;

        let mut seen = HashSet::new();
        let mut indexes = Vec::with_capacity(mappings.len());
        for mapping in &mappings {
            let index = session
                .columns
                .iter()
                .position(|c| *c == mapping.source_column)
                .ok_or_else(|| ImportError::UnknownColumn(mapping.source_column.clone()))?;
            if !seen.insert(index) {
                return Err(ImportError::DuplicateColumn {
                    column: mapping.source_column.clone(),
                });
            }
            indexes.push((index, mapping.target_field));
        }

        let body = self.read_file(&session).await?;
        let rows = sample::read(&body, PREVIEW_ROWS)?.rows;
        let preview: Vec<PreviewRow> = rows
            .iter()
            .map(|row| {
                indexes
                    .iter()
                    .map(|(index, field)| (*field, row[*index].clone()))
                    .collect()
            })
            .collect();

        self.commit(batch_id, ImportStep::Mapping, |session| {
            session.mappings = mappings;
            session.preview = preview;
        })
    }

    /// Finish the batch. Records the file's total row count.
    pub async fn complete(&self, batch_id: Uuid) -> Result<ImportSession, ImportError> {
        let session = self.expect_step(batch_id, ImportStep::Preview)?;
        let body = self.read_file(&session).await?;
        let total_rows = sample::count_rows(&body)?;

        let session = self.commit(batch_id, ImportStep::Preview, |session| {
            session.total_rows = Some(total_rows);
        })?;
        info!(%batch_id, total_rows, "import batch complete");
        Ok(session)
    }

    async fn read_file(&self, session: &ImportSession) -> Result<Vec<u8>, ImportError> {
        let key = session
            .file_key
            .as_deref()
            .ok_or(ImportError::OutOfOrder {
                expected: ImportStep::Upload,
                current: session.step,
            })?;
        Ok(self.store.get(key).await?.body)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, ImportSession>>, ImportError> {
        self.sessions.lock().map_err(|_| ImportError::Poisoned)
    }

    fn expect_step(&self, batch_id: Uuid, expected: ImportStep) -> Result<ImportSession, ImportError> {
        let session = self.get(batch_id)?;
        if session.step != expected {
            return Err(ImportError::OutOfOrder {
                expected,
                current: session.step,
            });
        }
        Ok(session)
    }

    /// Apply `f` if the batch is still at `expected`, without advancing.
    fn update(
        &self,
        batch_id: Uuid,
        expected: ImportStep,
        f: impl FnOnce(&mut ImportSession),
    ) -> Result<ImportSession, ImportError> {
        self.transition(batch_id, expected, false, f)
    }

    /// Apply `f` and advance to the next step if the batch is still at
    /// `expected`.
    fn commit(
        &self,
        batch_id: Uuid,
        expected: ImportStep,
        f: impl FnOnce(&mut ImportSession),
    ) -> Result<ImportSession, ImportError> {
        self.transition(batch_id, expected, true, f)
    }

    fn transition(
        &self,
        batch_id: Uuid,
        expected: ImportStep,
        advance: bool,
        f: impl FnOnce(&mut ImportSession),
    ) -> Result<ImportSession, ImportError> {
        let mut sessions = self.lock()?;
        let session = sessions
            .get_mut(&batch_id)
            .ok_or(ImportError::BatchNotFound(batch_id))?;
        if session.step != expected {
            return Err(ImportError::OutOfOrder {
                expected,
                current: session.step,
            });
        }

        f(session);
        if advance {
            if let Some(next) = session.step.next() {
                session.step = next;
            }
        }
        session.updated_at = jiff::Timestamp::now();
        Ok(session.clone())
    }
}
