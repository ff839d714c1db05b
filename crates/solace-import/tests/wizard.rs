use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use solace_core::models::import::{ColumnMapping, ImportSource, ImportStep, TargetField};
use solace_import::analyzer::{AnalysisSource, MappingAnalyzer};
use solace_import::error::ImportError;
use solace_import::sample::CsvSample;
use solace_import::wizard::ImportWizard;
use solace_storage::memory::MemoryStore;
use solace_storage::{ObjectStore, SharedStore};

const EXPORT: &str = "\
Client ID,First Name,Last Name,DOB,Email,Mobile
C-001,Maya,Okafor,1991-04-17,maya@example.com,555-555-0101
C-002,Daniel,Reyes,1984-09-02,,555-555-0102
C-003,Priya,Natarajan,2001-01-23,priya@example.com,
";

struct FailingAnalyzer;

#[async_trait]
impl MappingAnalyzer for FailingAnalyzer {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn analyze(&self, _sample: &CsvSample) -> Result<Vec<ColumnMapping>, ImportError> {
        Err(ImportError::Analyzer("model unavailable".to_string()))
    }
}

struct FixedAnalyzer;

#[async_trait]
impl MappingAnalyzer for FixedAnalyzer {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn analyze(&self, _sample: &CsvSample) -> Result<Vec<ColumnMapping>, ImportError> {
        Ok(vec![ColumnMapping::new("Client ID", TargetField::ExternalId, 0.99)])
    }
}

fn store() -> SharedStore {
    Arc::new(MemoryStore::new())
}

fn wizard(store: &SharedStore, analyzer: Option<Arc<dyn MappingAnalyzer>>) -> ImportWizard {
    ImportWizard::new(store.clone(), analyzer)
}

#[tokio::test]
async fn walks_every_step_in_order() {
    let store = store();
    let wizard = wizard(&store, None);

    let session = wizard.start(ImportSource::SimplePractice).unwrap();
    assert_eq!(session.step, ImportStep::Upload);
    let batch_id = session.batch_id;

    let session = wizard
        .upload(batch_id, "clients.csv", EXPORT.as_bytes().to_vec())
        .await
        .unwrap();
    assert_eq!(session.step, ImportStep::Mapping);
    let file_key = session.file_key.clone().unwrap();
    assert_eq!(file_key, format!("imports/{batch_id}/clients.csv"));
    assert_eq!(session.columns.len(), 6);
    assert_eq!(session.sample_rows.len(), 3);
    assert!(store.get(&file_key).await.is_ok());

    let session = wizard.analyze(batch_id, &file_key).await.unwrap();
    assert_eq!(session.step, ImportStep::Mapping);
    assert_eq!(session.analysis, Some(AnalysisSource::Heuristic));
    let fields: Vec<TargetField> = session.suggested.iter().map(|m| m.target_field).collect();
    assert_eq!(
        fields,
        vec![
            TargetField::ExternalId,
            TargetField::FirstName,
            TargetField::LastName,
            TargetField::DateOfBirth,
            TargetField::Email,
            TargetField::Phone,
        ]
    );

    let session = wizard
        .confirm_mapping(batch_id, session.suggested.clone())
        .await
        .unwrap();
    assert_eq!(session.step, ImportStep::Preview);
    assert_eq!(session.preview.len(), 3);
    assert_eq!(session.preview[0][&TargetField::FirstName], "Maya");
    assert_eq!(session.preview[1][&TargetField::Email], "");

    let session = wizard.complete(batch_id).await.unwrap();
    assert_eq!(session.step, ImportStep::Complete);
    assert_eq!(session.total_rows, Some(3));
}

#[tokio::test]
async fn out_of_order_steps_are_rejected() {
    let store = store();
    let wizard = wizard(&store, None);
    let batch_id = wizard.start(ImportSource::Csv).unwrap().batch_id;

    let err = wizard.complete(batch_id).await.unwrap_err();
    assert!(matches!(
        err,
        ImportError::OutOfOrder {
            expected: ImportStep::Preview,
            current: ImportStep::Upload,
        }
    ));

    wizard
        .upload(batch_id, "a.csv", EXPORT.as_bytes().to_vec())
        .await
        .unwrap();

    // No going back to upload once the file is in.
    let err = wizard
        .upload(batch_id, "b.csv", EXPORT.as_bytes().to_vec())
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::OutOfOrder { .. }));
    assert_eq!(wizard.get(batch_id).unwrap().step, ImportStep::Mapping);
}

#[tokio::test]
async fn analyzer_failure_falls_back_to_heuristics() {
    let store = store();
    let wizard = wizard(&store, Some(Arc::new(FailingAnalyzer)));
    let batch_id = wizard.start(ImportSource::Csv).unwrap().batch_id;
    let session = wizard
        .upload(batch_id, "a.csv", EXPORT.as_bytes().to_vec())
        .await
        .unwrap();

    let session = wizard
        .analyze(batch_id, session.file_key.as_deref().unwrap())
        .await
        .unwrap();
    assert_eq!(session.analysis, Some(AnalysisSource::Heuristic));
    assert!(!session.suggested.is_empty());
}

#[tokio::test]
async fn analyzer_suggestions_are_used_when_available() {
    let store = store();
    let wizard = wizard(&store, Some(Arc::new(FixedAnalyzer)));
    let batch_id = wizard.start(ImportSource::Csv).unwrap().batch_id;
    let session = wizard
        .upload(batch_id, "a.csv", EXPORT.as_bytes().to_vec())
        .await
        .unwrap();

    let session = wizard
        .analyze(batch_id, session.file_key.as_deref().unwrap())
        .await
        .unwrap();
    assert_eq!(session.analysis, Some(AnalysisSource::Ai));
    assert_eq!(session.suggested.len(), 1);
}

#[tokio::test]
async fn analyze_requires_the_batch_file() {
    let store = store();
    let wizard = wizard(&store, None);
    let batch_id = wizard.start(ImportSource::Csv).unwrap().batch_id;
    wizard
        .upload(batch_id, "a.csv", EXPORT.as_bytes().to_vec())
        .await
        .unwrap();

    let err = wizard
        .analyze(batch_id, "imports/other/a.csv")
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::FileMismatch(_)));

    let err = wizard.analyze(Uuid::new_v4(), "x.csv").await.unwrap_err();
    assert!(matches!(err, ImportError::BatchNotFound(_)));
}

#[tokio::test]
async fn mapping_must_name_known_columns_once() {
    let store = store();
    let wizard = wizard(&store, None);
    let batch_id = wizard.start(ImportSource::Csv).unwrap().batch_id;
    wizard
        .upload(batch_id, "a.csv", EXPORT.as_bytes().to_vec())
        .await
        .unwrap();

    let err = wizard
        .confirm_mapping(
            batch_id,
            vec![ColumnMapping::new("Nickname", TargetField::FirstName, 1.0)],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::UnknownColumn(_)));

    let err = wizard
        .confirm_mapping(
            batch_id,
            vec![
                ColumnMapping::new("DOB", TargetField::DateOfBirth, 1.0),
                ColumnMapping::new("DOB", TargetField::ExternalId, 1.0),
            ],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::DuplicateColumn { .. }));
    assert_eq!(wizard.get(batch_id).unwrap().step, ImportStep::Mapping);
}

#[tokio::test]
async fn upload_rejects_file_without_header() {
    let store = store();
    let wizard = wizard(&store, None);
    let batch_id = wizard.start(ImportSource::Csv).unwrap().batch_id;

    let err = wizard.upload(batch_id, "a.csv", Vec::new()).await.unwrap_err();
    assert!(matches!(err, ImportError::MissingHeader));
    assert!(store.list("imports/").await.unwrap().is_empty());
}

#[tokio::test]
async fn upload_rejects_repeated_headers() {
    let store = store();
    let wizard = wizard(&store, None);
    let batch_id = wizard.start(ImportSource::TheraNest).unwrap().batch_id;

    let csv = "First Name,Last Name,Phone,Phone\nMaya,Okafor,555-555-0101,555-555-0199\n";
    let err = wizard
        .upload(batch_id, "clients.csv", csv.as_bytes().to_vec())
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::DuplicateHeader(ref header) if header == "Phone"));
    assert_eq!(wizard.get(batch_id).unwrap().step, ImportStep::Upload);
    assert!(store.list("imports/").await.unwrap().is_empty());
}
