use solace_core::models::import::ImportStep;
use solace_storage::error::StorageError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("import batch not found: {0}")]
    BatchNotFound(Uuid),

    #[error("import batch is at step {current}, expected {expected}")]
    OutOfOrder {
        expected: ImportStep,
        current: ImportStep,
    },

    #[error("file {0} does not belong to this import batch")]
    FileMismatch(String),

    #[error("file has no header row")]
    MissingHeader,

    #[error("header {0:?} appears more than once")]
    DuplicateHeader(String),

    #[error("unknown column in mapping: {0}")]
    UnknownColumn(String),

    #[error("column {column} is mapped more than once")]
    DuplicateColumn { column: String },

    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("column analysis failed: {0}")]
    Analyzer(String),

    #[error("import session lock poisoned")]
    Poisoned,

    #[error(transparent)]
    Storage(#[from] StorageError),
}
