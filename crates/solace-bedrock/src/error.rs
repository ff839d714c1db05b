use solace_import::error::ImportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BedrockError {
    #[error("model invocation failed: {0}")]
    Invocation(String),

    #[error("response parsing failed: {0}")]
    ResponseParse(String),

    #[error("response did not conform to expected schema: {0}")]
    SchemaViolation(String),
}

impl From<BedrockError> for ImportError {
    fn from(e: BedrockError) -> Self {
        ImportError::Analyzer(e.to_string())
    }
}
