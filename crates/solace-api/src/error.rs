use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use solace_core::validate::ValidationErrors;
use solace_import::error::ImportError;
use solace_practice::error::PracticeError;
use solace_storage::error::StorageError;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<ValidationErrors>,
}

/// Unified API error type for all route handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    BadRequest {
        message: String,
        details: Option<ValidationErrors>,
    },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("rate limit exceeded, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },
    #[error("upstream failure: {0}")]
    BadGateway(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
            details: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, details, retry_after) = match self {
            ApiError::BadRequest { message, details } => (message, details, None),
            ApiError::RateLimited { retry_after } => {
                ("Too many requests".to_string(), None, Some(retry_after))
            }
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                ("internal server error".to_string(), None, None)
            }
            ApiError::BadGateway(msg) => {
                tracing::warn!("upstream failure: {msg}");
                (msg, None, None)
            }
            ApiError::NotFound(msg) | ApiError::Conflict(msg) => (msg, None, None),
        };

        let mut response = (status, Json(ErrorBody { error: message, details })).into_response();
        if let Some(retry_after) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
        }
        response
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(e: ValidationErrors) -> Self {
        ApiError::BadRequest {
            message: "Invalid request".to_string(),
            details: Some(e),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound { key } => ApiError::NotFound(format!("object not found: {key}")),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<PracticeError> for ApiError {
    fn from(e: PracticeError) -> Self {
        match e {
            PracticeError::PatientNotFound(_)
            | PracticeError::ConversationNotFound(_)
            | PracticeError::TaskNotFound(_) => ApiError::NotFound(e.to_string()),
            PracticeError::InvalidCursor(_)
            | PracticeError::ChannelUnavailable { .. }
            | PracticeError::Content(_) => ApiError::bad_request(e.to_string()),
            PracticeError::Dispatch(_) => ApiError::BadGateway(e.to_string()),
            PracticeError::Storage(e) => e.into(),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(e: ImportError) -> Self {
        match e {
            ImportError::BatchNotFound(_) => ApiError::NotFound(e.to_string()),
            ImportError::OutOfOrder { .. } => ApiError::Conflict(e.to_string()),
            ImportError::FileMismatch(_)
            | ImportError::MissingHeader
            | ImportError::DuplicateHeader(_)
            | ImportError::UnknownColumn(_)
            | ImportError::DuplicateColumn { .. }
            | ImportError::Csv(_) => ApiError::bad_request(e.to_string()),
            ImportError::Analyzer(_) => ApiError::BadGateway(e.to_string()),
            ImportError::Poisoned => ApiError::Internal(e.to_string()),
            ImportError::Storage(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use uuid::Uuid;

    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), 65536).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_errors_are_flattened_into_details() {
        let response = ApiError::from(ValidationErrors::single("content", "Required")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid request");
        assert_eq!(body["details"]["fieldErrors"]["content"][0], "Required");
        assert_eq!(body["details"]["formErrors"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn rate_limited_sets_retry_after() {
        let response = ApiError::RateLimited { retry_after: 42 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");
    }

    #[tokio::test]
    async fn internal_errors_hide_the_message() {
        let response = ApiError::Internal("s3 credentials expired".to_string()).into_response();
        let body = body_json(response).await;
        assert_eq!(body["error"], "internal server error");
        assert!(body.get("details").is_none());
    }

    #[test]
    fn practice_errors_map_to_statuses() {
        let id = Uuid::new_v4();
        assert_eq!(
            ApiError::from(PracticeError::PatientNotFound(id)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(PracticeError::InvalidCursor(id)).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(PracticeError::Dispatch("timeout".to_string())).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn wizard_order_violation_is_a_conflict() {
        use solace_core::models::import::ImportStep;
        let e = ImportError::OutOfOrder {
            expected: ImportStep::Preview,
            current: ImportStep::Upload,
        };
        assert_eq!(ApiError::from(e).status(), StatusCode::CONFLICT);
    }
}
