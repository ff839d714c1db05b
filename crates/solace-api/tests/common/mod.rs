#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

use solace_api::rate_limit::RateLimiter;
use solace_api::state::AppState;
use solace_audit::error::AuditError;
use solace_audit::events::AuditEvent;
use solace_audit::log::AuditLog;
use solace_audit::sink::{AuditSink, StoreSink};
use solace_core::models::patient::Patient;
use solace_import::wizard::ImportWizard;
use solace_practice::dispatch::LoggingDispatcher;
use solace_practice::messaging::MessagingService;
use solace_practice::tasks::TaskService;
use solace_storage::SharedStore;
use solace_storage::memory::MemoryStore;

pub struct FailingSink;

#[async_trait]
impl AuditSink for FailingSink {
    async fn write(&self, _event: &AuditEvent) -> Result<(), AuditError> {
        Err(AuditError::Rejected("audit store offline".to_string()))
    }
}

pub struct TestApp {
    pub store: SharedStore,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(None, RateLimiter::in_memory(1000, 1000, Duration::from_secs(60)))
    }

    pub fn with_limiter(limiter: RateLimiter) -> Self {
        Self::build(None, limiter)
    }

    pub fn with_audit_sink(sink: Arc<dyn AuditSink>) -> Self {
        Self::build(
            Some(sink),
            RateLimiter::in_memory(1000, 1000, Duration::from_secs(60)),
        )
    }

    fn build(sink: Option<Arc<dyn AuditSink>>, limiter: RateLimiter) -> Self {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let sink = sink.unwrap_or_else(|| Arc::new(StoreSink::new(store.clone())));
        let state = AppState {
            messaging: MessagingService::new(store.clone(), Arc::new(LoggingDispatcher)),
            tasks: TaskService::new(store.clone()),
            imports: Arc::new(ImportWizard::new(store.clone(), None)),
            audit: AuditLog::new(sink),
            limiter,
            store: store.clone(),
        };
        Self { store, state }
    }

    pub fn router(&self) -> Router {
        solace_api::build_router(self.state.clone())
    }

    pub async fn request(&self, req: Request<Body>) -> Response<Body> {
        self.router().oneshot(req).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.request(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn send_json(&self, method: &str, uri: &str, body: serde_json::Value) -> Response<Body> {
        self.request(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .header("x-forwarded-for", "198.51.100.4")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// A patient reachable by phone and email.
    pub async fn patient(&self) -> Patient {
        let patient = Patient {
            id: Uuid::new_v4(),
            first_name: "Maya".to_string(),
            last_name: "Okafor".to_string(),
            date_of_birth: jiff::civil::date(1991, 4, 17),
            email: Some("maya@example.com".to_string()),
            phone: Some("+15555550101".to_string()),
            fax: None,
            portal_enabled: false,
            diagnoses: Vec::new(),
            created_at: jiff::Timestamp::now(),
        };
        self.state.patients().save(&patient).await.unwrap();
        patient
    }
}

pub async fn json(response: Response<Body>) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
