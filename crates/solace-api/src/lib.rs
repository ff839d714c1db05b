//! solace-api
//!
//! HTTP surface of the practice dashboard. Every `/api` handler runs the
//! same pipeline: rate limit, validate, call the service, audit in the
//! background.

pub mod client_ip;
pub mod config;
pub mod error;
pub mod middleware;
pub mod rate_limit;
pub mod routes;
pub mod state;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_mw;
use axum::routing::{get, patch, post};
use tower_http::cors::{Any, CorsLayer};

use state::AppState;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/api/messages",
            get(routes::messages::get_messages)
                .post(routes::messages::send_message)
                .patch(routes::messages::update_conversation),
        )
        .route("/api/patients/search", get(routes::patients::search_patients))
        .route("/api/patients/{id}", get(routes::patients::get_patient))
        .route(
            "/api/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route("/api/tasks/events", get(routes::tasks::task_events))
        .route(
            "/api/tasks/{id}",
            patch(routes::tasks::update_task).delete(routes::tasks::delete_task),
        )
        .route("/api/channels", get(routes::channels::list_channels))
        .route("/api/import/batches", post(routes::import::create_batch))
        .route("/api/import/batches/{id}", get(routes::import::get_batch))
        .route(
            "/api/import/batches/{id}/upload",
            post(routes::import::upload_file)
                .layer(DefaultBodyLimit::max(routes::import::MAX_UPLOAD_BYTES)),
        )
        .route(
            "/api/import/batches/{id}/mapping",
            post(routes::import::confirm_mapping),
        )
        .route(
            "/api/import/batches/{id}/complete",
            post(routes::import::complete),
        )
        .route("/api/import/analyze", post(routes::import::analyze))
        .layer(axum_mw::from_fn(middleware::access_log::access_log))
        .layer(cors)
        .with_state(state)
}
