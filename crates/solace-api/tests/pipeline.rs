mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::json;

use common::{TestApp, json};
use solace_api::rate_limit::RateLimiter;

fn from(ip: &str, uri: &str) -> Request<Body> {
    Request::get(uri)
        .header("x-forwarded-for", ip)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn health_is_not_rate_limited() {
    let app = TestApp::with_limiter(RateLimiter::in_memory(1, 1, Duration::from_secs(60)));
    for _ in 0..3 {
        let (status, body) = json(app.get("/health").await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}

#[tokio::test]
async fn reads_over_the_limit_get_429_with_retry_after() {
    let app = TestApp::with_limiter(RateLimiter::in_memory(2, 1, Duration::from_secs(60)));

    for _ in 0..2 {
        let response = app
            .request(from("203.0.113.9", "/api/messages?type=conversations"))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .request(from("203.0.113.9", "/api/messages?type=conversations"))
        .await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = response.headers()[header::RETRY_AFTER]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=60).contains(&retry_after));
    let (_, body) = json(response).await;
    assert_eq!(body["error"], "Too many requests");

    // Another client has its own budget.
    let response = app
        .request(from("203.0.113.10", "/api/messages?type=conversations"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn rate_limit_is_checked_before_validation() {
    let app = TestApp::with_limiter(RateLimiter::in_memory(10, 1, Duration::from_secs(60)));

    let (status, _) = json(app.send_json("POST", "/api/messages", json!({})).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = json(app.send_json("POST", "/api/messages", json!({})).await).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn successful_requests_are_audited() {
    let app = TestApp::new();
    let patient = app.patient().await;

    let (status, _) = json(app.get(&format!("/api/patients/{}", patient.id)).await).await;
    assert_eq!(status, StatusCode::OK);

    let today = jiff::Timestamp::now()
        .to_zoned(jiff::tz::TimeZone::UTC)
        .date();
    let mut events = Vec::new();
    for _ in 0..50 {
        events = solace_audit::sink::load_day(&app.store, today).await.unwrap();
        if !events.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, "view_patient");
    assert_eq!(events[0].actor, "unknown");
    assert_eq!(events[0].resource_id, Some(patient.id.to_string()));
}

#[tokio::test]
async fn channel_table_is_served() {
    let app = TestApp::new();
    let (status, body) = json(app.get("/api/channels").await).await;
    assert_eq!(status, StatusCode::OK);
    let channels = body.as_array().unwrap();
    assert_eq!(channels.len(), 6);
    let sms = channels.iter().find(|c| c["code"] == "sms").unwrap();
    assert_eq!(sms["maxLength"], 160);
}

#[tokio::test]
async fn malformed_json_is_a_form_error() {
    let app = TestApp::new();
    let response = app
        .request(
            Request::post("/api/tasks")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;
    let (status, body) = json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["formErrors"][0].as_str().unwrap().starts_with("Invalid JSON"));
}
