//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint against a fake
//! match source and the in-memory notification store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use cricket_feed::{
    api::create_router,
    cache::{CacheStore, TtlPolicy},
    error::SourceError,
    sources::{Match, MatchSource},
    AppState, MemoryNotificationStore,
};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

#[derive(Default)]
struct FakeSource {
    calls: AtomicUsize,
}

#[async_trait]
impl MatchSource for FakeSource {
    async fn fetch_live_matches(&self) -> Result<Vec<Match>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![Match {
            id: "m1".to_string(),
            name: "India vs England".to_string(),
            started: true,
            ..Match::default()
        }])
    }

    async fn fetch_match(&self, match_id: &str) -> Result<Option<Match>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((match_id == "m1").then(|| Match {
            id: "m1".to_string(),
            ..Match::default()
        }))
    }

    async fn fetch_season_fixtures(&self, _season_id: &str) -> Result<Vec<Match>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![Match::default(), Match::default(), Match::default()])
    }
}

struct TestApp {
    router: Router,
    state: AppState,
    source: Arc<FakeSource>,
}

fn create_test_app() -> TestApp {
    let source = Arc::new(FakeSource::default());
    let state = AppState::new(
        CacheStore::new(TtlPolicy::default()).into_shared(),
        source.clone(),
        Arc::new(MemoryNotificationStore::new()),
        50,
    );
    TestApp {
        router: create_router(state.clone()),
        state,
        source,
    }
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let request = builder
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

// == Health ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();
    let (status, json) = send(&app.router, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
}

// == Matches and Cache ==

#[tokio::test]
async fn test_live_matches_are_cached() {
    let app = create_test_app();

    let (status, first) = send(&app.router, "GET", "/matches/live", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["count"], 1);
    assert_eq!(first["matches"][0]["id"], "m1");

    let (_, second) = send(&app.router, "GET", "/matches/live", None).await;
    assert_eq!(second, first);
    assert_eq!(app.source.calls.load(Ordering::SeqCst), 1);

    let (status, stats) = send(&app.router, "GET", "/cache/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["hits"], 1);
    assert_eq!(stats["misses"], 1);
    assert_eq!(stats["total_items"], 1);
    assert_eq!(stats["cache_hit_rate"], 0.5);
}

#[tokio::test]
async fn test_match_details() {
    let app = create_test_app();

    let (status, json) = send(&app.router, "GET", "/matches/m1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], "m1");

    let (status, json) = send(&app.router, "GET", "/matches/zz", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("zz"));
}

#[tokio::test]
async fn test_season_fixtures() {
    let app = create_test_app();
    let (status, json) = send(&app.router, "GET", "/seasons/ipl-2024/fixtures", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 3);
}

#[tokio::test]
async fn test_cache_delete_and_clear() {
    let app = create_test_app();
    send(&app.router, "GET", "/matches/live", None).await;
    send(&app.router, "GET", "/matches/m1", None).await;

    let (status, _) = send(&app.router, "DELETE", "/cache/matches_live", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app.router, "DELETE", "/cache/matches_live", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = send(&app.router, "DELETE", "/cache", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["affected"], 1);
    assert!(app.state.cache.read().await.is_empty());
}

// == Notifications ==

const CREATE_BODY: &str =
    r#"{"category":"contest_result","title":"Contest won","body":"You finished 1st","priority":"high"}"#;

async fn create_and_reload(app: &TestApp, owner: &str) -> Value {
    let (status, created) = send(
        &app.router,
        "POST",
        &format!("/notifications/{owner}"),
        Some(CREATE_BODY),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app.router,
        "POST",
        &format!("/notifications/{owner}/refresh"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    created
}

#[tokio::test]
async fn test_feed_lifecycle() {
    let app = create_test_app();

    let (status, feed) = send(&app.router, "GET", "/notifications/u1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(feed["state"], "ready");
    assert_eq!(feed["channel"], "subscribed");
    assert_eq!(feed["unread_count"], 0);

    let created = create_and_reload(&app, "u1").await;
    let id = created["id"].as_str().unwrap().to_string();

    let (_, feed) = send(&app.router, "GET", "/notifications/u1", None).await;
    assert_eq!(feed["notifications"].as_array().unwrap().len(), 1);
    assert_eq!(feed["notifications"][0]["priority"], "high");
    assert_eq!(feed["unread_count"], 1);

    let (status, _) = send(
        &app.router,
        "POST",
        &format!("/notifications/u1/{id}/read"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, feed) = send(&app.router, "GET", "/notifications/u1", None).await;
    assert_eq!(feed["unread_count"], 0);
    assert_eq!(feed["notifications"][0]["read"], true);

    let (status, _) = send(&app.router, "DELETE", &format!("/notifications/u1/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, feed) = send(&app.router, "GET", "/notifications/u1", None).await;
    assert!(feed["notifications"].as_array().unwrap().is_empty());

    app.state.feeds.shutdown().await;
}

#[tokio::test]
async fn test_mark_all_read_twice() {
    let app = create_test_app();
    create_and_reload(&app, "u2").await;
    create_and_reload(&app, "u2").await;

    let (status, json) = send(&app.router, "POST", "/notifications/u2/read-all", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["affected"], 2);

    let (status, json) = send(&app.router, "POST", "/notifications/u2/read-all", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["affected"], 0);

    let (_, feed) = send(&app.router, "GET", "/notifications/u2", None).await;
    assert_eq!(feed["unread_count"], 0);

    app.state.feeds.shutdown().await;
}

#[tokio::test]
async fn test_pushed_notification_reaches_feed_without_refresh() {
    let app = create_test_app();
    send(&app.router, "GET", "/notifications/u3", None).await;

    let (status, _) = send(&app.router, "POST", "/notifications/u3", Some(CREATE_BODY)).await;
    assert_eq!(status, StatusCode::OK);

    let mut delivered = false;
    for _ in 0..100 {
        let (_, feed) = send(&app.router, "GET", "/notifications/u3", None).await;
        if feed["notifications"].as_array().map_or(0, |n| n.len()) == 1 {
            delivered = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(delivered, "Live channel should deliver the insert");

    app.state.feeds.shutdown().await;
}

#[tokio::test]
async fn test_unknown_notification_is_not_found() {
    let app = create_test_app();
    let uri = format!("/notifications/u1/{}/read", uuid::Uuid::new_v4());

    let (status, json) = send(&app.router, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json.get("error").is_some());

    app.state.feeds.shutdown().await;
}

#[tokio::test]
async fn test_records_of_another_owner_are_not_found() {
    let app = create_test_app();
    let created = create_and_reload(&app, "u2").await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app.router, "POST", &format!("/notifications/u1/{id}/read"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app.router, "DELETE", &format!("/notifications/u1/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, feed) = send(&app.router, "GET", "/notifications/u2", None).await;
    assert_eq!(feed["notifications"].as_array().unwrap().len(), 1);
    assert_eq!(feed["unread_count"], 1);

    app.state.feeds.shutdown().await;
}

#[tokio::test]
async fn test_create_rejects_empty_title() {
    let app = create_test_app();
    let (status, _) = send(
        &app.router,
        "POST",
        "/notifications/u1",
        Some(r#"{"category":"system","title":"","body":"x"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_uuid_is_rejected() {
    let app = create_test_app();
    let (status, _) = send(&app.router, "POST", "/notifications/u1/not-a-uuid/read", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
