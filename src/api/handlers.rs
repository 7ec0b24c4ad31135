//! API Handlers
//!
//! HTTP request handlers for each feed service endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::cache::{CacheStats, CacheStore, SharedCache};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{
    ActionResponse, CreateNotificationRequest, CreatedResponse, FeedResponse, HealthResponse,
    MatchesResponse,
};
use crate::notifications::{FeedRegistry, NotificationStore};
use crate::sources::{CricketDataService, Match, MatchSource};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Process-wide cache handle
    pub cache: SharedCache,
    /// Cache-aside match data
    pub data: Arc<CricketDataService>,
    /// Mounted notification feeds
    pub feeds: Arc<FeedRegistry>,
}

impl AppState {
    /// Wires the state around an existing cache.
    pub fn new(
        cache: SharedCache,
        source: Arc<dyn MatchSource>,
        store: Arc<dyn NotificationStore>,
        fetch_limit: usize,
    ) -> Self {
        Self {
            data: Arc::new(CricketDataService::new(cache.clone(), source)),
            feeds: Arc::new(FeedRegistry::new(store, fetch_limit)),
            cache,
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(
        config: &Config,
        source: Arc<dyn MatchSource>,
        store: Arc<dyn NotificationStore>,
    ) -> Self {
        let cache = CacheStore::new(config.ttl_policy()).into_shared();
        Self::new(cache, source, store, config.notification_fetch_limit)
    }
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

// == Cache ==

/// Handler for GET /cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.read().await.stats())
}

/// Handler for DELETE /cache
pub async fn cache_clear_handler(State(state): State<AppState>) -> Json<ActionResponse> {
    let mut cache = state.cache.write().await;
    let cleared = cache.len() as u64;
    cache.clear();
    Json(ActionResponse::new("Cache cleared", cleared))
}

/// Handler for DELETE /cache/:key
pub async fn cache_delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ActionResponse>> {
    if state.cache.write().await.delete(&key) {
        Ok(Json(ActionResponse::new(format!("Key '{}' deleted", key), 1)))
    } else {
        Err(AppError::NotFound(format!("cache key '{}'", key)))
    }
}

// == Matches ==

/// Handler for GET /matches/live
pub async fn live_matches_handler(State(state): State<AppState>) -> Json<MatchesResponse> {
    Json(MatchesResponse::new(state.data.live_matches().await))
}

/// Handler for GET /matches/:id
pub async fn match_handler(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<Match>> {
    state
        .data
        .match_details(&match_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("match '{}'", match_id)))
}

/// Handler for GET /seasons/:id/fixtures
pub async fn fixtures_handler(
    State(state): State<AppState>,
    Path(season_id): Path<String>,
) -> Json<MatchesResponse> {
    Json(MatchesResponse::new(state.data.season_fixtures(&season_id).await))
}

// == Notifications ==

/// Handler for GET /notifications/:owner
///
/// Mounts the owner's feed on first use.
pub async fn feed_handler(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<FeedResponse>> {
    let feed = state.feeds.feed_for(&owner).await?;

    Ok(Json(FeedResponse {
        state: feed.state().await,
        channel: feed.channel_state().await,
        unread_count: feed.unread_count().await,
        notifications: feed.notifications().await,
        owner,
    }))
}

/// Handler for POST /notifications/:owner/refresh
pub async fn refresh_feed_handler(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<ActionResponse>> {
    let feed = state.feeds.feed_for(&owner).await?;
    let loaded = feed.fetch_all().await?;
    Ok(Json(ActionResponse::new("Notifications reloaded", loaded as u64)))
}

/// Handler for POST /notifications/:owner
pub async fn create_notification_handler(
    State(state): State<AppState>,
    Path(owner): Path<String>,
    Json(req): Json<CreateNotificationRequest>,
) -> Result<Json<CreatedResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(AppError::InvalidRequest(error_msg));
    }

    let feed = state.feeds.feed_for(&owner).await?;
    let id = feed.create(req.into_new(owner)).await?;
    Ok(Json(CreatedResponse { id }))
}

/// Handler for POST /notifications/:owner/:id/read
pub async fn mark_read_handler(
    State(state): State<AppState>,
    Path((owner, id)): Path<(String, Uuid)>,
) -> Result<Json<ActionResponse>> {
    let feed = state.feeds.feed_for(&owner).await?;
    feed.mark_read(id).await?;
    Ok(Json(ActionResponse::new("Notification marked read", 1)))
}

/// Handler for POST /notifications/:owner/read-all
pub async fn mark_all_read_handler(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<ActionResponse>> {
    let feed = state.feeds.feed_for(&owner).await?;
    let changed = feed.mark_all_read().await?;
    Ok(Json(ActionResponse::new("All notifications marked read", changed)))
}

/// Handler for DELETE /notifications/:owner/:id
pub async fn delete_notification_handler(
    State(state): State<AppState>,
    Path((owner, id)): Path<(String, Uuid)>,
) -> Result<Json<ActionResponse>> {
    let feed = state.feeds.feed_for(&owner).await?;
    feed.remove(id).await?;
    Ok(Json(ActionResponse::new("Notification deleted", 1)))
}
