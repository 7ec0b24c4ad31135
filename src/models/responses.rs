//! Response DTOs for the feed service API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use uuid::Uuid;

use crate::notifications::{ChannelState, FeedState, Notification};
use crate::sources::Match;

/// Response body for the match list endpoints
#[derive(Debug, Clone, Serialize)]
pub struct MatchesResponse {
    pub count: usize,
    pub matches: Vec<Match>,
}

impl MatchesResponse {
    pub fn new(matches: Vec<Match>) -> Self {
        Self {
            count: matches.len(),
            matches,
        }
    }
}

/// Response body for `GET /notifications/:owner`
#[derive(Debug, Clone, Serialize)]
pub struct FeedResponse {
    pub owner: String,
    pub state: FeedState,
    pub channel: ChannelState,
    pub unread_count: usize,
    pub notifications: Vec<Notification>,
}

/// Response body for `POST /notifications/:owner`
#[derive(Debug, Clone, Serialize)]
pub struct CreatedResponse {
    pub id: Uuid,
}

/// Response body for mutations and cache maintenance
#[derive(Debug, Clone, Serialize)]
pub struct ActionResponse {
    /// Success message
    pub message: String,
    /// Records or entries affected
    pub affected: u64,
}

impl ActionResponse {
    pub fn new(message: impl Into<String>, affected: u64) -> Self {
        Self {
            message: message.into(),
            affected,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_response_counts() {
        let resp = MatchesResponse::new(vec![Match::default(), Match::default()]);
        assert_eq!(resp.count, 2);
    }

    #[test]
    fn test_action_response_serialize() {
        let resp = ActionResponse::new("Marked read", 3);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("Marked read"));
        assert!(json.contains("\"affected\":3"));
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
