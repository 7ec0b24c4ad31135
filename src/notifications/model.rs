//! Notification records and feed states.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// == Category ==
/// Origin of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    MatchUpdate,
    ContestResult,
    PlayerPerformance,
    LeagueUpdate,
    System,
}

// == Priority ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

// == Notification ==
/// A persisted notification as held by the store and mirrored by feeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub owner: String,
    pub category: Category,
    pub title: String,
    pub body: String,
    /// Only ever moves false -> true
    pub read: bool,
    pub priority: Priority,
    /// Deep link into the app
    pub action_target: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// == New Notification ==
/// Payload for creating a notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNotification {
    pub owner: String,
    pub category: Category,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub action_target: Option<String>,
}

impl NewNotification {
    /// Medium priority, no action target.
    pub fn new(
        owner: impl Into<String>,
        category: Category,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            category,
            title: title.into(),
            body: body.into(),
            priority: Priority::default(),
            action_target: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_action_target(mut self, target: impl Into<String>) -> Self {
        self.action_target = Some(target.into());
        self
    }

    /// Materializes the record as the store would persist it.
    pub fn into_notification(self, id: Uuid, now: DateTime<Utc>) -> Notification {
        Notification {
            id,
            owner: self.owner,
            category: self.category,
            title: self.title,
            body: self.body,
            read: false,
            priority: self.priority,
            action_target: self.action_target,
            created_at: now,
            updated_at: now,
        }
    }
}

// == Toast ==
/// Transient acknowledgment shown when a pushed notification arrives.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toast {
    pub notification_id: Uuid,
    pub title: String,
    pub body: String,
    pub category: Category,
}

impl From<&Notification> for Toast {
    fn from(n: &Notification) -> Self {
        Self {
            notification_id: n.id,
            title: n.title.clone(),
            body: n.body.clone(),
            category: n.category,
        }
    }
}

// == Feed States ==
/// Load state of a feed's local list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedState {
    #[default]
    Idle,
    Loading,
    Ready,
}

/// State of the live push connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelState {
    #[default]
    Disconnected,
    Subscribing,
    Subscribed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_notification_defaults() {
        let new = NewNotification::new("u1", Category::System, "Welcome", "Hello");
        assert_eq!(new.priority, Priority::Medium);
        assert!(new.action_target.is_none());

        let n = new.into_notification(Uuid::nil(), Utc::now());
        assert!(!n.read);
        assert_eq!(n.created_at, n.updated_at);
    }

    #[test]
    fn test_create_payload_wire_format() {
        let payload = json!({
            "owner": "u1",
            "category": "contest_result",
            "title": "You won!",
            "body": "Rank 1 in Mega Contest"
        });
        let new: NewNotification = serde_json::from_value(payload).unwrap();

        assert_eq!(new.category, Category::ContestResult);
        assert_eq!(new.priority, Priority::Medium);
    }

    #[test]
    fn test_states_serialize_snake_case() {
        assert_eq!(serde_json::to_value(ChannelState::Subscribed).unwrap(), json!("subscribed"));
        assert_eq!(serde_json::to_value(Category::MatchUpdate).unwrap(), json!("match_update"));
    }
}
