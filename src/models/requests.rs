//! Request DTOs for the feed service API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::notifications::{Category, NewNotification, Priority};

/// Longest accepted notification title.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Request body for `POST /notifications/:owner`
///
/// The owner comes from the path.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNotificationRequest {
    pub category: Category,
    pub title: String,
    pub body: String,
    /// Defaults to medium
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub action_target: Option<String>,
}

impl CreateNotificationRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.title.trim().is_empty() {
            return Some("Title cannot be empty".to_string());
        }
        if self.title.len() > MAX_TITLE_LENGTH {
            return Some(format!(
                "Title exceeds maximum length of {} characters",
                MAX_TITLE_LENGTH
            ));
        }
        None
    }

    pub fn into_new(self, owner: impl Into<String>) -> NewNotification {
        let mut new = NewNotification::new(owner, self.category, self.title, self.body)
            .with_priority(self.priority.unwrap_or_default());
        new.action_target = self.action_target;
        new
    }
}
