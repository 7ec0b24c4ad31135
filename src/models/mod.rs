//! Request and Response models for the feed service API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::CreateNotificationRequest;
pub use responses::{
    ActionResponse, CreatedResponse, FeedResponse, HealthResponse, MatchesResponse,
};
