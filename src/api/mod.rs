//! API Module
//!
//! HTTP handlers and routing for the feed service.
//!
//! # Endpoints
//! - `GET /health` - Health check
//! - `GET /cache/stats` - Cache statistics
//! - `DELETE /cache`, `DELETE /cache/:key` - Cache maintenance
//! - `GET /matches/live`, `GET /matches/:id`, `GET /seasons/:id/fixtures` - Cached match data
//! - `GET|POST /notifications/:owner` - Feed contents / create
//! - `POST /notifications/:owner/refresh` - Reload from the store
//! - `POST /notifications/:owner/read-all`, `POST /notifications/:owner/:id/read`
//! - `DELETE /notifications/:owner/:id`

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
