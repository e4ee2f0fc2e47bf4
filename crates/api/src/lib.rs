//! HTTP API layer for outliers.
//!
//! This crate provides the JSON API and real-time notifications:
//!
//! - **Endpoints**: auth, profiles, content, comments, likes, notifications,
//!   uploads, settings, admin and navigation
//! - **Extractors**: Authentication and admin checks
//! - **Middleware**: Bearer token authentication
//! - **Streaming**: Server-Sent Events for new notifications
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;
pub mod sse;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
pub use sse::SseBroadcaster;
