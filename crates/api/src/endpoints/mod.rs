//! API endpoints.

mod admin;
mod auth;
mod comments;
mod content;
mod likes;
mod navigation;
mod notifications;
mod profiles;
mod settings;
mod uploads;

use axum::Router;
use serde::Deserialize;

use crate::middleware::AppState;
use crate::sse;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .nest("/profiles", profiles::router())
        .nest("/content", content::router())
        .nest("/comments", comments::router())
        .nest("/likes", likes::router())
        .nest("/notifications", notifications::router())
        .nest("/uploads", uploads::router())
        .nest("/settings", settings::router())
        .nest("/admin", admin::router())
        .nest("/navigation", navigation::router())
        .nest("/streaming", sse::router())
}

/// Request naming a content item.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentIdRequest {
    pub content_id: String,
}

/// Offset pagination with a publication tab.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabRequest {
    #[serde(default)]
    pub tab: outliers_db::repositories::PublishFilter,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    20
}

/// Largest page any list endpoint returns.
const MAX_LIMIT: u64 = 100;
