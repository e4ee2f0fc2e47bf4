//! Notifications endpoints.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use outliers_common::AppResult;
use outliers_core::NotificationResponse;
use serde::{Deserialize, Serialize};

use super::MAX_LIMIT;
use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{self, ApiResponse},
};

/// List notifications request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListNotificationsRequest {
    /// Maximum results (default: 20, max: 100)
    #[serde(default = "super::default_limit")]
    pub limit: u64,
    /// Cursor for pagination (before this ID)
    pub until_id: Option<String>,
    /// Only unread notifications
    #[serde(default)]
    pub unread_only: bool,
}

/// Mark one notification request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    pub notification_id: String,
}

/// Unread count response.
#[derive(Serialize)]
pub struct CountResponse {
    pub count: u64,
}

/// Mark all response.
#[derive(Serialize)]
pub struct MarkAllResponse {
    pub updated: u64,
}

/// Get notifications for the authenticated user.
async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListNotificationsRequest>,
) -> AppResult<ApiResponse<Vec<NotificationResponse>>> {
    let notifications = state
        .notification_service
        .list(
            &auth.user.id,
            req.limit.min(MAX_LIMIT),
            req.until_id.as_deref(),
            req.unread_only,
        )
        .await?;
    Ok(ApiResponse::ok(notifications))
}

async fn unread_count(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<CountResponse>> {
    let count = state
        .notification_service
        .count_unread(&auth.user.id)
        .await?;
    Ok(ApiResponse::ok(CountResponse { count }))
}

async fn mark_read(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<MarkReadRequest>,
) -> AppResult<impl IntoResponse> {
    state
        .notification_service
        .mark_as_read(&auth.user.id, &req.notification_id)
        .await?;
    Ok(response::ok())
}

/// Mark everything read (opening the panel).
async fn mark_all_read(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<MarkAllResponse>> {
    let updated = state
        .notification_service
        .mark_all_as_read(&auth.user.id)
        .await?;
    Ok(ApiResponse::ok(MarkAllResponse { updated }))
}

/// Create notifications router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/list", post(list))
        .route("/unread-count", post(unread_count))
        .route("/mark-read", post(mark_read))
        .route("/mark-all-read", post(mark_all_read))
}
