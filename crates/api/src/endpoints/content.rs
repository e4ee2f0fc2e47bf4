//! Content endpoints.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use outliers_common::AppResult;
use outliers_core::{ContentResponse, CreateContentInput, UpdateContentInput};
use outliers_db::entities::content::ContentType;
use serde::{Deserialize, Serialize};

use super::{ContentIdRequest, MAX_LIMIT, TabRequest};
use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{self, ApiResponse},
};

/// Update content request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContentRequest {
    pub content_id: String,
    #[serde(flatten)]
    pub changes: UpdateContentInput,
}

/// Publish flag after a toggle.
#[derive(Serialize)]
pub struct PublishedResponse {
    pub published: bool,
}

/// Feed request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedRequest {
    #[serde(rename = "type")]
    pub content_type: Option<ContentType>,
    #[serde(default = "super::default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

/// Create a content item.
async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateContentInput>,
) -> AppResult<ApiResponse<ContentResponse>> {
    let created = state.content_service.create(&auth.viewer, req).await?;
    Ok(ApiResponse::ok(created))
}

/// Update one of the user's content items.
async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateContentRequest>,
) -> AppResult<ApiResponse<ContentResponse>> {
    let updated = state
        .content_service
        .update(&auth.viewer, &req.content_id, req.changes)
        .await?;
    Ok(ApiResponse::ok(updated))
}

/// Publish a draft or unpublish a post.
async fn toggle_publish(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ContentIdRequest>,
) -> AppResult<ApiResponse<PublishedResponse>> {
    let published = state
        .content_service
        .toggle_publish(&auth.viewer, &req.content_id)
        .await?;
    Ok(ApiResponse::ok(PublishedResponse { published }))
}

/// Delete a content item.
async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ContentIdRequest>,
) -> AppResult<impl IntoResponse> {
    state
        .content_service
        .delete(&auth.viewer, &req.content_id)
        .await?;
    Ok(response::ok())
}

/// Show a content item.
async fn show(
    maybe: MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<ContentIdRequest>,
) -> AppResult<ApiResponse<ContentResponse>> {
    let item = state
        .content_service
        .get(maybe.viewer(), &req.content_id)
        .await?;
    Ok(ApiResponse::ok(item))
}

/// Published items from everyone, newest first.
async fn feed(
    maybe: MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<FeedRequest>,
) -> AppResult<ApiResponse<Vec<ContentResponse>>> {
    let items = state
        .content_service
        .feed(
            maybe.viewer(),
            req.content_type,
            req.limit.min(MAX_LIMIT),
            req.until_id.as_deref(),
        )
        .await?;
    Ok(ApiResponse::ok(items))
}

/// The user's own items under the all/published/drafts tab.
async fn mine(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<TabRequest>,
) -> AppResult<ApiResponse<Vec<ContentResponse>>> {
    let items = state
        .content_service
        .list_mine(&auth.viewer, req.tab, req.limit.min(MAX_LIMIT), req.offset)
        .await?;
    Ok(ApiResponse::ok(items))
}

/// Create content router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/update", post(update))
        .route("/toggle-publish", post(toggle_publish))
        .route("/delete", post(delete))
        .route("/show", post(show))
        .route("/feed", post(feed))
        .route("/mine", post(mine))
}
