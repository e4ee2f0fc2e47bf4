//! Comment endpoints.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use outliers_common::AppResult;
use outliers_core::CommentResponse;
use serde::Deserialize;

use super::MAX_LIMIT;
use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{self, ApiResponse},
};

/// Create comment request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub content_id: String,
    pub content: String,
}

/// List comments request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCommentsRequest {
    pub content_id: String,
    #[serde(default = "super::default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

/// Delete comment request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCommentRequest {
    pub comment_id: String,
}

async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateCommentRequest>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state
        .comment_service
        .add(&auth.viewer, &req.content_id, &req.content)
        .await?;
    Ok(ApiResponse::ok(comment))
}

async fn list(
    maybe: MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListCommentsRequest>,
) -> AppResult<ApiResponse<Vec<CommentResponse>>> {
    let comments = state
        .comment_service
        .list(
            maybe.viewer(),
            &req.content_id,
            req.limit.min(MAX_LIMIT),
            req.until_id.as_deref(),
        )
        .await?;
    Ok(ApiResponse::ok(comments))
}

async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<DeleteCommentRequest>,
) -> AppResult<impl IntoResponse> {
    state
        .comment_service
        .delete(&auth.viewer, &req.comment_id)
        .await?;
    Ok(response::ok())
}

/// Create comments router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/list", post(list))
        .route("/delete", post(delete))
}
