//! Like endpoints.

use axum::{Json, Router, extract::State, routing::post};
use outliers_common::AppResult;
use outliers_core::LikeState;
use serde::Deserialize;

use super::ContentIdRequest;
use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Request naming a comment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentIdRequest {
    pub comment_id: String,
}

async fn like_content(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ContentIdRequest>,
) -> AppResult<ApiResponse<LikeState>> {
    let like = state
        .like_service
        .like_content(&auth.viewer, &req.content_id)
        .await?;
    Ok(ApiResponse::ok(like))
}

async fn unlike_content(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ContentIdRequest>,
) -> AppResult<ApiResponse<LikeState>> {
    let like = state
        .like_service
        .unlike_content(&auth.viewer, &req.content_id)
        .await?;
    Ok(ApiResponse::ok(like))
}

async fn like_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CommentIdRequest>,
) -> AppResult<ApiResponse<LikeState>> {
    let like = state
        .like_service
        .like_comment(&auth.viewer, &req.comment_id)
        .await?;
    Ok(ApiResponse::ok(like))
}

async fn unlike_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CommentIdRequest>,
) -> AppResult<ApiResponse<LikeState>> {
    let like = state
        .like_service
        .unlike_comment(&auth.viewer, &req.comment_id)
        .await?;
    Ok(ApiResponse::ok(like))
}

/// Create likes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/content/like", post(like_content))
        .route("/content/unlike", post(unlike_content))
        .route("/comment/like", post(like_comment))
        .route("/comment/unlike", post(unlike_comment))
}
