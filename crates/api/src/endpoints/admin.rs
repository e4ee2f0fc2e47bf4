//! Admin panel endpoints.
//!
//! Same operations as the content endpoints, over every author's items.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use outliers_common::AppResult;
use outliers_core::{ContentResponse, CreateContentInput};

use super::{
    ContentIdRequest, MAX_LIMIT, TabRequest,
    content::{PublishedResponse, UpdateContentRequest},
};
use crate::{
    extractors::AdminUser,
    middleware::AppState,
    response::{self, ApiResponse},
};

/// All content, any author, under a publication tab.
async fn list_content(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<TabRequest>,
) -> AppResult<ApiResponse<Vec<ContentResponse>>> {
    let items = state
        .content_service
        .admin_list(&admin.viewer, req.tab, req.limit.min(MAX_LIMIT), req.offset)
        .await?;
    Ok(ApiResponse::ok(items))
}

async fn create_content(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<CreateContentInput>,
) -> AppResult<ApiResponse<ContentResponse>> {
    let created = state.content_service.create(&admin.viewer, req).await?;
    tracing::info!(admin_id = %admin.user.id, content_id = %created.id, "Admin created content");
    Ok(ApiResponse::ok(created))
}

async fn update_content(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateContentRequest>,
) -> AppResult<ApiResponse<ContentResponse>> {
    let updated = state
        .content_service
        .update(&admin.viewer, &req.content_id, req.changes)
        .await?;
    tracing::info!(admin_id = %admin.user.id, content_id = %updated.id, "Admin updated content");
    Ok(ApiResponse::ok(updated))
}

async fn toggle_publish(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<ContentIdRequest>,
) -> AppResult<ApiResponse<PublishedResponse>> {
    let published = state
        .content_service
        .toggle_publish(&admin.viewer, &req.content_id)
        .await?;
    tracing::info!(admin_id = %admin.user.id, content_id = %req.content_id, published, "Admin toggled publish flag");
    Ok(ApiResponse::ok(PublishedResponse { published }))
}

async fn delete_content(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<ContentIdRequest>,
) -> AppResult<impl IntoResponse> {
    state
        .content_service
        .delete(&admin.viewer, &req.content_id)
        .await?;
    tracing::info!(admin_id = %admin.user.id, content_id = %req.content_id, "Admin deleted content");
    Ok(response::ok())
}

/// Create admin router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/content/list", post(list_content))
        .route("/content/create", post(create_content))
        .route("/content/update", post(update_content))
        .route("/content/toggle-publish", post(toggle_publish))
        .route("/content/delete", post(delete_content))
}
