//! Profile endpoints.

use axum::{Json, Router, extract::State, routing::post};
use outliers_common::AppResult;
use outliers_core::{CreateProfileInput, ProfileResponse, UpdateProfileInput};
use serde::Deserialize;

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Create the signed-in user's profile.
async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateProfileInput>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let profile = state.profile_service.create(&auth.user.id, req).await?;
    Ok(ApiResponse::ok(profile))
}

/// Update the signed-in user's profile.
async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateProfileInput>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let profile = state.profile_service.update(&auth.user.id, req).await?;
    Ok(ApiResponse::ok(profile))
}

/// Show profile request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowProfileRequest {
    pub user_id: String,
}

/// Show someone's profile.
async fn show(
    maybe: MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<ShowProfileRequest>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let profile = state
        .profile_service
        .get(maybe.viewer(), &req.user_id)
        .await?;
    Ok(ApiResponse::ok(profile))
}

/// The signed-in user's profile, or null before it is created.
async fn mine(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Option<ProfileResponse>>> {
    let profile = state.profile_service.get_mine(&auth.user.id).await?;
    Ok(ApiResponse::ok(profile))
}

/// Create profiles router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/update", post(update))
        .route("/show", post(show))
        .route("/mine", post(mine))
}
