//! Settings endpoints.

use axum::{Json, Router, extract::State, routing::post};
use outliers_common::AppResult;
use outliers_core::{SettingsResponse, UpdateSettingsInput};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

async fn show(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<SettingsResponse>> {
    let settings = state.settings_service.get(&auth.user.id).await?;
    Ok(ApiResponse::ok(settings))
}

async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateSettingsInput>,
) -> AppResult<ApiResponse<SettingsResponse>> {
    let settings = state.settings_service.update(&auth.user.id, req).await?;
    Ok(ApiResponse::ok(settings))
}

/// Create settings router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/show", post(show))
        .route("/update", post(update))
}
