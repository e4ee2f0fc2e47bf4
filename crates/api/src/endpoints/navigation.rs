//! Navigation endpoint: where a session may go.

use axum::{Json, Router, extract::State, routing::post};
use outliers_common::AppResult;
use outliers_core::{Navigation, Route, SessionState, guard};
use serde::Deserialize;

use crate::{extractors::MaybeAuthUser, middleware::AppState, response::ApiResponse};

/// Resolve request.
#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub path: String,
}

/// Decide whether the session may open `path`, or where to send it instead.
async fn resolve(
    maybe: MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<ResolveRequest>,
) -> AppResult<ApiResponse<Navigation>> {
    let (session, is_admin) = match maybe.0 {
        Some(auth) => {
            let has_profile = state
                .profile_service
                .get_mine(&auth.user.id)
                .await?
                .is_some();
            (
                SessionState::resolve(true, has_profile),
                auth.viewer.is_admin,
            )
        }
        None => (SessionState::Unauthenticated, false),
    };

    let route = Route::from_path(&req.path);
    Ok(ApiResponse::ok(guard(route, session, is_admin)))
}

/// Create navigation router.
pub fn router() -> Router<AppState> {
    Router::new().route("/resolve", post(resolve))
}
