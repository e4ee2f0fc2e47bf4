//! Authentication endpoints.

use axum::{Json, Router, extract::State, routing::post};
use outliers_common::AppResult;
use outliers_core::{
    AuthResult, ConfirmPasswordResetInput, Route, SessionInfo, SignInInput, SignUpInput,
};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Create a new account.
async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignUpInput>,
) -> AppResult<ApiResponse<AuthResult>> {
    let result = state.auth_service.sign_up(req).await?;
    Ok(ApiResponse::ok(result))
}

/// Sign in to an existing account.
async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SignInInput>,
) -> AppResult<ApiResponse<AuthResult>> {
    let result = state.auth_service.sign_in(req).await?;
    Ok(ApiResponse::ok(result))
}

/// Redirect response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectResponse {
    pub redirect_to: String,
}

/// Sign out (invalidate the current token).
async fn signout(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<RedirectResponse>> {
    let redirect_to = state.auth_service.sign_out(&auth.user.id).await?;
    Ok(ApiResponse::ok(RedirectResponse { redirect_to }))
}

/// Refresh token response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenResponse {
    pub token: String,
}

/// Replace the authentication token.
async fn refresh_token(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<RefreshTokenResponse>> {
    let token = state.auth_service.refresh_token(&auth.user.id).await?;
    Ok(ApiResponse::ok(RefreshTokenResponse { token }))
}

/// Current session.
async fn session(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<SessionInfo>> {
    let session = state.auth_service.session(auth.user).await?;
    Ok(ApiResponse::ok(session))
}

/// Password reset request.
#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

/// Acknowledgement that carries no data.
#[derive(Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// Ask for a password reset link.
async fn request_password_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetRequest>,
) -> AppResult<ApiResponse<OkResponse>> {
    state.auth_service.request_password_reset(&req.email).await?;
    Ok(ApiResponse::ok(OkResponse { ok: true }))
}

/// Choose a new password with a reset token.
async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(req): Json<ConfirmPasswordResetInput>,
) -> AppResult<ApiResponse<RedirectResponse>> {
    state.auth_service.confirm_password_reset(req).await?;
    Ok(ApiResponse::ok(RedirectResponse {
        redirect_to: Route::Login.path().to_string(),
    }))
}

/// Create auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/signout", post(signout))
        .route("/refresh-token", post(refresh_token))
        .route("/session", post(session))
        .route("/password-reset/request", post(request_password_reset))
        .route("/password-reset/confirm", post(confirm_password_reset))
}
