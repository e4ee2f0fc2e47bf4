//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use outliers_core::{
    AuthService, CommentService, ContentService, LikeService, NotificationService, ProfileService,
    SettingsService, UploadService,
};

use crate::sse::SseBroadcaster;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub profile_service: ProfileService,
    pub content_service: ContentService,
    pub comment_service: CommentService,
    pub like_service: LikeService,
    pub notification_service: NotificationService,
    pub settings_service: SettingsService,
    pub upload_service: UploadService,
    pub sse_broadcaster: SseBroadcaster,
}

/// Authentication middleware.
///
/// Reads the bearer token from the `Authorization` header, or from the
/// `token` query parameter for clients that cannot set headers (`EventSource`).
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(&req)
        && let Ok(user) = state.auth_service.authenticate_by_token(&token).await
    {
        let viewer = state.auth_service.viewer(&user);
        req.extensions_mut().insert(user);
        req.extensions_mut().insert(viewer);
    }

    next.run(req).await
}

fn bearer_token(req: &Request<Body>) -> Option<String> {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    req.uri().query().and_then(|query| {
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == "token")
            .map(|(_, value)| value.into_owned())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_from_header() {
        let req = Request::builder()
            .uri("/api/session")
            .header("Authorization", "Bearer abc123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&req).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_bearer_token_from_query() {
        let req = Request::builder()
            .uri("/api/streaming/notifications?token=abc123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&req).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_no_token() {
        let req = Request::builder()
            .uri("/api/content/feed")
            .header("Authorization", "Basic xyz")
            .body(Body::empty())
            .unwrap();
        assert!(bearer_token(&req).is_none());
    }
}
