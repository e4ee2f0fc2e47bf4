//! API integration tests.
//!
//! These drive the router (with the auth middleware) against a mock database.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::redundant_clone)]

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    middleware,
};
use chrono::Utc;
use outliers_api::{AppState, SseBroadcaster, auth_middleware, router as api_router};
use outliers_common::{Config, DateFormatter, LocalStorage};
use outliers_core::{
    AuthService, CommentService, ContentService, LikeService, MailService, NotificationService,
    ProfileService, SettingsService, UploadService,
};
use outliers_db::{
    entities::{profile, user},
    repositories::{
        CommentRepository, ContentRepository, LikeRepository, NotificationRepository,
        PasswordResetRepository, ProfileRepository, UserRepository,
    },
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, Value};
use serde_json::Value as Json;
use tower::ServiceExt;

/// Create test app state on top of a database connection.
fn create_test_state(db: DatabaseConnection) -> AppState {
    let db = Arc::new(db);
    let config = Config::for_tests();
    let formatter = DateFormatter::default();

    let user_repo = UserRepository::new(Arc::clone(&db));
    let profile_repo = ProfileRepository::new(Arc::clone(&db));
    let content_repo = ContentRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let like_repo = LikeRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));
    let reset_repo = PasswordResetRepository::new(Arc::clone(&db));

    let sse_broadcaster = SseBroadcaster::new();
    let mut notification_service =
        NotificationService::new(notification_repo, profile_repo.clone(), formatter);
    notification_service.set_event_publisher(Arc::new(sse_broadcaster.clone()));

    let auth_service = AuthService::new(
        user_repo.clone(),
        profile_repo.clone(),
        reset_repo,
        MailService::log_only(),
        &config,
    );
    let storage = LocalStorage::new(
        std::env::temp_dir().join("outliers-api-tests"),
        "/files".to_string(),
    );
    let upload_service = UploadService::new(Arc::new(storage), &config.storage);
    let mut profile_service = ProfileService::new(
        profile_repo.clone(),
        user_repo.clone(),
        notification_service.clone(),
    );
    profile_service.set_upload_service(upload_service.clone());
    let content_service = ContentService::new(
        content_repo,
        comment_repo.clone(),
        like_repo.clone(),
        profile_repo.clone(),
        formatter,
    );
    let comment_service = CommentService::new(
        comment_repo.clone(),
        like_repo.clone(),
        profile_repo,
        content_service.clone(),
        notification_service.clone(),
        formatter,
    );
    let like_service = LikeService::new(
        like_repo,
        comment_repo,
        content_service.clone(),
        notification_service.clone(),
    );
    let settings_service = SettingsService::new(user_repo);

    AppState {
        auth_service,
        profile_service,
        content_service,
        comment_service,
        like_service,
        notification_service,
        settings_service,
        upload_service,
        sse_broadcaster,
    }
}

/// Create the test router with authentication.
fn create_test_router(db: DatabaseConnection) -> Router {
    let state = create_test_state(db);
    api_router()
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

fn create_test_user(email: &str) -> user::Model {
    user::Model {
        id: "user1".to_string(),
        email: email.to_string(),
        password: "hash".to_string(),
        token: Some("token1".to_string()),
        name: Some("Maria".to_string()),
        email_notifications: true,
        content_notifications: true,
        privacy_mode: false,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

fn post_json(uri: &str, body: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .uri(uri)
        .method("POST")
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(response: axum::response::Response) -> Json {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent/endpoint")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_signup_with_invalid_json_returns_error() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(post_json("/signup", "invalid json", None))
        .await
        .unwrap();

    assert!(
        response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[tokio::test]
async fn test_protected_endpoint_requires_token() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(post_json("/profiles/mine", "{}", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_signin_unknown_email_is_generic() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(post_json(
            "/signin",
            r#"{"email":"nobody@example.com","password":"secret1"}"#,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(
        body["error"]["message"],
        "Invalid credentials. Please try again."
    );
}

#[tokio::test]
async fn test_unauthenticated_navigation_to_protected_route_redirects_to_login() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(post_json("/navigation/resolve", r#"{"path":"/home"}"#, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["outcome"], "redirect");
    assert_eq!(body["data"]["to"], "/login");
}

#[tokio::test]
async fn test_navigation_to_unknown_route_is_not_found() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(post_json("/navigation/resolve", r#"{"path":"/nowhere"}"#, None))
        .await
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(body["data"]["outcome"], "notFound");
}

#[tokio::test]
async fn test_navigation_without_profile_redirects_to_create_profile() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[create_test_user("maria@example.com")]])
        .append_query_results([Vec::<profile::Model>::new()])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(post_json(
            "/navigation/resolve",
            r#"{"path":"/home"}"#,
            Some("token1"),
        ))
        .await
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(body["data"]["outcome"], "redirect");
    assert_eq!(body["data"]["to"], "/create-profile");
}

#[tokio::test]
async fn test_unread_count_for_signed_in_user() {
    let count: BTreeMap<String, Value> = BTreeMap::from([(
        "num_items".to_string(),
        Value::BigInt(Some(3)),
    )]);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[create_test_user("maria@example.com")]])
        .append_query_results([vec![count]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(post_json("/notifications/unread-count", "{}", Some("token1")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["count"], 3);
}

#[tokio::test]
async fn test_admin_panel_rejects_regular_users() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[create_test_user("maria@example.com")]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(post_json("/admin/content/list", "{}", Some("token1")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_notification_stream_requires_auth() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/streaming/notifications")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
