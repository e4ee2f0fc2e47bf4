//! Image upload endpoints (multipart, field `file`).

use axum::{
    Router,
    extract::{Multipart, State},
    routing::post,
};
use outliers_common::{AppError, AppResult, UploadedFile};
use serde::Serialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Uploaded file response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub url: String,
    pub bucket: String,
    pub key: String,
    pub size: u64,
    pub content_type: String,
    pub md5: String,
}

impl From<UploadedFile> for UploadResponse {
    fn from(f: UploadedFile) -> Self {
        Self {
            url: f.url,
            bucket: f.bucket,
            key: f.key,
            size: f.size,
            content_type: f.content_type,
            md5: f.md5,
        }
    }
}

/// Pull the `file` field out of a multipart body.
async fn read_file(mut multipart: Multipart) -> AppResult<(Vec<u8>, String)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field
            .content_type()
            .map_or_else(|| "application/octet-stream".to_string(), ToString::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
            .to_vec();
        return Ok((data, content_type));
    }

    Err(AppError::BadRequest("Missing file field".to_string()))
}

async fn content_thumbnail(
    auth: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<ApiResponse<UploadResponse>> {
    let (data, content_type) = read_file(multipart).await?;
    let file = state
        .upload_service
        .upload_content_thumbnail(&auth.viewer, &data, &content_type)
        .await?;
    Ok(ApiResponse::ok(file.into()))
}

async fn profile_photo(
    auth: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<ApiResponse<UploadResponse>> {
    let (data, content_type) = read_file(multipart).await?;
    let file = state
        .upload_service
        .upload_profile_photo(&auth.viewer, &data, &content_type)
        .await?;
    Ok(ApiResponse::ok(file.into()))
}

/// Create uploads router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/content-thumbnail", post(content_thumbnail))
        .route("/profile-photo", post(profile_photo))
}
