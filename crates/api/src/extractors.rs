//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use outliers_common::AppError;
use outliers_core::Viewer;
use outliers_db::entities::user;

/// Authenticated user extractor.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The signed-in user.
    pub user: user::Model,
    /// The same user as an acting identity.
    pub viewer: Viewer,
}

impl AuthUser {
    fn from_parts(parts: &Parts) -> Option<Self> {
        // Both are set by the auth middleware
        let user = parts.extensions.get::<user::Model>()?.clone();
        let viewer = parts.extensions.get::<Viewer>()?.clone();
        Some(Self { user, viewer })
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_parts(parts).ok_or(AppError::Unauthorized)
    }
}

/// Optional authenticated user extractor.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    /// The acting identity, if signed in.
    #[must_use]
    pub fn viewer(&self) -> Option<&Viewer> {
        self.0.as_ref().map(|auth| &auth.viewer)
    }
}

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(AuthUser::from_parts(parts)))
    }
}

/// Authenticated administrator extractor.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_parts(parts).ok_or(AppError::Unauthorized)?;
        if !auth.viewer.is_admin {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }
        Ok(Self(auth))
    }
}
