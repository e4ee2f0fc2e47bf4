//! Password reset repository.

use std::sync::Arc;

use crate::entities::{PasswordReset, password_reset};
use outliers_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

/// Password reset repository for database operations.
#[derive(Clone)]
pub struct PasswordResetRepository {
    db: Arc<DatabaseConnection>,
}

impl PasswordResetRepository {
    /// Create a new password reset repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Store a new reset request.
    pub async fn create(
        &self,
        model: password_reset::ActiveModel,
    ) -> AppResult<password_reset::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a reset request by the hash of its token.
    pub async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> AppResult<Option<password_reset::Model>> {
        PasswordReset::find()
            .filter(password_reset::Column::TokenHash.eq(token_hash))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Mark a reset request as consumed.
    pub async fn mark_used(
        &self,
        reset: password_reset::Model,
        at: chrono::DateTime<chrono::Utc>,
    ) -> AppResult<password_reset::Model> {
        let mut active: password_reset::ActiveModel = reset.into();
        active.used_at = Set(Some(at.into()));
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
