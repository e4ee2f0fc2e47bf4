//! Per-user settings.

use chrono::Utc;
use outliers_common::AppResult;
use outliers_db::{entities::user, repositories::UserRepository};
use sea_orm::Set;
use serde::{Deserialize, Serialize};

/// Settings of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    /// Where password reset links are sent.
    pub email: String,
    pub email_notifications: bool,
    pub content_notifications: bool,
    pub privacy_mode: bool,
}

impl From<user::Model> for SettingsResponse {
    fn from(u: user::Model) -> Self {
        Self {
            email: u.email,
            email_notifications: u.email_notifications,
            content_notifications: u.content_notifications,
            privacy_mode: u.privacy_mode,
        }
    }
}

/// Input for updating settings. Missing fields keep their value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsInput {
    pub email_notifications: Option<bool>,
    pub content_notifications: Option<bool>,
    pub privacy_mode: Option<bool>,
}

/// Settings service.
#[derive(Clone)]
pub struct SettingsService {
    user_repo: UserRepository,
}

impl SettingsService {
    /// Create a new settings service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    /// Current settings of a user.
    pub async fn get(&self, user_id: &str) -> AppResult<SettingsResponse> {
        Ok(self.user_repo.get_by_id(user_id).await?.into())
    }

    /// Change some settings of a user.
    pub async fn update(
        &self,
        user_id: &str,
        input: UpdateSettingsInput,
    ) -> AppResult<SettingsResponse> {
        let existing = self.user_repo.get_by_id(user_id).await?;
        let mut active: user::ActiveModel = existing.into();

        if let Some(value) = input.email_notifications {
            active.email_notifications = Set(value);
        }
        if let Some(value) = input.content_notifications {
            active.content_notifications = Set(value);
        }
        if let Some(value) = input.privacy_mode {
            active.privacy_mode = Set(value);
        }
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.user_repo.update(active).await?;
        tracing::debug!(user_id = %user_id, "Settings updated");
        Ok(updated.into())
    }
}
