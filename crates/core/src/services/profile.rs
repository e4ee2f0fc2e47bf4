//! Profile service.

use crate::services::{
    non_blank, notification::NotificationService, session::Viewer, upload::UploadService,
    validate_media_url,
};
use outliers_common::{AppError, AppResult};
use outliers_db::{
    entities::{profile, user},
    repositories::{ProfileRepository, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Input for creating a profile.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileInput {
    #[validate(length(max = 256))]
    pub business_name: String,

    /// Defaults to the name given at sign up.
    #[validate(length(max = 256))]
    pub owner_name: Option<String>,

    /// Defaults to the sign-in email. Blank counts as absent.
    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(max = 2048))]
    pub bio: Option<String>,

    #[validate(custom(function = "validate_media_url"))]
    pub photo_url: Option<String>,
}

/// Input for updating a profile.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    #[validate(length(max = 256))]
    pub business_name: Option<String>,

    #[validate(length(max = 256))]
    pub owner_name: Option<String>,

    /// Blank leaves the email unchanged.
    #[validate(email)]
    pub email: Option<String>,

    /// A blank bio clears it.
    #[validate(length(max = 2048))]
    pub bio: Option<String>,

    #[validate(custom(function = "validate_media_url"))]
    pub photo_url: Option<String>,

    #[serde(default)]
    pub remove_photo: bool,
}

/// A profile as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub owner_name: String,
    pub business_name: String,
    /// Hidden from other users when the owner has privacy mode on.
    pub email: Option<String>,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<profile::Model> for ProfileResponse {
    fn from(p: profile::Model) -> Self {
        Self {
            id: p.id,
            owner_name: p.owner_name,
            business_name: p.business_name,
            email: Some(p.email),
            bio: p.bio,
            photo_url: p.photo_url,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

impl ProfileResponse {
    fn redacted(mut self) -> Self {
        self.email = None;
        self.bio = None;
        self
    }
}

/// Profile service for business logic.
#[derive(Clone)]
pub struct ProfileService {
    profile_repo: ProfileRepository,
    user_repo: UserRepository,
    notification_service: NotificationService,
    upload_service: Option<UploadService>,
}

impl ProfileService {
    /// Create a new profile service.
    #[must_use]
    pub const fn new(
        profile_repo: ProfileRepository,
        user_repo: UserRepository,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            profile_repo,
            user_repo,
            notification_service,
            upload_service: None,
        }
    }

    /// Remove stored photos from object storage when they are replaced or cleared.
    pub fn set_upload_service(&mut self, upload_service: UploadService) {
        self.upload_service = Some(upload_service);
    }

    /// Create the profile of a user. Each user has at most one.
    pub async fn create(
        &self,
        user_id: &str,
        mut input: CreateProfileInput,
    ) -> AppResult<ProfileResponse> {
        input.email = non_blank(input.email);
        input.validate()?;

        let user = self.user_repo.get_by_id(user_id).await?;

        let business_name = non_blank(Some(input.business_name))
            .ok_or_else(|| AppError::Validation("Business name is required".to_string()))?;
        let owner_name = non_blank(input.owner_name)
            .or_else(|| non_blank(user.name.clone()))
            .ok_or_else(|| AppError::Validation("Owner name is required".to_string()))?;
        let email = non_blank(input.email).unwrap_or_else(|| user.email.clone());

        let model = profile::ActiveModel {
            id: Set(user.id.clone()),
            owner_name: Set(owner_name),
            business_name: Set(business_name),
            email: Set(email),
            bio: Set(non_blank(input.bio)),
            photo_url: Set(non_blank(input.photo_url)),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.profile_repo.create(model).await?;
        tracing::info!(user_id = %user.id, "Profile created");

        if let Err(e) = self.notification_service.notify_welcome(&user.id).await {
            tracing::warn!(error = %e, user_id = %user.id, "Failed to send welcome notification");
        }

        Ok(created.into())
    }

    /// Update the profile of a user.
    pub async fn update(
        &self,
        user_id: &str,
        mut input: UpdateProfileInput,
    ) -> AppResult<ProfileResponse> {
        input.email = non_blank(input.email);
        input.validate()?;

        let existing = self.profile_repo.get_by_id(user_id).await?;
        let previous_photo = existing.photo_url.clone();
        let mut active: profile::ActiveModel = existing.into();

        if let Some(business_name) = input.business_name {
            let business_name = non_blank(Some(business_name))
                .ok_or_else(|| AppError::Validation("Business name is required".to_string()))?;
            active.business_name = Set(business_name);
        }

        if let Some(owner_name) = input.owner_name {
            let owner_name = non_blank(Some(owner_name))
                .ok_or_else(|| AppError::Validation("Owner name is required".to_string()))?;
            active.owner_name = Set(owner_name);
        }

        if let Some(email) = input.email {
            active.email = Set(email);
        }

        if let Some(bio) = input.bio {
            active.bio = Set(non_blank(Some(bio)));
        }

        if input.remove_photo {
            active.photo_url = Set(None);
        } else if let Some(photo_url) = non_blank(input.photo_url) {
            active.photo_url = Set(Some(photo_url));
        }

        active.updated_at = Set(Some(chrono::Utc::now().into()));

        let updated = self.profile_repo.update(active).await?;

        if let Some(previous) = previous_photo
            && updated.photo_url.as_deref() != Some(previous.as_str())
        {
            self.discard_photo(user_id, &previous).await;
        }

        Ok(updated.into())
    }

    async fn discard_photo(&self, user_id: &str, url: &str) {
        let Some(upload_service) = &self.upload_service else {
            return;
        };
        if let Err(e) = upload_service.remove_profile_photo(url).await {
            tracing::warn!(error = %e, user_id = %user_id, "Failed to delete old profile photo");
        }
    }

    /// Get a profile as seen by `viewer`.
    pub async fn get(&self, viewer: Option<&Viewer>, user_id: &str) -> AppResult<ProfileResponse> {
        let found = self.profile_repo.get_by_id(user_id).await?;

        let is_privileged = viewer.is_some_and(|v| v.can_manage(user_id));
        if is_privileged {
            return Ok(found.into());
        }

        let owner: user::Model = self.user_repo.get_by_id(user_id).await?;
        let response = ProfileResponse::from(found);
        Ok(if owner.privacy_mode {
            response.redacted()
        } else {
            response
        })
    }

    /// The signed-in user's own profile, if created.
    pub async fn get_mine(&self, user_id: &str) -> AppResult<Option<ProfileResponse>> {
        Ok(self
            .profile_repo
            .find_by_id(user_id)
            .await?
            .map(ProfileResponse::from))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use outliers_common::{DateFormatter, IdGenerator, LocalStorage, config::StorageSettings};
    use outliers_db::{
        entities::notification::{self, NotificationType},
        repositories::NotificationRepository,
    };
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn create_test_user(id: &str, privacy_mode: bool) -> user::Model {
        user::Model {
            id: id.to_string(),
            email: "maria@example.com".to_string(),
            password: "hash".to_string(),
            token: Some("token".to_string()),
            name: Some("Maria Silva".to_string()),
            email_notifications: true,
            content_notifications: true,
            privacy_mode,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_profile(id: &str) -> profile::Model {
        profile::Model {
            id: id.to_string(),
            owner_name: "Maria Silva".to_string(),
            business_name: "Silva Consulting".to_string(),
            email: "maria@example.com".to_string(),
            bio: Some("Strategy for small firms".to_string()),
            photo_url: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_welcome(user_id: &str) -> notification::Model {
        notification::Model {
            id: "n1".to_string(),
            user_id: user_id.to_string(),
            notification_type: NotificationType::System,
            content: crate::services::notification::WELCOME_MESSAGE.to_string(),
            sender_id: None,
            content_id: None,
            read: false,
            created_at: Utc::now().into(),
        }
    }

    fn service(db: Arc<DatabaseConnection>) -> ProfileService {
        let notifications = NotificationService::new(
            NotificationRepository::new(db.clone()),
            ProfileRepository::new(db.clone()),
            DateFormatter::default(),
        );
        ProfileService::new(
            ProfileRepository::new(db.clone()),
            UserRepository::new(db),
            notifications,
        )
    }

    #[tokio::test]
    async fn test_create_profile_is_keyed_by_user_id() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("user1", false)]])
                .append_query_results([[create_test_profile("user1")]])
                .append_query_results([[create_welcome("user1")]])
                .into_connection(),
        );

        let input = CreateProfileInput {
            business_name: "Silva Consulting".to_string(),
            owner_name: None,
            email: None,
            bio: Some("Strategy for small firms".to_string()),
            photo_url: None,
        };

        let created = service(db).create("user1", input).await.unwrap();
        assert_eq!(created.id, "user1");
        assert_eq!(created.owner_name, "Maria Silva");
    }

    #[tokio::test]
    async fn test_create_profile_requires_business_name() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("user1", false)]])
                .into_connection(),
        );

        let input = CreateProfileInput {
            business_name: "   ".to_string(),
            owner_name: None,
            email: None,
            bio: None,
            photo_url: None,
        };

        let result = service(db).create("user1", input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_blank_owner_name() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_profile("user1")]])
                .into_connection(),
        );

        let input = UpdateProfileInput {
            owner_name: Some(String::new()),
            ..UpdateProfileInput::default()
        };

        let result = service(db).update("user1", input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_private_profile_hides_contact_details() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_profile("user1")]])
                .append_query_results([[create_test_user("user1", true)]])
                .into_connection(),
        );

        let viewer = Viewer {
            id: "user2".to_string(),
            is_admin: false,
        };

        let shown = service(db).get(Some(&viewer), "user1").await.unwrap();
        assert!(shown.email.is_none());
        assert!(shown.bio.is_none());
        assert_eq!(shown.business_name, "Silva Consulting");
    }

    #[tokio::test]
    async fn test_owner_sees_own_private_profile() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_profile("user1")]])
                .into_connection(),
        );

        let viewer = Viewer {
            id: "user1".to_string(),
            is_admin: false,
        };

        let shown = service(db).get(Some(&viewer), "user1").await.unwrap();
        assert_eq!(shown.email.as_deref(), Some("maria@example.com"));
    }

    #[tokio::test]
    async fn test_update_accepts_uploaded_photo_path() {
        let photo = "/files/outliers/profiles/profile-user1-1700000000000";
        let mut updated = create_test_profile("user1");
        updated.photo_url = Some(photo.to_string());
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_profile("user1")]])
                .append_query_results([[updated]])
                .into_connection(),
        );

        let input = UpdateProfileInput {
            photo_url: Some(photo.to_string()),
            ..UpdateProfileInput::default()
        };

        let shown = service(db).update("user1", input).await.unwrap();
        assert_eq!(shown.photo_url.as_deref(), Some(photo));
    }

    #[tokio::test]
    async fn test_update_treats_blank_fields_as_absent() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_profile("user1")]])
                .append_query_results([[create_test_profile("user1")]])
                .into_connection(),
        );

        let input = UpdateProfileInput {
            email: Some("  ".to_string()),
            photo_url: Some(String::new()),
            ..UpdateProfileInput::default()
        };

        let shown = service(db).update("user1", input).await.unwrap();
        assert_eq!(shown.email.as_deref(), Some("maria@example.com"));
    }

    #[test]
    fn test_rejects_script_photo_url() {
        let input = CreateProfileInput {
            business_name: "Silva Consulting".to_string(),
            owner_name: None,
            email: Some(String::new()),
            bio: None,
            photo_url: Some("javascript:alert(1)".to_string()),
        };
        assert!(input.validate().is_err());
    }

    #[tokio::test]
    async fn test_removing_photo_deletes_stored_file() {
        let dir = std::env::temp_dir()
            .join(format!("outliers-profile-{}", IdGenerator::new().generate()));
        let storage = LocalStorage::new(dir.clone(), "/files".to_string());
        let uploads = UploadService::new(Arc::new(storage), &StorageSettings::default());
        let owner = Viewer {
            id: "user1".to_string(),
            is_admin: false,
        };
        let file = uploads
            .upload_profile_photo(&owner, b"\x89PNG", "image/png")
            .await
            .unwrap();
        let stored = dir.join(&file.bucket).join(&file.key);
        assert!(stored.exists());

        let mut existing = create_test_profile("user1");
        existing.photo_url = Some(file.url.clone());
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .append_query_results([[create_test_profile("user1")]])
                .into_connection(),
        );
        let mut profiles = service(db);
        profiles.set_upload_service(uploads);

        let input = UpdateProfileInput {
            remove_photo: true,
            ..UpdateProfileInput::default()
        };
        let shown = profiles.update("user1", input).await.unwrap();

        assert!(shown.photo_url.is_none());
        assert!(!stored.exists());

        std::fs::remove_dir_all(dir).ok();
    }
}
