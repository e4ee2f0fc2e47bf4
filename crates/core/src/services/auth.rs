//! Authentication service: sign up, sign in, sessions and password resets.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use outliers_common::{AppError, AppResult, Config, IdGenerator, config::AuthConfig, hash_secret};
use outliers_db::{
    entities::{password_reset, user},
    repositories::{PasswordResetRepository, ProfileRepository, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::{
    mail::MailService,
    profile::ProfileResponse,
    session::{Route, SessionState, Viewer},
};

/// Input for signing up.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignUpInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(max = 128))]
    pub password: String,

    pub confirm_password: String,
}

/// Input for signing in.
#[derive(Debug, Deserialize)]
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// Input for completing a password reset.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPasswordResetInput {
    pub token: String,

    #[validate(length(max = 128))]
    pub password: String,

    pub confirm_password: String,
}

/// The signed-in user's account.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

/// Current session as seen by the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub state: SessionState,
    pub user: UserResponse,
    pub profile: Option<ProfileResponse>,
    pub is_admin: bool,
}

/// Result of signing in or up.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResult {
    pub token: String,
    pub session: SessionInfo,
    /// Where the client should navigate next.
    pub redirect_to: String,
}

/// Authentication service for business logic.
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    profile_repo: ProfileRepository,
    reset_repo: PasswordResetRepository,
    mail: MailService,
    id_gen: IdGenerator,
    auth: AuthConfig,
    server_url: String,
}

impl AuthService {
    /// Create a new auth service.
    #[must_use]
    pub fn new(
        user_repo: UserRepository,
        profile_repo: ProfileRepository,
        reset_repo: PasswordResetRepository,
        mail: MailService,
        config: &Config,
    ) -> Self {
        Self {
            user_repo,
            profile_repo,
            reset_repo,
            mail,
            id_gen: IdGenerator::new(),
            auth: config.auth.clone(),
            server_url: config.server.url.clone(),
        }
    }

    /// Register a new identity and start its session.
    pub async fn sign_up(&self, input: SignUpInput) -> AppResult<AuthResult> {
        input.validate()?;
        self.check_new_password(&input.password, &input.confirm_password)?;

        let email = input.email.trim().to_lowercase();
        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email is already registered".to_string()));
        }

        let token = self.id_gen.generate_token();
        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            email: Set(email),
            password: Set(hash_password(&input.password)?),
            token: Set(Some(token.clone())),
            name: Set(Some(input.name.trim().to_string())),
            email_notifications: Set(true),
            content_notifications: Set(true),
            privacy_mode: Set(false),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.user_repo.create(model).await?;
        tracing::info!(user_id = %created.id, "User signed up");

        let is_admin = self.auth.is_admin_email(&created.email);
        Ok(AuthResult {
            token,
            session: SessionInfo {
                state: SessionState::AuthenticatedNoProfile,
                user: created.into(),
                profile: None,
                is_admin,
            },
            redirect_to: Route::CreateProfile.path().to_string(),
        })
    }

    /// Sign in with email and password.
    ///
    /// Every failure yields [`AppError::InvalidCredentials`], so callers
    /// cannot tell an unknown email from a wrong password.
    pub async fn sign_in(&self, input: SignInInput) -> AppResult<AuthResult> {
        let user = self
            .user_repo
            .find_by_email(&input.email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(&input.password, &user.password).unwrap_or(false) {
            tracing::debug!(user_id = %user.id, "Rejected sign in");
            return Err(AppError::InvalidCredentials);
        }

        let (user, token) = match user.token.clone() {
            Some(token) => (user, token),
            None => {
                let token = self.id_gen.generate_token();
                let mut active: user::ActiveModel = user.into();
                active.token = Set(Some(token.clone()));
                (self.user_repo.update(active).await?, token)
            }
        };

        let session = self.session(user).await?;
        Ok(AuthResult {
            token,
            session,
            redirect_to: Route::Home.path().to_string(),
        })
    }

    /// End the session of a user. The bearer token is rotated, so the
    /// one the client holds stops working; the next sign in hands out the new one.
    pub async fn sign_out(&self, user_id: &str) -> AppResult<String> {
        self.refresh_token(user_id).await?;
        tracing::info!(user_id = %user_id, "Signed out");

        Ok(Route::Login.path().to_string())
    }

    /// Replace the bearer token of a user.
    pub async fn refresh_token(&self, user_id: &str) -> AppResult<String> {
        let user = self.user_repo.get_by_id(user_id).await?;
        let new_token = self.id_gen.generate_token();

        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(new_token.clone()));
        active.updated_at = Set(Some(Utc::now().into()));

        self.user_repo.update(active).await?;

        Ok(new_token)
    }

    /// Authenticate a user by token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Describe the session of a signed-in user.
    pub async fn session(&self, user: user::Model) -> AppResult<SessionInfo> {
        let profile = self.profile_repo.find_by_id(&user.id).await?;
        let is_admin = self.is_admin(&user);

        Ok(SessionInfo {
            state: SessionState::resolve(true, profile.is_some()),
            user: user.into(),
            profile: profile.map(ProfileResponse::from),
            is_admin,
        })
    }

    /// Whether the user may use the admin panel.
    #[must_use]
    pub fn is_admin(&self, user: &user::Model) -> bool {
        self.auth.is_admin_email(&user.email)
    }

    /// The acting identity for a user.
    #[must_use]
    pub fn viewer(&self, user: &user::Model) -> Viewer {
        Viewer {
            id: user.id.clone(),
            is_admin: self.is_admin(user),
        }
    }

    /// Start a password reset.
    ///
    /// Succeeds whether or not the email belongs to an account.
    pub async fn request_password_reset(&self, email: &str) -> AppResult<()> {
        let Some(user) = self.user_repo.find_by_email(email).await? else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let secret = self.id_gen.generate_secret();
        let now = Utc::now();
        let model = password_reset::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user.id.clone()),
            token_hash: Set(hash_secret(&secret)),
            expires_at: Set((now + Duration::minutes(self.auth.reset_token_ttl_minutes)).into()),
            used_at: Set(None),
            created_at: Set(now.into()),
        };
        self.reset_repo.create(model).await?;

        let link = format!(
            "{}/reset-password?token={secret}",
            self.server_url.trim_end_matches('/')
        );
        if let Err(e) = self.mail.send_password_reset(&user.email, &link).await {
            tracing::warn!(error = %e, user_id = %user.id, "Failed to send password reset mail");
        }

        Ok(())
    }

    /// Complete a password reset and end existing sessions.
    pub async fn confirm_password_reset(&self, input: ConfirmPasswordResetInput) -> AppResult<()> {
        input.validate()?;
        self.check_new_password(&input.password, &input.confirm_password)?;

        let invalid = || AppError::BadRequest("Invalid or expired reset token".to_string());

        let reset = self
            .reset_repo
            .find_by_token_hash(&hash_secret(&input.token))
            .await?
            .ok_or_else(invalid)?;

        let now = Utc::now();
        if reset.used_at.is_some() || reset.expires_at.to_utc() <= now {
            return Err(invalid());
        }

        let user = self.user_repo.get_by_id(&reset.user_id).await?;
        let user_id = user.id.clone();
        let mut active: user::ActiveModel = user.into();
        active.password = Set(hash_password(&input.password)?);
        // Ends every open session
        active.token = Set(Some(self.id_gen.generate_token()));
        active.updated_at = Set(Some(now.into()));
        self.user_repo.update(active).await?;

        self.reset_repo.mark_used(reset, now).await?;
        tracing::info!(user_id = %user_id, "Password reset completed");

        Ok(())
    }

    fn check_new_password(&self, password: &str, confirm: &str) -> AppResult<()> {
        if password != confirm {
            return Err(AppError::Validation("Passwords do not match".to_string()));
        }
        if password.chars().count() < self.auth.password_min_length {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters",
                self.auth.password_min_length
            )));
        }
        Ok(())
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use outliers_db::entities::profile;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn create_test_user(id: &str, password: &str, token: Option<&str>) -> user::Model {
        user::Model {
            id: id.to_string(),
            email: "maria@example.com".to_string(),
            password: hash_password(password).unwrap(),
            token: token.map(str::to_string),
            name: Some("Maria".to_string()),
            email_notifications: true,
            content_notifications: true,
            privacy_mode: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_profile(id: &str) -> profile::Model {
        profile::Model {
            id: id.to_string(),
            owner_name: "Maria".to_string(),
            business_name: "Silva Consulting".to_string(),
            email: "maria@example.com".to_string(),
            bio: None,
            photo_url: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(db: Arc<DatabaseConnection>) -> AuthService {
        AuthService::new(
            UserRepository::new(db.clone()),
            ProfileRepository::new(db.clone()),
            PasswordResetRepository::new(db),
            MailService::log_only(),
            &Config::for_tests(),
        )
    }

    #[test]
    fn test_hash_password() {
        let hash = hash_password("test_password_123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("test_password_123", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_sign_up_rejects_mismatched_passwords() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let input = SignUpInput {
            name: "Maria".to_string(),
            email: "maria@example.com".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret2".to_string(),
        };

        let result = service(db).sign_up(input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_sign_up_rejects_short_password() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let input = SignUpInput {
            name: "Maria".to_string(),
            email: "maria@example.com".to_string(),
            password: "abc".to_string(),
            confirm_password: "abc".to_string(),
        };

        let result = service(db).sign_up(input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_sign_up_redirects_to_create_profile() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([[create_test_user("user1", "secret1", Some("t"))]])
                .into_connection(),
        );

        let input = SignUpInput {
            name: "Maria".to_string(),
            email: "Maria@Example.com".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        };

        let result = service(db).sign_up(input).await.unwrap();
        assert_eq!(result.session.state, SessionState::AuthenticatedNoProfile);
        assert_eq!(result.redirect_to, "/create-profile");
        assert!(!result.token.is_empty());
    }

    #[tokio::test]
    async fn test_sign_up_duplicate_email_conflicts() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("user1", "secret1", None)]])
                .into_connection(),
        );

        let input = SignUpInput {
            name: "Maria".to_string(),
            email: "maria@example.com".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        };

        let result = service(db).sign_up(input).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_sign_in_unknown_email_is_generic() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let input = SignInInput {
            email: "nobody@example.com".to_string(),
            password: "secret1".to_string(),
        };

        let err = service(db).sign_in(input).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
        assert_eq!(err.to_string(), "Invalid credentials. Please try again.");
    }

    #[tokio::test]
    async fn test_sign_in_wrong_password_is_generic() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("user1", "secret1", Some("t"))]])
                .into_connection(),
        );

        let input = SignInInput {
            email: "maria@example.com".to_string(),
            password: "wrong-password".to_string(),
        };

        let result = service(db).sign_in(input).await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_sign_in_with_profile_goes_home() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("user1", "secret1", Some("tok"))]])
                .append_query_results([[create_test_profile("user1")]])
                .into_connection(),
        );

        let input = SignInInput {
            email: "maria@example.com".to_string(),
            password: "secret1".to_string(),
        };

        let result = service(db).sign_in(input).await.unwrap();
        assert_eq!(result.token, "tok");
        assert_eq!(result.session.state, SessionState::AuthenticatedWithProfile);
        assert_eq!(result.redirect_to, "/home");
        assert!(!result.session.is_admin);
    }

    #[tokio::test]
    async fn test_password_reset_for_unknown_email_succeeds() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        assert!(service(db)
            .request_password_reset("nobody@example.com")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_expired_reset_token_is_rejected() {
        let reset = password_reset::Model {
            id: "r1".to_string(),
            user_id: "user1".to_string(),
            token_hash: hash_secret("secret"),
            expires_at: (Utc::now() - Duration::minutes(5)).into(),
            used_at: None,
            created_at: (Utc::now() - Duration::minutes(65)).into(),
        };
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[reset]])
                .into_connection(),
        );

        let input = ConfirmPasswordResetInput {
            token: "secret".to_string(),
            password: "new-secret".to_string(),
            confirm_password: "new-secret".to_string(),
        };

        let result = service(db).confirm_password_reset(input).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    fn create_test_reset(used: bool) -> password_reset::Model {
        password_reset::Model {
            id: "r1".to_string(),
            user_id: "user1".to_string(),
            token_hash: hash_secret("secret"),
            expires_at: (Utc::now() + Duration::minutes(30)).into(),
            used_at: used.then(|| Utc::now().into()),
            created_at: (Utc::now() - Duration::minutes(30)).into(),
        }
    }

    fn executed_sql(db: Arc<DatabaseConnection>) -> Vec<String> {
        Arc::try_unwrap(db)
            .unwrap()
            .into_transaction_log()
            .iter()
            .flat_map(|t| t.statements().iter().map(|s| s.sql.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_confirm_password_reset_sets_password_and_consumes_token() {
        let mut updated = create_test_user("user1", "new-secret", Some("rotated"));
        updated.updated_at = Some(Utc::now().into());
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_reset(false)]])
                .append_query_results([[create_test_user("user1", "old-secret", Some("old"))]])
                .append_query_results([[updated]])
                .append_query_results([[create_test_reset(true)]])
                .into_connection(),
        );

        let input = ConfirmPasswordResetInput {
            token: "secret".to_string(),
            password: "new-secret".to_string(),
            confirm_password: "new-secret".to_string(),
        };
        service(db.clone()).confirm_password_reset(input).await.unwrap();

        let sql = executed_sql(db);
        assert_eq!(sql.len(), 4);
        assert!(sql[2].starts_with(r#"UPDATE "user""#));
        assert!(sql[2].contains(r#""password""#));
        assert!(sql[2].contains(r#""token""#));
        assert!(sql[3].starts_with(r#"UPDATE "password_reset""#));
        assert!(sql[3].contains(r#""used_at""#));
    }

    #[tokio::test]
    async fn test_used_reset_token_is_rejected() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_reset(true)]])
                .into_connection(),
        );

        let input = ConfirmPasswordResetInput {
            token: "secret".to_string(),
            password: "new-secret".to_string(),
            confirm_password: "new-secret".to_string(),
        };

        let err = service(db).confirm_password_reset(input).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m == "Invalid or expired reset token"));
    }

    #[tokio::test]
    async fn test_sign_out_rotates_token() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("user1", "secret1", Some("old"))]])
                .append_query_results([[create_test_user("user1", "secret1", Some("new"))]])
                .into_connection(),
        );

        let redirect = service(db.clone()).sign_out("user1").await.unwrap();
        assert_eq!(redirect, "/login");

        let sql = executed_sql(db);
        assert_eq!(sql.len(), 2);
        assert!(sql[1].starts_with(r#"UPDATE "user""#));
        assert!(sql[1].contains(r#""token""#));
    }

    #[tokio::test]
    async fn test_refresh_token_issues_new_token() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("user1", "secret1", Some("old"))]])
                .append_query_results([[create_test_user("user1", "secret1", Some("new"))]])
                .into_connection(),
        );

        let token = service(db).refresh_token("user1").await.unwrap();
        assert_ne!(token, "old");
        assert_eq!(token.len(), 32);
    }

    #[test]
    fn test_admin_comes_from_config() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service(db);

        let mut user = create_test_user("user1", "secret1", None);
        assert!(!service.viewer(&user).is_admin);

        user.email = "admin@outliers.test".to_string();
        assert!(service.viewer(&user).is_admin);
    }
}
