//! Business logic services.

#![allow(missing_docs)]

pub mod auth;
pub mod comment;
pub mod content;
pub mod event_publisher;
pub mod like;
pub mod mail;
pub mod notification;
pub mod profile;
pub mod session;
pub mod settings;
pub mod upload;

pub use auth::{
    AuthResult, AuthService, ConfirmPasswordResetInput, SessionInfo, SignInInput, SignUpInput,
    UserResponse,
};
pub use comment::{CommentResponse, CommentService};
pub use content::{
    AuthorSummary, ContentResponse, ContentService, CreateContentInput, UpdateContentInput,
};
pub use event_publisher::{
    EventPublisher, EventPublisherService, NEW_NOTIFICATION_EVENT, NOTIFICATION_CHANNEL,
    NoOpEventPublisher, StreamEvent,
};
pub use like::{LikeService, LikeState};
pub use mail::MailService;
pub use notification::{NotificationResponse, NotificationService};
pub use profile::{CreateProfileInput, ProfileResponse, ProfileService, UpdateProfileInput};
pub use session::{Navigation, Route, SessionState, Viewer, guard};
pub use settings::{SettingsResponse, SettingsService, UpdateSettingsInput};
pub use upload::UploadService;

/// Trim a string, treating blank as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Accept a path served by this host, as local storage hands out, or an
/// absolute http(s) URL. Blank values pass and are cleared later.
pub(crate) fn validate_media_url(value: &str) -> Result<(), validator::ValidationError> {
    let value = value.trim();
    if value.is_empty() || (value.starts_with('/') && !value.starts_with("//")) {
        return Ok(());
    }
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => Err(validator::ValidationError::new("url")),
    }
}

#[cfg(test)]
mod tests {
    use super::{non_blank, validate_media_url};

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some("   ".to_string())), None);
        assert_eq!(non_blank(Some(" bio ".to_string())), Some("bio".to_string()));
    }

    #[test]
    fn test_validate_media_url() {
        assert!(validate_media_url("").is_ok());
        assert!(validate_media_url("  ").is_ok());
        assert!(validate_media_url("/files/outliers/profiles/profile-u1-1").is_ok());
        assert!(validate_media_url("https://cdn.example.com/virtus/content/content-1").is_ok());

        assert!(validate_media_url("//evil.example.com/x.png").is_err());
        assert!(validate_media_url("javascript:alert(1)").is_err());
        assert!(validate_media_url("not a url").is_err());
    }
}
