//! Notification service.

use std::collections::HashMap;

use crate::services::event_publisher::{EventPublisherService, StreamEvent};
use outliers_common::{AppError, AppResult, DateFormatter, IdGenerator};
use outliers_db::{
    entities::notification::{self, NotificationType},
    repositories::{NotificationRepository, ProfileRepository},
};
use sea_orm::Set;
use serde::Serialize;

/// Message of the notification sent when a profile is created.
pub const WELCOME_MESSAGE: &str =
    "Welcome to Outliers! Complete your profile to start networking.";

/// A notification as shown in the panel.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub content: String,
    pub sender_id: Option<String>,
    pub sender_name: Option<String>,
    pub sender_photo: Option<String>,
    pub content_id: Option<String>,
    pub read: bool,
    pub created_at: String,
    /// Creation time in the display timezone (`dd/mm/yyyy hh:mm`).
    pub created_date: String,
}

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    profile_repo: ProfileRepository,
    event_publisher: Option<EventPublisherService>,
    formatter: DateFormatter,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(
        notification_repo: NotificationRepository,
        profile_repo: ProfileRepository,
        formatter: DateFormatter,
    ) -> Self {
        Self {
            notification_repo,
            profile_repo,
            event_publisher: None,
            formatter,
            id_gen: IdGenerator::new(),
        }
    }

    /// Set the event publisher.
    pub fn set_event_publisher(&mut self, event_publisher: EventPublisherService) {
        self.event_publisher = Some(event_publisher);
    }

    /// Notify a content author that someone liked their post.
    pub async fn notify_content_liked(
        &self,
        author_id: &str,
        liker_id: &str,
        content_id: &str,
        title: &str,
    ) -> AppResult<Option<notification::Model>> {
        // Don't notify yourself
        if author_id == liker_id {
            return Ok(None);
        }

        self.create_internal(
            author_id,
            Some(liker_id),
            NotificationType::Like,
            format!("liked your post \"{title}\""),
            Some(content_id),
        )
        .await
        .map(Some)
    }

    /// Notify a comment author that someone liked their comment.
    pub async fn notify_comment_liked(
        &self,
        comment_author_id: &str,
        liker_id: &str,
        content_id: &str,
    ) -> AppResult<Option<notification::Model>> {
        if comment_author_id == liker_id {
            return Ok(None);
        }

        self.create_internal(
            comment_author_id,
            Some(liker_id),
            NotificationType::Like,
            "liked your comment".to_string(),
            Some(content_id),
        )
        .await
        .map(Some)
    }

    /// Notify a content author about a new comment.
    pub async fn notify_commented(
        &self,
        author_id: &str,
        commenter_id: &str,
        content_id: &str,
        title: &str,
    ) -> AppResult<Option<notification::Model>> {
        if author_id == commenter_id {
            return Ok(None);
        }

        self.create_internal(
            author_id,
            Some(commenter_id),
            NotificationType::Comment,
            format!("commented on your post \"{title}\""),
            Some(content_id),
        )
        .await
        .map(Some)
    }

    /// Send the welcome notification.
    pub async fn notify_welcome(&self, user_id: &str) -> AppResult<notification::Model> {
        self.create_internal(
            user_id,
            None,
            NotificationType::System,
            WELCOME_MESSAGE.to_string(),
            None,
        )
        .await
    }

    /// Internal helper to create notifications.
    async fn create_internal(
        &self,
        user_id: &str,
        sender_id: Option<&str>,
        notification_type: NotificationType,
        content: String,
        content_id: Option<&str>,
    ) -> AppResult<notification::Model> {
        let model = notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            notification_type: Set(notification_type),
            content: Set(content),
            sender_id: Set(sender_id.map(std::string::ToString::to_string)),
            content_id: Set(content_id.map(std::string::ToString::to_string)),
            read: Set(false),
            created_at: Set(chrono::Utc::now().into()),
        };

        let notification = self.notification_repo.create(model).await?;

        // Publish real-time event
        if let Some(ref event_publisher) = self.event_publisher
            && let Err(e) = event_publisher
                .publish(StreamEvent::from(&notification))
                .await
        {
            tracing::warn!(error = %e, notification_id = %notification.id, "Failed to publish notification event");
        }

        Ok(notification)
    }

    /// Get notifications for a user, with sender names and photos.
    pub async fn list(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
        unread_only: bool,
    ) -> AppResult<Vec<NotificationResponse>> {
        let notifications = self
            .notification_repo
            .find_by_user(user_id, limit, until_id, unread_only)
            .await?;

        let mut sender_ids: Vec<String> = notifications
            .iter()
            .filter_map(|n| n.sender_id.clone())
            .collect();
        sender_ids.sort();
        sender_ids.dedup();

        let senders: HashMap<String, _> = self
            .profile_repo
            .find_by_ids(&sender_ids)
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        Ok(notifications
            .into_iter()
            .map(|n| {
                let sender = n.sender_id.as_ref().and_then(|id| senders.get(id));
                NotificationResponse {
                    sender_name: sender.map(|p| p.owner_name.clone()),
                    sender_photo: sender.and_then(|p| p.photo_url.clone()),
                    created_date: self.formatter.format_date_time(n.created_at.to_utc()),
                    created_at: n.created_at.to_rfc3339(),
                    id: n.id,
                    notification_type: n.notification_type,
                    content: n.content,
                    sender_id: n.sender_id,
                    content_id: n.content_id,
                    read: n.read,
                }
            })
            .collect())
    }

    /// Mark one of the user's notifications as read.
    pub async fn mark_as_read(&self, user_id: &str, notification_id: &str) -> AppResult<()> {
        if self
            .notification_repo
            .mark_as_read(user_id, notification_id)
            .await?
        {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Notification: {notification_id}")))
        }
    }

    /// Mark all notifications as read for a user.
    pub async fn mark_all_as_read(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.mark_all_as_read(user_id).await
    }

    /// Count unread notifications for a user.
    pub async fn count_unread(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(user_id).await
    }
}
