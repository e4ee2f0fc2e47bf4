//! Event publisher service.
//!
//! Provides an abstraction for publishing real-time events.
//! The actual implementation lives in the API crate (Server-Sent Events).

use async_trait::async_trait;
use outliers_common::AppResult;
use outliers_db::entities::notification;
use serde::Serialize;
use std::sync::Arc;

/// Channel notification changes are published on.
pub const NOTIFICATION_CHANNEL: &str = "notification-changes";

/// Event name for a freshly created notification.
pub const NEW_NOTIFICATION_EVENT: &str = "new-notification";

/// Event types for real-time updates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "body")]
pub enum StreamEvent {
    /// A new notification was created.
    #[serde(rename = "new-notification")]
    Notification {
        id: String,
        #[serde(rename = "userId")]
        user_id: String,
        #[serde(rename = "notificationType")]
        notification_type: notification::NotificationType,
        content: String,
        #[serde(rename = "senderId")]
        sender_id: Option<String>,
        #[serde(rename = "contentId")]
        content_id: Option<String>,
        #[serde(rename = "createdAt")]
        created_at: String,
    },
}

impl StreamEvent {
    /// Event name as seen by subscribers.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Notification { .. } => NEW_NOTIFICATION_EVENT,
        }
    }

    /// The user this event is addressed to.
    #[must_use]
    pub fn recipient(&self) -> &str {
        match self {
            Self::Notification { user_id, .. } => user_id,
        }
    }
}

impl From<&notification::Model> for StreamEvent {
    fn from(n: &notification::Model) -> Self {
        Self::Notification {
            id: n.id.clone(),
            user_id: n.user_id.clone(),
            notification_type: n.notification_type,
            content: n.content.clone(),
            sender_id: n.sender_id.clone(),
            content_id: n.content_id.clone(),
            created_at: n.created_at.to_rfc3339(),
        }
    }
}

/// Trait for publishing real-time events.
///
/// This allows the core services to publish events
/// without directly depending on the transport.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event to its recipient.
    async fn publish(&self, event: StreamEvent) -> AppResult<()>;
}

/// A no-op implementation of `EventPublisher` for testing or when real-time events are disabled.
#[derive(Clone, Default)]
pub struct NoOpEventPublisher;

#[async_trait]
impl EventPublisher for NoOpEventPublisher {
    async fn publish(&self, _event: StreamEvent) -> AppResult<()> {
        Ok(())
    }
}

/// Wrapper for boxed `EventPublisher` trait object.
pub type EventPublisherService = Arc<dyn EventPublisher>;
