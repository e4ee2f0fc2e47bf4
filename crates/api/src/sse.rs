//! Server-Sent Events (SSE) for real-time notifications.
//!
//! Each signed-in user gets a broadcast channel; the notification service
//! publishes into it through the [`EventPublisher`] implementation below.

#![allow(missing_docs)]

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use futures::stream::{self, Stream};
use outliers_common::AppResult;
use outliers_core::{EventPublisher, NOTIFICATION_CHANNEL, StreamEvent};
use tokio::sync::{RwLock, broadcast};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use crate::{extractors::AuthUser, middleware::AppState};

/// Per-user SSE broadcast channels.
#[derive(Clone, Default)]
pub struct SseBroadcaster {
    user_channels: Arc<RwLock<HashMap<String, broadcast::Sender<StreamEvent>>>>,
}

impl SseBroadcaster {
    /// Create a new SSE broadcaster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a user's channel, creating it on first use.
    ///
    /// The receiver is taken under the write lock, so `cleanup` never sees a
    /// channel between creation and its first subscriber.
    pub async fn subscribe(&self, user_id: &str) -> broadcast::Receiver<StreamEvent> {
        let mut channels = self.user_channels.write().await;
        channels
            .entry(user_id.to_string())
            .or_insert_with(|| broadcast::channel(100).0)
            .subscribe()
    }

    /// Broadcast an event to a specific user. Returns how many streams got it.
    pub async fn broadcast_to_user(&self, user_id: &str, event: StreamEvent) -> usize {
        let channels = self.user_channels.read().await;
        channels
            .get(user_id)
            .and_then(|sender| sender.send(event).ok())
            .unwrap_or(0)
    }

    /// Clean up inactive user channels.
    pub async fn cleanup(&self) {
        let mut channels = self.user_channels.write().await;
        channels.retain(|_, sender| sender.receiver_count() > 0);
    }

    /// Number of users with an open channel.
    pub async fn channel_count(&self) -> usize {
        self.user_channels.read().await.len()
    }
}

#[async_trait]
impl EventPublisher for SseBroadcaster {
    async fn publish(&self, event: StreamEvent) -> AppResult<()> {
        let recipient = event.recipient().to_string();
        let delivered = self.broadcast_to_user(&recipient, event).await;
        tracing::debug!(channel = NOTIFICATION_CHANNEL, user_id = %recipient, delivered, "Published stream event");
        Ok(())
    }
}

fn to_sse(event: &StreamEvent) -> Event {
    Event::default()
        .event(event.name())
        .json_data(event)
        .unwrap_or_else(|_| Event::default().data("error"))
}

/// Notification stream of the signed-in user.
async fn notifications_stream(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.sse_broadcaster.subscribe(&auth.user.id).await;
    tracing::debug!(user_id = %auth.user.id, "Notification stream opened");

    let stream = BroadcastStream::new(rx)
        .filter_map(|result| result.ok().map(|event| Ok(to_sse(&event))));

    let initial = stream::once(async {
        Ok(Event::default()
            .event("connected")
            .data(NOTIFICATION_CHANNEL))
    });

    Sse::new(initial.chain(stream)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("ping"),
    )
}

/// Create SSE router.
pub fn router() -> Router<AppState> {
    Router::new().route("/notifications", get(notifications_stream))
}
