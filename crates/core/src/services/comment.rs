//! Comment service.

use std::collections::HashMap;

use chrono::Utc;
use outliers_common::{AppError, AppResult, DateFormatter, IdGenerator};
use outliers_db::{
    entities::comment,
    repositories::{CommentRepository, LikeRepository, ProfileRepository},
};
use sea_orm::Set;
use serde::Serialize;

use crate::services::{
    content::{AuthorSummary, ContentService},
    notification::NotificationService,
    session::Viewer,
};

/// Longest accepted comment, in characters.
pub const MAX_COMMENT_LENGTH: usize = 2000;

/// A comment as shown in a thread.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub content_id: String,
    pub user_id: String,
    pub author: Option<AuthorSummary>,
    pub content: String,
    pub like_count: i32,
    pub is_liked: bool,
    pub created_at: String,
    /// Creation time in the display timezone (`dd/mm/yyyy hh:mm`).
    pub created_date: String,
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    like_repo: LikeRepository,
    profile_repo: ProfileRepository,
    content_service: ContentService,
    notification_service: NotificationService,
    formatter: DateFormatter,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(
        comment_repo: CommentRepository,
        like_repo: LikeRepository,
        profile_repo: ProfileRepository,
        content_service: ContentService,
        notification_service: NotificationService,
        formatter: DateFormatter,
    ) -> Self {
        Self {
            comment_repo,
            like_repo,
            profile_repo,
            content_service,
            notification_service,
            formatter,
            id_gen: IdGenerator::new(),
        }
    }

    /// Comment on a content item the viewer can see.
    pub async fn add(
        &self,
        viewer: &Viewer,
        content_id: &str,
        text: &str,
    ) -> AppResult<CommentResponse> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::Validation("Comment cannot be empty".to_string()));
        }
        if text.chars().count() > MAX_COMMENT_LENGTH {
            return Err(AppError::Validation(format!(
                "Comment must be at most {MAX_COMMENT_LENGTH} characters"
            )));
        }

        let item = self
            .content_service
            .get_visible(Some(viewer), content_id)
            .await?;

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            content_id: Set(item.id.clone()),
            user_id: Set(viewer.id.clone()),
            content: Set(text.to_string()),
            likes: Set(0),
            created_at: Set(Utc::now().into()),
        };
        let created = self.comment_repo.create(model).await?;

        if let Err(e) = self
            .notification_service
            .notify_commented(&item.author_id, &viewer.id, &item.id, &item.title)
            .await
        {
            tracing::warn!(error = %e, comment_id = %created.id, "Failed to create comment notification");
        }

        self.describe(vec![created], Some(viewer))
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("Comment disappeared while describing".to_string()))
    }

    /// Comments on a content item, newest first.
    pub async fn list(
        &self,
        viewer: Option<&Viewer>,
        content_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<CommentResponse>> {
        let item = self.content_service.get_visible(viewer, content_id).await?;
        let comments = self
            .comment_repo
            .find_by_content(&item.id, limit, until_id)
            .await?;
        self.describe(comments, viewer).await
    }

    /// Delete a comment. Allowed for its author, the content author and admins.
    pub async fn delete(&self, viewer: &Viewer, comment_id: &str) -> AppResult<()> {
        let existing = self.comment_repo.get_by_id(comment_id).await?;

        if existing.user_id != viewer.id {
            let item = self
                .content_service
                .get_visible(Some(viewer), &existing.content_id)
                .await?;
            if !viewer.can_manage(&item.author_id) {
                return Err(AppError::Forbidden(
                    "You cannot delete this comment".to_string(),
                ));
            }
        }

        self.comment_repo.delete(comment_id).await?;
        tracing::debug!(comment_id = %comment_id, "Comment deleted");
        Ok(())
    }

    async fn describe(
        &self,
        comments: Vec<comment::Model>,
        viewer: Option<&Viewer>,
    ) -> AppResult<Vec<CommentResponse>> {
        if comments.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<String> = comments.iter().map(|c| c.id.clone()).collect();
        let mut user_ids: Vec<String> = comments.iter().map(|c| c.user_id.clone()).collect();
        user_ids.sort();
        user_ids.dedup();

        let liked = match viewer {
            Some(v) => self.like_repo.liked_comment_ids(&v.id, &ids).await?,
            None => Default::default(),
        };
        let authors: HashMap<String, AuthorSummary> = self
            .profile_repo
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|p| {
                (
                    p.id.clone(),
                    AuthorSummary {
                        id: p.id,
                        owner_name: p.owner_name,
                        business_name: p.business_name,
                        photo_url: p.photo_url,
                    },
                )
            })
            .collect();

        Ok(comments
            .into_iter()
            .map(|c| CommentResponse {
                author: authors.get(&c.user_id).cloned(),
                is_liked: liked.contains(&c.id),
                created_date: self.formatter.format_date_time(c.created_at.to_utc()),
                created_at: c.created_at.to_rfc3339(),
                id: c.id,
                content_id: c.content_id,
                user_id: c.user_id,
                content: c.content,
                like_count: c.likes,
            })
            .collect())
    }
}
