//! Like service for content items and comments.

use chrono::Utc;
use outliers_common::{AppError, AppResult, IdGenerator};
use outliers_db::{
    entities::like,
    repositories::{CommentRepository, LikeRepository},
};
use sea_orm::Set;
use serde::Serialize;

use crate::services::{
    content::ContentService, notification::NotificationService, session::Viewer,
};

/// Like state after a like or unlike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeState {
    pub liked: bool,
    pub like_count: u64,
}

/// Like service for business logic.
#[derive(Clone)]
pub struct LikeService {
    like_repo: LikeRepository,
    comment_repo: CommentRepository,
    content_service: ContentService,
    notification_service: NotificationService,
    id_gen: IdGenerator,
}

impl LikeService {
    /// Create a new like service.
    #[must_use]
    pub const fn new(
        like_repo: LikeRepository,
        comment_repo: CommentRepository,
        content_service: ContentService,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            like_repo,
            comment_repo,
            content_service,
            notification_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// Like a content item.
    pub async fn like_content(&self, viewer: &Viewer, content_id: &str) -> AppResult<LikeState> {
        let item = self
            .content_service
            .get_visible(Some(viewer), content_id)
            .await?;

        if self
            .like_repo
            .find_content_like(&viewer.id, &item.id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Already liked".to_string()));
        }

        let model = like::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(viewer.id.clone()),
            content_id: Set(Some(item.id.clone())),
            comment_id: Set(None),
            created_at: Set(Utc::now().into()),
        };
        self.like_repo.create(model).await?;

        if let Err(e) = self
            .notification_service
            .notify_content_liked(&item.author_id, &viewer.id, &item.id, &item.title)
            .await
        {
            tracing::warn!(error = %e, content_id = %item.id, "Failed to create like notification");
        }

        Ok(LikeState {
            liked: true,
            like_count: self.like_repo.count_for_content(&item.id).await?,
        })
    }

    /// Remove a like from a content item.
    pub async fn unlike_content(&self, viewer: &Viewer, content_id: &str) -> AppResult<LikeState> {
        if !self
            .like_repo
            .delete_content_like(&viewer.id, content_id)
            .await?
        {
            return Err(AppError::NotFound(format!("Like on content: {content_id}")));
        }

        Ok(LikeState {
            liked: false,
            like_count: self.like_repo.count_for_content(content_id).await?,
        })
    }

    /// Like a comment.
    pub async fn like_comment(&self, viewer: &Viewer, comment_id: &str) -> AppResult<LikeState> {
        let comment = self.comment_repo.get_by_id(comment_id).await?;
        // The thread must be readable
        self.content_service
            .get_visible(Some(viewer), &comment.content_id)
            .await?;

        if self
            .like_repo
            .find_comment_like(&viewer.id, &comment.id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Already liked".to_string()));
        }

        let model = like::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(viewer.id.clone()),
            content_id: Set(None),
            comment_id: Set(Some(comment.id.clone())),
            created_at: Set(Utc::now().into()),
        };
        self.like_repo.create(model).await?;
        self.comment_repo.increment_likes(&comment.id).await?;

        if let Err(e) = self
            .notification_service
            .notify_comment_liked(&comment.user_id, &viewer.id, &comment.content_id)
            .await
        {
            tracing::warn!(error = %e, comment_id = %comment.id, "Failed to create like notification");
        }

        let refreshed = self.comment_repo.get_by_id(&comment.id).await?;
        Ok(LikeState {
            liked: true,
            like_count: refreshed.likes.max(0) as u64,
        })
    }

    /// Remove a like from a comment.
    pub async fn unlike_comment(&self, viewer: &Viewer, comment_id: &str) -> AppResult<LikeState> {
        if !self
            .like_repo
            .delete_comment_like(&viewer.id, comment_id)
            .await?
        {
            return Err(AppError::NotFound(format!("Like on comment: {comment_id}")));
        }
        self.comment_repo.decrement_likes(comment_id).await?;

        let refreshed = self.comment_repo.get_by_id(comment_id).await?;
        Ok(LikeState {
            liked: false,
            like_count: refreshed.likes.max(0) as u64,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use outliers_common::DateFormatter;
    use outliers_db::{
        entities::{
            comment,
            content::{self, ContentType},
            notification::{self, NotificationType},
        },
        repositories::{ContentRepository, NotificationRepository, ProfileRepository},
    };
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn create_test_content() -> content::Model {
        content::Model {
            id: "c1".to_string(),
            author_id: "author1".to_string(),
            title: "Hello".to_string(),
            content_type: ContentType::Article,
            content: Some("Body".to_string()),
            video_url: None,
            thumbnail_url: None,
            scheduled_for: None,
            published: true,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_like() -> like::Model {
        like::Model {
            id: "l1".to_string(),
            user_id: "reader".to_string(),
            content_id: Some("c1".to_string()),
            comment_id: None,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_comment(likes: i32) -> comment::Model {
        comment::Model {
            id: "cm1".to_string(),
            content_id: "c1".to_string(),
            user_id: "author1".to_string(),
            content: "Thanks".to_string(),
            likes,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_notification() -> notification::Model {
        notification::Model {
            id: "n1".to_string(),
            user_id: "author1".to_string(),
            notification_type: NotificationType::Like,
            content: "liked your post \"Hello\"".to_string(),
            sender_id: Some("reader".to_string()),
            content_id: Some("c1".to_string()),
            read: false,
            created_at: Utc::now().into(),
        }
    }

    fn count_row(n: i64) -> BTreeMap<String, Value> {
        maplit::btreemap! {
            "num_items".to_string() => Value::BigInt(Some(n)),
        }
    }

    fn reader() -> Viewer {
        Viewer {
            id: "reader".to_string(),
            is_admin: false,
        }
    }

    fn service(db: Arc<DatabaseConnection>) -> LikeService {
        let formatter = DateFormatter::default();
        LikeService::new(
            LikeRepository::new(db.clone()),
            CommentRepository::new(db.clone()),
            ContentService::new(
                ContentRepository::new(db.clone()),
                CommentRepository::new(db.clone()),
                LikeRepository::new(db.clone()),
                ProfileRepository::new(db.clone()),
                formatter,
            ),
            NotificationService::new(
                NotificationRepository::new(db.clone()),
                ProfileRepository::new(db),
                formatter,
            ),
        )
    }

    #[tokio::test]
    async fn test_like_then_unlike_restores_count() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // like
                .append_query_results([[create_test_content()]])
                .append_query_results([Vec::<like::Model>::new()])
                .append_query_results([[create_test_like()]])
                .append_query_results([[create_test_notification()]])
                .append_query_results([[count_row(1)]])
                // unlike
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .append_query_results([[count_row(0)]])
                .into_connection(),
        );
        let service = service(db);

        let liked = service.like_content(&reader(), "c1").await.unwrap();
        assert!(liked.liked);
        assert_eq!(liked.like_count, 1);

        let unliked = service.unlike_content(&reader(), "c1").await.unwrap();
        assert!(!unliked.liked);
        assert_eq!(unliked.like_count, 0);
    }

    #[tokio::test]
    async fn test_liking_twice_conflicts() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_content()]])
                .append_query_results([[create_test_like()]])
                .into_connection(),
        );

        let result = service(db).like_content(&reader(), "c1").await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_unlike_without_like_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let result = service(db).unlike_content(&reader(), "c1").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_like_comment_bumps_counter() {
        let mut comment_like = create_test_like();
        comment_like.content_id = None;
        comment_like.comment_id = Some("cm1".to_string());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_comment(0)]])
                .append_query_results([[create_test_content()]])
                .append_query_results([Vec::<like::Model>::new()])
                .append_query_results([[comment_like]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .append_query_results([[create_test_notification()]])
                .append_query_results([[create_test_comment(1)]])
                .into_connection(),
        );

        let state = service(db).like_comment(&reader(), "cm1").await.unwrap();
        assert!(state.liked);
        assert_eq!(state.like_count, 1);
    }

    #[tokio::test]
    async fn test_unlike_comment_decrements_without_going_negative() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .append_query_results([[create_test_comment(0)]])
                .into_connection(),
        );

        let state = service(db.clone())
            .unlike_comment(&reader(), "cm1")
            .await
            .unwrap();
        assert!(!state.liked);
        assert_eq!(state.like_count, 0);

        let sql: Vec<String> = Arc::try_unwrap(db)
            .unwrap()
            .into_transaction_log()
            .iter()
            .flat_map(|t| t.statements().iter().map(|s| s.sql.clone()))
            .collect();
        assert!(sql[0].starts_with(r#"DELETE FROM "likes""#));
        assert!(sql[1].contains("GREATEST(likes - 1, 0)"));
    }

    #[tokio::test]
    async fn test_unlike_comment_without_like_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let result = service(db).unlike_comment(&reader(), "cm1").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
