//! Like repository.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::entities::{Like, like};
use outliers_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QuerySelect,
};

#[derive(FromQueryResult)]
struct LikeCount {
    content_id: String,
    count: i64,
}

/// Like repository for database operations.
#[derive(Clone)]
pub struct LikeRepository {
    db: Arc<DatabaseConnection>,
}

impl LikeRepository {
    /// Create a new like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user's like on a content item.
    pub async fn find_content_like(
        &self,
        user_id: &str,
        content_id: &str,
    ) -> AppResult<Option<like::Model>> {
        Like::find()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::ContentId.eq(content_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user's like on a comment.
    pub async fn find_comment_like(
        &self,
        user_id: &str,
        comment_id: &str,
    ) -> AppResult<Option<like::Model>> {
        Like::find()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::CommentId.eq(comment_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a like. A duplicate (user, target) pair is a conflict.
    pub async fn create(&self, model: like::ActiveModel) -> AppResult<like::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::from_db(&e, "Already liked"))
    }

    /// Remove a user's like on a content item. Returns whether a row was deleted.
    pub async fn delete_content_like(&self, user_id: &str, content_id: &str) -> AppResult<bool> {
        let result = Like::delete_many()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::ContentId.eq(content_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Remove a user's like on a comment. Returns whether a row was deleted.
    pub async fn delete_comment_like(&self, user_id: &str, comment_id: &str) -> AppResult<bool> {
        let result = Like::delete_many()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::CommentId.eq(comment_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Count likes on a content item.
    pub async fn count_for_content(&self, content_id: &str) -> AppResult<u64> {
        Like::find()
            .filter(like::Column::ContentId.eq(content_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count likes for several content items at once.
    pub async fn count_for_contents(&self, content_ids: &[String]) -> AppResult<HashMap<String, u64>> {
        if content_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Like::find()
            .select_only()
            .column(like::Column::ContentId)
            .column_as(like::Column::Id.count(), "count")
            .filter(like::Column::ContentId.is_in(content_ids.to_vec()))
            .group_by(like::Column::ContentId)
            .into_model::<LikeCount>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| (row.content_id, row.count.max(0) as u64))
            .collect())
    }

    /// Which of the given content items the user has liked.
    pub async fn liked_content_ids(
        &self,
        user_id: &str,
        content_ids: &[String],
    ) -> AppResult<HashSet<String>> {
        if content_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let likes = Like::find()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::ContentId.is_in(content_ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(likes.into_iter().filter_map(|l| l.content_id).collect())
    }

    /// Which of the given comments the user has liked.
    pub async fn liked_comment_ids(
        &self,
        user_id: &str,
        comment_ids: &[String],
    ) -> AppResult<HashSet<String>> {
        if comment_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let likes = Like::find()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::CommentId.is_in(comment_ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(likes.into_iter().filter_map(|l| l.comment_id).collect())
    }
}
