//! Comment repository.

use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{Comment, comment};
use outliers_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, sea_query::Expr,
};

#[derive(FromQueryResult)]
struct CommentCount {
    content_id: String,
    count: i64,
}

/// Comment repository for database operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a comment by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<comment::Model>> {
        Comment::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a comment by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<comment::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment: {id}")))
    }

    /// Comments on a content item, newest first.
    pub async fn find_by_content(
        &self,
        content_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<comment::Model>> {
        let mut query = Comment::find()
            .filter(comment::Column::ContentId.eq(content_id))
            .order_by_desc(comment::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(comment::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count comments on a content item.
    pub async fn count_by_content(&self, content_id: &str) -> AppResult<u64> {
        Comment::find()
            .filter(comment::Column::ContentId.eq(content_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count comments for several content items at once.
    pub async fn count_by_contents(&self, content_ids: &[String]) -> AppResult<HashMap<String, u64>> {
        if content_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Comment::find()
            .select_only()
            .column(comment::Column::ContentId)
            .column_as(comment::Column::Id.count(), "count")
            .filter(comment::Column::ContentId.is_in(content_ids.to_vec()))
            .group_by(comment::Column::ContentId)
            .into_model::<CommentCount>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| (row.content_id, row.count.max(0) as u64))
            .collect())
    }

    /// Create a new comment.
    pub async fn create(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a comment. Its likes cascade.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Comment::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Increment the like counter atomically (single UPDATE query, no fetch).
    pub async fn increment_likes(&self, id: &str) -> AppResult<()> {
        Comment::update_many()
            .col_expr(comment::Column::Likes, Expr::col(comment::Column::Likes).add(1))
            .filter(comment::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Decrement the like counter atomically, never below zero.
    pub async fn decrement_likes(&self, id: &str) -> AppResult<()> {
        Comment::update_many()
            .col_expr(comment::Column::Likes, Expr::cust("GREATEST(likes - 1, 0)"))
            .filter(comment::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;

    fn create_test_comment(id: &str, text: &str) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            content_id: "content1".to_string(),
            user_id: "user1".to_string(),
            content: text.to_string(),
            likes: 0,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_content() {
        let newer = create_test_comment("c2", "second");
        let older = create_test_comment("c1", "first");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![newer, older]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let result = repo.find_by_content("content1", 50, None).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].content, "second");
    }

    #[tokio::test]
    async fn test_count_by_contents() {
        let row: BTreeMap<String, Value> = maplit::btreemap! {
            "content_id".to_string() => Value::from("content1"),
            "count".to_string() => Value::from(3i64),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![row]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let counts = repo
            .count_by_contents(&["content1".to_string(), "content2".to_string()])
            .await
            .unwrap();

        assert_eq!(counts.get("content1"), Some(&3));
        assert_eq!(counts.get("content2"), None);
    }

    #[tokio::test]
    async fn test_count_by_contents_empty_skips_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let repo = CommentRepository::new(db);

        assert!(repo.count_by_contents(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_decrement_likes() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        assert!(repo.decrement_likes("c1").await.is_ok());
    }
}
