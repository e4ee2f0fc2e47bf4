//! Content repository.

use std::sync::Arc;

use crate::entities::{Content, content};
use outliers_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Select,
};
use serde::{Deserialize, Serialize};

/// Which publication state to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishFilter {
    /// Drafts and published items.
    #[default]
    All,
    /// Published items only.
    Published,
    /// Drafts only.
    Drafts,
}

impl PublishFilter {
    fn apply(self, query: Select<Content>) -> Select<Content> {
        match self {
            Self::All => query,
            Self::Published => query.filter(content::Column::Published.eq(true)),
            Self::Drafts => query.filter(content::Column::Published.eq(false)),
        }
    }
}

/// Content repository for database operations.
#[derive(Clone)]
pub struct ContentRepository {
    db: Arc<DatabaseConnection>,
}

impl ContentRepository {
    /// Create a new content repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a content item by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<content::Model>> {
        Content::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a content item by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<content::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ContentNotFound(id.to_string()))
    }

    /// Published items, newest first.
    pub async fn find_published(
        &self,
        content_type: Option<content::ContentType>,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<content::Model>> {
        let mut query = Content::find()
            .filter(content::Column::Published.eq(true))
            .order_by_desc(content::Column::Id);

        if let Some(kind) = content_type {
            query = query.filter(content::Column::ContentType.eq(kind));
        }

        if let Some(id) = until_id {
            query = query.filter(content::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Items by one author, newest first.
    pub async fn find_by_author(
        &self,
        author_id: &str,
        filter: PublishFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<content::Model>> {
        let query = Content::find().filter(content::Column::AuthorId.eq(author_id));

        filter
            .apply(query)
            .order_by_desc(content::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Items by every author, newest first (admin panel).
    pub async fn find_all(
        &self,
        filter: PublishFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<content::Model>> {
        filter
            .apply(Content::find())
            .order_by_desc(content::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new content item.
    pub async fn create(&self, model: content::ActiveModel) -> AppResult<content::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a content item.
    pub async fn update(&self, model: content::ActiveModel) -> AppResult<content::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a content item. Comments, likes and notifications cascade.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Content::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
