//! Content service: articles, videos and live streams.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use outliers_common::{AppError, AppResult, DateFormatter, IdGenerator};
use outliers_db::{
    entities::content::{self, ContentType},
    repositories::{
        CommentRepository, ContentRepository, LikeRepository, ProfileRepository, PublishFilter,
    },
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::{non_blank, session::Viewer, validate_media_url};

/// Input for creating a content item.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateContentInput {
    #[validate(length(max = 256))]
    pub title: String,

    #[serde(rename = "type")]
    pub content_type: ContentType,

    /// Article body.
    #[validate(length(max = 100_000))]
    pub content: Option<String>,

    #[validate(custom(function = "validate_media_url"))]
    pub video_url: Option<String>,

    #[validate(custom(function = "validate_media_url"))]
    pub thumbnail_url: Option<String>,

    /// Start time of a live stream.
    pub scheduled_for: Option<DateTime<Utc>>,

    #[serde(default)]
    pub published: bool,
}

/// Input for updating a content item. Blank strings clear optional fields.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContentInput {
    #[validate(length(max = 256))]
    pub title: Option<String>,

    #[serde(rename = "type")]
    pub content_type: Option<ContentType>,

    #[validate(length(max = 100_000))]
    pub content: Option<String>,

    #[validate(custom(function = "validate_media_url"))]
    pub video_url: Option<String>,

    #[validate(custom(function = "validate_media_url"))]
    pub thumbnail_url: Option<String>,

    pub scheduled_for: Option<DateTime<Utc>>,

    pub published: Option<bool>,
}

/// Who wrote a content item or comment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub id: String,
    pub owner_name: String,
    pub business_name: String,
    pub photo_url: Option<String>,
}

/// A content item as shown to a reader.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentResponse {
    pub id: String,
    pub author_id: String,
    pub author: Option<AuthorSummary>,
    pub title: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub content: Option<String>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub scheduled_for: Option<String>,
    pub published: bool,
    pub like_count: u64,
    pub comment_count: u64,
    pub is_liked: bool,
    pub created_at: String,
    /// Creation date in the display timezone (`dd/mm/yyyy`).
    pub created_date: String,
    pub updated_at: Option<String>,
}

/// Content service for business logic.
#[derive(Clone)]
pub struct ContentService {
    content_repo: ContentRepository,
    comment_repo: CommentRepository,
    like_repo: LikeRepository,
    profile_repo: ProfileRepository,
    formatter: DateFormatter,
    id_gen: IdGenerator,
}

impl ContentService {
    /// Create a new content service.
    #[must_use]
    pub const fn new(
        content_repo: ContentRepository,
        comment_repo: CommentRepository,
        like_repo: LikeRepository,
        profile_repo: ProfileRepository,
        formatter: DateFormatter,
    ) -> Self {
        Self {
            content_repo,
            comment_repo,
            like_repo,
            profile_repo,
            formatter,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a content item authored by `viewer`.
    pub async fn create(
        &self,
        viewer: &Viewer,
        input: CreateContentInput,
    ) -> AppResult<ContentResponse> {
        input.validate()?;

        let title = input.title.trim().to_string();
        let body = non_blank(input.content);
        let video_url = non_blank(input.video_url);
        let thumbnail_url = non_blank(input.thumbnail_url);
        let scheduled_for = match input.content_type {
            ContentType::Live => input.scheduled_for,
            ContentType::Article | ContentType::Video => None,
        };

        check_rules(
            &title,
            input.content_type,
            body.as_deref(),
            thumbnail_url.as_deref(),
            scheduled_for.as_ref(),
        )?;

        let model = content::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(viewer.id.clone()),
            title: Set(title),
            content_type: Set(input.content_type),
            content: Set(body),
            video_url: Set(video_url),
            thumbnail_url: Set(thumbnail_url),
            scheduled_for: Set(scheduled_for.map(Into::into)),
            published: Set(input.published),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.content_repo.create(model).await?;
        tracing::info!(content_id = %created.id, author_id = %created.author_id, "Content created");

        self.describe_one(created, Some(viewer)).await
    }

    /// Update a content item. Only its author or an admin may.
    pub async fn update(
        &self,
        viewer: &Viewer,
        id: &str,
        input: UpdateContentInput,
    ) -> AppResult<ContentResponse> {
        input.validate()?;

        let existing = self.content_repo.get_by_id(id).await?;
        if !viewer.can_manage(&existing.author_id) {
            return Err(AppError::Forbidden(
                "You can only edit your own content".to_string(),
            ));
        }

        let merged = apply_changes(existing.clone(), input);

        check_rules(
            &merged.title,
            merged.content_type,
            merged.content.as_deref(),
            merged.thumbnail_url.as_deref(),
            merged.scheduled_for.map(|t| t.to_utc()).as_ref(),
        )?;

        let mut active: content::ActiveModel = existing.into();
        active.title = Set(merged.title);
        active.content_type = Set(merged.content_type);
        active.content = Set(merged.content);
        active.video_url = Set(merged.video_url);
        active.thumbnail_url = Set(merged.thumbnail_url);
        active.scheduled_for = Set(merged.scheduled_for);
        active.published = Set(merged.published);
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.content_repo.update(active).await?;
        self.describe_one(updated, Some(viewer)).await
    }

    /// Flip the published flag. Returns the new value.
    pub async fn toggle_publish(&self, viewer: &Viewer, id: &str) -> AppResult<bool> {
        let existing = self.content_repo.get_by_id(id).await?;
        if !viewer.can_manage(&existing.author_id) {
            return Err(AppError::Forbidden(
                "You can only publish your own content".to_string(),
            ));
        }

        let published = !existing.published;
        let mut active: content::ActiveModel = existing.into();
        active.published = Set(published);
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.content_repo.update(active).await?;
        tracing::info!(content_id = %updated.id, published = updated.published, "Content publish flag changed");

        Ok(updated.published)
    }

    /// Delete a content item with its comments and likes.
    pub async fn delete(&self, viewer: &Viewer, id: &str) -> AppResult<()> {
        let existing = self.content_repo.get_by_id(id).await?;
        if !viewer.can_manage(&existing.author_id) {
            return Err(AppError::Forbidden(
                "You can only delete your own content".to_string(),
            ));
        }

        self.content_repo.delete(id).await?;
        tracing::info!(content_id = %id, "Content deleted");
        Ok(())
    }

    /// Get a content item. Drafts are visible to their author and admins only.
    pub async fn get(&self, viewer: Option<&Viewer>, id: &str) -> AppResult<ContentResponse> {
        let item = self.get_visible(viewer, id).await?;
        self.describe_one(item, viewer).await
    }

    /// Fetch a content item the viewer may see.
    pub async fn get_visible(
        &self,
        viewer: Option<&Viewer>,
        id: &str,
    ) -> AppResult<content::Model> {
        let item = self.content_repo.get_by_id(id).await?;
        if item.published || viewer.is_some_and(|v| v.can_manage(&item.author_id)) {
            Ok(item)
        } else {
            Err(AppError::ContentNotFound(id.to_string()))
        }
    }

    /// Published items from every author, newest first.
    pub async fn feed(
        &self,
        viewer: Option<&Viewer>,
        content_type: Option<ContentType>,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<ContentResponse>> {
        let items = self
            .content_repo
            .find_published(content_type, limit, until_id)
            .await?;
        self.describe(items, viewer).await
    }

    /// The viewer's own items, filtered by tab.
    pub async fn list_mine(
        &self,
        viewer: &Viewer,
        filter: PublishFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<ContentResponse>> {
        let items = self
            .content_repo
            .find_by_author(&viewer.id, filter, limit, offset)
            .await?;
        self.describe(items, Some(viewer)).await
    }

    /// Items from every author for the admin panel.
    pub async fn admin_list(
        &self,
        viewer: &Viewer,
        filter: PublishFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<ContentResponse>> {
        if !viewer.is_admin {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        let items = self.content_repo.find_all(filter, limit, offset).await?;
        self.describe(items, Some(viewer)).await
    }

    async fn describe_one(
        &self,
        item: content::Model,
        viewer: Option<&Viewer>,
    ) -> AppResult<ContentResponse> {
        self.describe(vec![item], viewer)
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("Content disappeared while describing".to_string()))
    }

    /// Attach counts, like state and author summaries, keeping order.
    pub async fn describe(
        &self,
        items: Vec<content::Model>,
        viewer: Option<&Viewer>,
    ) -> AppResult<Vec<ContentResponse>> {
        if items.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<String> = items.iter().map(|c| c.id.clone()).collect();
        let mut author_ids: Vec<String> = items.iter().map(|c| c.author_id.clone()).collect();
        author_ids.sort();
        author_ids.dedup();

        let like_counts = self.like_repo.count_for_contents(&ids).await?;
        let comment_counts = self.comment_repo.count_by_contents(&ids).await?;
        let liked = match viewer {
            Some(v) => self.like_repo.liked_content_ids(&v.id, &ids).await?,
            None => Default::default(),
        };
        let authors: HashMap<String, AuthorSummary> = self
            .profile_repo
            .find_by_ids(&author_ids)
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

        Ok(items
            .into_iter()
            .map(|c| ContentResponse {
                author: authors.get(&c.author_id).cloned(),
                like_count: like_counts.get(&c.id).copied().unwrap_or(0),
                comment_count: comment_counts.get(&c.id).copied().unwrap_or(0),
                is_liked: liked.contains(&c.id),
                created_date: self.formatter.format_date(c.created_at.to_utc()),
                created_at: c.created_at.to_rfc3339(),
                scheduled_for: c.scheduled_for.map(|t| t.to_rfc3339()),
                updated_at: c.updated_at.map(|t| t.to_rfc3339()),
                id: c.id,
                author_id: c.author_id,
                title: c.title,
                content_type: c.content_type,
                content: c.content,
                video_url: c.video_url,
                thumbnail_url: c.thumbnail_url,
                published: c.published,
            })
            .collect())
    }
}

/// Merge requested changes into a stored item. Blank strings clear optional
/// fields; only live streams keep a schedule.
fn apply_changes(mut item: content::Model, input: UpdateContentInput) -> content::Model {
    if let Some(title) = input.title {
        item.title = title.trim().to_string();
    }
    if let Some(kind) = input.content_type {
        item.content_type = kind;
    }
    if let Some(body) = input.content {
        item.content = non_blank(Some(body));
    }
    if let Some(video_url) = input.video_url {
        item.video_url = non_blank(Some(video_url));
    }
    if let Some(thumbnail_url) = input.thumbnail_url {
        item.thumbnail_url = non_blank(Some(thumbnail_url));
    }
    if let Some(scheduled_for) = input.scheduled_for {
        item.scheduled_for = Some(scheduled_for.into());
    }
    if item.content_type != ContentType::Live {
        item.scheduled_for = None;
    }
    if let Some(published) = input.published {
        item.published = published;
    }
    item
}

fn check_rules(
    title: &str,
    kind: ContentType,
    body: Option<&str>,
    thumbnail_url: Option<&str>,
    scheduled_for: Option<&DateTime<Utc>>,
) -> AppResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }

    match kind {
        ContentType::Article if body.is_none() => Err(AppError::Validation(
            "Article content is required".to_string(),
        )),
        ContentType::Video | ContentType::Live if thumbnail_url.is_none() => Err(
            AppError::Validation("A thumbnail is required for videos and live streams".to_string()),
        ),
        ContentType::Live if scheduled_for.is_none() => Err(AppError::Validation(
            "Live streams need a scheduled start time".to_string(),
        )),
        _ => Ok(()),
    }
}
