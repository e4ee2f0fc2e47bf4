//! Create content table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Content::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Content::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Content::AuthorId).string_len(32).not_null())
                    .col(ColumnDef::new(Content::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Content::Type).string_len(16).not_null())
                    .col(ColumnDef::new(Content::Content).text())
                    .col(ColumnDef::new(Content::VideoUrl).string_len(1024))
                    .col(ColumnDef::new(Content::ThumbnailUrl).string_len(1024))
                    .col(ColumnDef::new(Content::ScheduledFor).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Content::Published)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Content::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Content::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_content_author")
                            .from(Content::Table, Content::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (author_id, created_at) (for "my content")
        manager
            .create_index(
                Index::create()
                    .name("idx_content_author_created_at")
                    .table(Content::Table)
                    .col(Content::AuthorId)
                    .col(Content::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Index: (published, created_at) (for the feed)
        manager
            .create_index(
                Index::create()
                    .name("idx_content_published_created_at")
                    .table(Content::Table)
                    .col(Content::Published)
                    .col(Content::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Content::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Content {
    Table,
    Id,
    AuthorId,
    Title,
    Type,
    Content,
    VideoUrl,
    ThumbnailUrl,
    ScheduledFor,
    Published,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
