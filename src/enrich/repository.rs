//! Tag and summary repositories.

use super::types::{Summary, Tag};
use crate::db::DbPool;
use crate::{CatnewsError, Result};

/// Repository for tags and article-tag links.
pub struct TagRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> TagRepository<'a> {
    /// Create a new TagRepository with the given pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Get a tag by name, creating it if missing. Tag names are shared
    /// across articles.
    pub async fn get_or_create(&self, name: &str) -> Result<Tag> {
        sqlx::query("INSERT OR IGNORE INTO tags (name) VALUES ($1)")
            .bind(name)
            .execute(self.pool)
            .await?;

        let row: (i64, String) = sqlx::query_as("SELECT id, name FROM tags WHERE name = $1")
            .bind(name)
            .fetch_one(self.pool)
            .await
            .map_err(|e| CatnewsError::Database(e.to_string()))?;

        Ok(Tag {
            id: row.0,
            name: row.1,
        })
    }

    /// Attach a tag to an article. Attaching twice is a no-op.
    pub async fn attach(&self, article_id: i64, tag_id: i64) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO article_tags (article_id, tag_id) VALUES ($1, $2)")
            .bind(article_id)
            .bind(tag_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// List the tags attached to an article.
    pub async fn list_for_article(&self, article_id: i64) -> Result<Vec<Tag>> {
        let rows: Vec<(i64, String)> = sqlx::query_as(
            "SELECT t.id, t.name
             FROM tags t
             JOIN article_tags at ON at.tag_id = t.id
             WHERE at.article_id = $1
             ORDER BY t.id ASC",
        )
        .bind(article_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| Tag { id, name })
            .collect())
    }
}

/// Repository for article summaries.
pub struct SummaryRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> SummaryRepository<'a> {
    /// Create a new SummaryRepository with the given pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Store a summary for an article. An article keeps its first summary.
    pub async fn create_or_keep(&self, article_id: i64, content: &str) -> Result<Summary> {
        sqlx::query(
            "INSERT INTO summaries (article_id, content) VALUES ($1, $2)
             ON CONFLICT (article_id) DO NOTHING",
        )
        .bind(article_id)
        .bind(content)
        .execute(self.pool)
        .await?;

        self.get_for_article(article_id)
            .await?
            .ok_or_else(|| CatnewsError::NotFound("summary".to_string()))
    }

    /// Get the summary of an article, if one was generated.
    pub async fn get_for_article(&self, article_id: i64) -> Result<Option<Summary>> {
        let row: Option<(i64, i64, String)> = sqlx::query_as(
            "SELECT id, article_id, content FROM summaries WHERE article_id = $1",
        )
        .bind(article_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(id, article_id, content)| Summary {
            id,
            article_id,
            content,
        }))
    }
}
