//! Feed, subscription and article repositories.

use chrono::Utc;

use super::types::{Article, Feed, NewArticle, NewFeed, Subscription};
use crate::db::{parse_datetime, DbPool};
use crate::{CatnewsError, Result};

#[derive(Debug, Clone, sqlx::FromRow)]
struct FeedRow {
    id: i64,
    title: String,
    url: String,
    created_at: String,
    updated_at: String,
}

impl From<FeedRow> for Feed {
    fn from(row: FeedRow) -> Self {
        Feed {
            id: row.id,
            title: row.title,
            url: row.url,
            created_at: parse_datetime(&row.created_at).unwrap_or_else(Utc::now),
            updated_at: parse_datetime(&row.updated_at).unwrap_or_else(Utc::now),
        }
    }
}

/// Repository for feed records.
pub struct FeedRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> FeedRepository<'a> {
    /// Create a new FeedRepository with the given pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a feed, or return the existing one with the same URL.
    ///
    /// The URL is unique; a concurrent insert loses the race and re-selects.
    pub async fn get_or_create(&self, new_feed: &NewFeed) -> Result<Feed> {
        if let Some(feed) = self.get_by_url(&new_feed.url).await? {
            return Ok(feed);
        }

        let result = sqlx::query_scalar::<_, i64>(
            "INSERT INTO feeds (title, url) VALUES ($1, $2) RETURNING id",
        )
        .bind(&new_feed.title)
        .bind(&new_feed.url)
        .fetch_one(self.pool)
        .await;

        match result {
            Ok(id) => self
                .get_by_id(id)
                .await?
                .ok_or_else(|| CatnewsError::NotFound("feed".to_string())),
            Err(e) if e.to_string().contains("UNIQUE") => self
                .get_by_url(&new_feed.url)
                .await?
                .ok_or_else(|| CatnewsError::NotFound("feed".to_string())),
            Err(e) => Err(CatnewsError::Database(e.to_string())),
        }
    }

    /// Get a feed by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Feed>> {
        let row = sqlx::query_as::<_, FeedRow>(
            "SELECT id, title, url, created_at, updated_at FROM feeds WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Feed::from))
    }

    /// List all feeds.
    pub async fn list_all(&self) -> Result<Vec<Feed>> {
        let rows = sqlx::query_as::<_, FeedRow>(
            "SELECT id, title, url, created_at, updated_at FROM feeds ORDER BY id ASC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Feed::from).collect())
    }

    /// Update a feed's title and/or URL. Returns false if the feed is gone.
    pub async fn update(
        &self,
        id: i64,
        title: Option<&str>,
        url: Option<&str>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE feeds SET
                title = COALESCE($1, title),
                url = COALESCE($2, url),
                updated_at = datetime('now')
             WHERE id = $3",
        )
        .bind(title)
        .bind(url)
        .bind(id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a feed. Subscriptions and feed-article links cascade.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM feeds WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Get a feed by URL.
    pub async fn get_by_url(&self, url: &str) -> Result<Option<Feed>> {
        let row = sqlx::query_as::<_, FeedRow>(
            "SELECT id, title, url, created_at, updated_at FROM feeds WHERE url = $1",
        )
        .bind(url)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Feed::from))
    }
}

/// Repository for user subscriptions.
pub struct SubscriptionRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> SubscriptionRepository<'a> {
    /// Create a new SubscriptionRepository with the given pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Subscribe a user to a feed. Returns false if already subscribed.
    pub async fn create_or_ignore(&self, user_id: i64, feed_id: i64) -> Result<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO subscriptions (user_id, feed_id) VALUES ($1, $2)",
        )
        .bind(user_id)
        .bind(feed_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove a subscription. Returns false if there was none.
    pub async fn delete(&self, user_id: i64, feed_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE user_id = $1 AND feed_id = $2")
            .bind(user_id)
            .bind(feed_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Check if a user is subscribed to a feed.
    pub async fn exists(&self, user_id: i64, feed_id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM subscriptions WHERE user_id = $1 AND feed_id = $2)",
        )
        .bind(user_id)
        .bind(feed_id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Get a subscription record.
    pub async fn get(&self, user_id: i64, feed_id: i64) -> Result<Option<Subscription>> {
        #[derive(sqlx::FromRow)]
        struct Row {
            id: i64,
            user_id: i64,
            feed_id: i64,
            created_at: String,
        }

        let row = sqlx::query_as::<_, Row>(
            "SELECT id, user_id, feed_id, created_at
             FROM subscriptions WHERE user_id = $1 AND feed_id = $2",
        )
        .bind(user_id)
        .bind(feed_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| Subscription {
            id: r.id,
            user_id: r.user_id,
            feed_id: r.feed_id,
            created_at: parse_datetime(&r.created_at).unwrap_or_else(Utc::now),
        }))
    }

    /// List the feeds a user is subscribed to, oldest subscription first.
    pub async fn list_feeds_for_user(&self, user_id: i64) -> Result<Vec<Feed>> {
        let rows = sqlx::query_as::<_, FeedRow>(
            "SELECT f.id, f.title, f.url, f.created_at, f.updated_at
             FROM feeds f
             JOIN subscriptions s ON s.feed_id = f.id
             WHERE s.user_id = $1
             ORDER BY s.id ASC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Feed::from).collect())
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct ArticleRow {
    id: i64,
    title: String,
    url: String,
    content: Option<String>,
    published_at: Option<String>,
    created_at: String,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Article {
            id: row.id,
            title: row.title,
            url: row.url,
            content: row.content,
            published_at: row.published_at.and_then(|s| parse_datetime(&s)),
            created_at: parse_datetime(&row.created_at).unwrap_or_else(Utc::now),
        }
    }
}

const ARTICLE_COLUMNS: &str = "a.id, a.title, a.url, a.content, a.published_at, a.created_at";

/// Repository for articles and their links to feeds.
pub struct ArticleRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> ArticleRepository<'a> {
    /// Create a new ArticleRepository with the given pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Store an article in a feed, deduplicating by URL within the feed.
    ///
    /// An article already present in the feed is left untouched and `None`
    /// is returned. An article known from another feed is linked, not
    /// duplicated.
    pub async fn store_in_feed(
        &self,
        feed_id: i64,
        new_article: &NewArticle,
    ) -> Result<Option<Article>> {
        if self
            .get_in_feed_by_url(feed_id, &new_article.url)
            .await?
            .is_some()
        {
            return Ok(None);
        }

        let article = match self.get_by_url(&new_article.url).await? {
            Some(article) => article,
            None => self.insert(new_article).await?,
        };

        let linked = sqlx::query(
            "INSERT OR IGNORE INTO feed_articles (feed_id, article_id) VALUES ($1, $2)",
        )
        .bind(feed_id)
        .bind(article.id)
        .execute(self.pool)
        .await?;

        if linked.rows_affected() > 0 {
            Ok(Some(article))
        } else {
            Ok(None)
        }
    }

    async fn insert(&self, new_article: &NewArticle) -> Result<Article> {
        let published_at = new_article.published_at.map(|dt| dt.to_rfc3339());

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO articles (title, url, content, published_at)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(&new_article.title)
        .bind(&new_article.url)
        .bind(&new_article.content)
        .bind(&published_at)
        .fetch_one(self.pool)
        .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| CatnewsError::NotFound("article".to_string()))
    }

    /// Get an article by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Article>> {
        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles a WHERE a.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Article::from))
    }

    /// Get an article by URL, regardless of feed.
    pub async fn get_by_url(&self, url: &str) -> Result<Option<Article>> {
        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles a WHERE a.url = $1 LIMIT 1"
        ))
        .bind(url)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Article::from))
    }

    /// Get an article by URL within a feed.
    pub async fn get_in_feed_by_url(&self, feed_id: i64, url: &str) -> Result<Option<Article>> {
        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            "SELECT {ARTICLE_COLUMNS}
             FROM articles a
             JOIN feed_articles fa ON fa.article_id = a.id
             WHERE fa.feed_id = $1 AND a.url = $2"
        ))
        .bind(feed_id)
        .bind(url)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Article::from))
    }

    /// List articles in a feed, newest first.
    pub async fn list_in_feed(&self, feed_id: i64, skip: i64, limit: i64) -> Result<Vec<Article>> {
        let rows = sqlx::query_as::<_, ArticleRow>(&format!(
            "SELECT {ARTICLE_COLUMNS}
             FROM articles a
             JOIN feed_articles fa ON fa.article_id = a.id
             WHERE fa.feed_id = $1
             ORDER BY COALESCE(a.published_at, a.created_at) DESC, a.id DESC
             LIMIT $2 OFFSET $3"
        ))
        .bind(feed_id)
        .bind(limit)
        .bind(skip)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Article::from).collect())
    }

    /// List all articles, newest first.
    pub async fn list_all(&self, skip: i64, limit: i64) -> Result<Vec<Article>> {
        let rows = sqlx::query_as::<_, ArticleRow>(&format!(
            "SELECT {ARTICLE_COLUMNS}
             FROM articles a
             ORDER BY COALESCE(a.published_at, a.created_at) DESC, a.id DESC
             LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(skip)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Article::from).collect())
    }

    /// Count articles in a feed.
    pub async fn count_in_feed(&self, feed_id: i64) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM feed_articles WHERE feed_id = $1")
                .bind(feed_id)
                .fetch_one(self.pool)
                .await?;

        Ok(count)
    }
}
