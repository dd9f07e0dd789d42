//! Feed subscription and article listing logic.

use tracing::{info, warn};

use super::fetcher::FeedFetcher;
use super::repository::{ArticleRepository, FeedRepository, SubscriptionRepository};
use super::types::{Article, Feed, NewArticle, NewFeed, ParsedFeed, MAX_CONTENT_LENGTH};
use crate::db::Database;
use crate::{CatnewsError, Result};

/// Service for feed subscriptions and article retrieval.
pub struct FeedService<'a> {
    db: &'a Database,
    fetcher: &'a dyn FeedFetcher,
}

impl<'a> FeedService<'a> {
    /// Create a new FeedService over the given database and fetcher.
    pub fn new(db: &'a Database, fetcher: &'a dyn FeedFetcher) -> Self {
        Self { db, fetcher }
    }

    /// Subscribe a user to a feed URL.
    ///
    /// The feed is fetched before anything is stored: an unreachable or
    /// unparsable URL fails the whole operation and leaves no feed record.
    /// Subscribing twice to the same URL is a no-op.
    pub async fn subscribe(&self, user_id: i64, url: &str) -> Result<Feed> {
        let parsed = self.fetcher.fetch(url).await?;

        let feed = FeedRepository::new(self.db.pool())
            .get_or_create(&NewFeed::new(&parsed.title, url))
            .await?;

        let stored = self.store_entries(feed.id, &parsed).await?;
        info!(
            "Subscribed user {} to feed {} ({} new articles)",
            user_id, feed.id, stored
        );

        SubscriptionRepository::new(self.db.pool())
            .create_or_ignore(user_id, feed.id)
            .await?;

        Ok(feed)
    }

    /// Remove a user's subscription to a feed URL and return the feed.
    ///
    /// The feed record and its articles stay; other users may subscribe.
    pub async fn unsubscribe(&self, user_id: i64, url: &str) -> Result<Feed> {
        let feed = FeedRepository::new(self.db.pool())
            .get_by_url(url)
            .await?
            .ok_or_else(|| CatnewsError::NotFound("subscription".to_string()))?;

        let deleted = SubscriptionRepository::new(self.db.pool())
            .delete(user_id, feed.id)
            .await?;

        if !deleted {
            return Err(CatnewsError::NotFound("subscription".to_string()));
        }

        info!("Unsubscribed user {} from feed {}", user_id, feed.id);
        Ok(feed)
    }

    /// List the feeds a user is subscribed to.
    pub async fn list_subscriptions(&self, user_id: i64) -> Result<Vec<Feed>> {
        SubscriptionRepository::new(self.db.pool())
            .list_feeds_for_user(user_id)
            .await
    }

    /// Re-fetch a feed and store entries not yet in it.
    ///
    /// Returns the number of newly stored articles.
    pub async fn refresh_feed(&self, feed: &Feed) -> Result<usize> {
        let parsed = self.fetcher.fetch(&feed.url).await?;
        self.store_entries(feed.id, &parsed).await
    }

    /// List articles across all of a user's subscriptions.
    ///
    /// Each feed is refreshed first; a feed that fails to fetch is logged
    /// and skipped rather than failing the listing. `skip` and `limit`
    /// apply per feed, so a page can hold up to `limit * feeds` articles.
    pub async fn list_articles(
        &self,
        user_id: i64,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Article>> {
        let feeds = self.list_subscriptions(user_id).await?;
        let articles = ArticleRepository::new(self.db.pool());

        let mut result = Vec::new();
        for feed in feeds {
            if let Err(e) = self.refresh_feed(&feed).await {
                warn!("Skipping feed {} during listing: {}", feed.url, e);
            }
            result.extend(articles.list_in_feed(feed.id, skip, limit).await?);
        }

        Ok(result)
    }

    /// List articles in a single feed.
    pub async fn list_feed_articles(
        &self,
        feed_id: i64,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Article>> {
        FeedRepository::new(self.db.pool())
            .get_by_id(feed_id)
            .await?
            .ok_or_else(|| CatnewsError::NotFound("feed".to_string()))?;

        ArticleRepository::new(self.db.pool())
            .list_in_feed(feed_id, skip, limit)
            .await
    }

    async fn store_entries(&self, feed_id: i64, parsed: &ParsedFeed) -> Result<usize> {
        let articles = ArticleRepository::new(self.db.pool());
        let mut stored = 0;

        for entry in &parsed.entries {
            let mut new_article = NewArticle::new(&entry.title, &entry.url);
            if let Some(content) = &entry.content {
                new_article = new_article.with_content(truncate(content, MAX_CONTENT_LENGTH));
            }
            if let Some(published_at) = entry.published_at {
                new_article = new_article.with_published_at(published_at);
            }

            if articles.store_in_feed(feed_id, &new_article).await?.is_some() {
                stored += 1;
            }
        }

        Ok(stored)
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
