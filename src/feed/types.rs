//! Feed, subscription and article types.

use chrono::{DateTime, Utc};

/// Maximum feed document size in bytes.
pub const MAX_FEED_SIZE: u64 = 5 * 1024 * 1024;

/// Maximum stored article content length in characters.
pub const MAX_CONTENT_LENGTH: usize = 10_000;

/// Maximum entries taken from a single fetch.
pub const MAX_ENTRIES_PER_FETCH: usize = 100;

/// A stored feed.
#[derive(Debug, Clone)]
pub struct Feed {
    /// Unique feed ID.
    pub id: i64,
    /// Feed title from the feed document.
    pub title: String,
    /// Feed URL (unique).
    pub url: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a new feed.
#[derive(Debug, Clone)]
pub struct NewFeed {
    /// Feed title.
    pub title: String,
    /// Feed URL.
    pub url: String,
}

impl NewFeed {
    /// Create a new feed record.
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// A user's subscription to a feed.
#[derive(Debug, Clone)]
pub struct Subscription {
    /// Unique subscription ID.
    pub id: i64,
    /// Subscribing user.
    pub user_id: i64,
    /// Subscribed feed.
    pub feed_id: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A stored article.
#[derive(Debug, Clone)]
pub struct Article {
    /// Unique article ID.
    pub id: i64,
    /// Article title.
    pub title: String,
    /// Article URL, used for deduplication within a feed.
    pub url: String,
    /// Article body or summary, if the feed provides one.
    pub content: Option<String>,
    /// Publication timestamp, if the feed provides one.
    pub published_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Data for storing a new article.
#[derive(Debug, Clone)]
pub struct NewArticle {
    /// Article title.
    pub title: String,
    /// Article URL.
    pub url: String,
    /// Article body or summary.
    pub content: Option<String>,
    /// Publication timestamp.
    pub published_at: Option<DateTime<Utc>>,
}

impl NewArticle {
    /// Create a new article with the required fields.
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: None,
            published_at: None,
        }
    }

    /// Set the content.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Set the publication timestamp.
    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }
}

/// A fetched and parsed feed document.
#[derive(Debug, Clone)]
pub struct ParsedFeed {
    /// Feed title.
    pub title: String,
    /// Feed entries, in document order.
    pub entries: Vec<ParsedEntry>,
}

/// A single entry from a parsed feed document.
#[derive(Debug, Clone)]
pub struct ParsedEntry {
    /// Entry title.
    pub title: String,
    /// Entry link.
    pub url: String,
    /// Entry summary or body.
    pub content: Option<String>,
    /// Publication timestamp.
    pub published_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_article_builder() {
        let article = NewArticle::new("Title", "https://x.test/a")
            .with_content("body")
            .with_published_at(Utc::now());

        assert_eq!(article.title, "Title");
        assert_eq!(article.content, Some("body".to_string()));
        assert!(article.published_at.is_some());
    }
}
