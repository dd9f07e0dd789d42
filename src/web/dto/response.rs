//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::TokenSource;
use crate::db::User;
use crate::feed::{Article, Feed};

/// Bearer token response.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// Signed bearer token.
    pub access_token: String,
    /// Always "bearer".
    pub token_type: &'static str,
    /// Login path that produced the token.
    pub token_source: TokenSource,
}

impl TokenResponse {
    /// Wrap a signed token.
    pub fn new(access_token: String, token_source: TokenSource) -> Self {
        Self {
            access_token,
            token_type: "bearer",
            token_source,
        }
    }
}

/// User details.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub discord_id: Option<String>,
    pub github_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            discord_id: user.discord_id,
            github_id: user.github_id,
            created_at: user.created_at,
        }
    }
}

/// Feed details.
#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

impl From<Feed> for FeedResponse {
    fn from(feed: Feed) -> Self {
        Self {
            id: feed.id,
            title: feed.title,
            url: feed.url,
            created_at: feed.created_at,
        }
    }
}

/// Article details.
#[derive(Debug, Serialize)]
pub struct ArticleResponse {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub content: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl From<Article> for ArticleResponse {
    fn from(article: Article) -> Self {
        Self {
            id: article.id,
            title: article.title,
            url: article.url,
            content: article.content,
            published_at: article.published_at,
        }
    }
}
