//! HTTP request handlers.

mod article;
mod auth;
mod feed;

pub use article::{create_article, feed_articles, list_all_articles, list_articles};
pub use auth::{login, me, oauth_authorize, oauth_callback, register};
pub use feed::{
    create_feed, delete_feed, get_feed, list_feeds, list_subscriptions, subscribe, unsubscribe,
    update_feed,
};

use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::config::OAuthConfig;
use crate::db::Database;
use crate::feed::FeedFetcher;

/// Application state shared across handlers.
pub struct AppState {
    /// Database handle.
    pub db: Arc<Database>,
    /// Token issuer.
    pub issuer: TokenIssuer,
    /// Feed fetcher.
    pub fetcher: Arc<dyn FeedFetcher>,
    /// OAuth2 provider settings.
    pub oauth: OAuthConfig,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        db: Arc<Database>,
        issuer: TokenIssuer,
        fetcher: Arc<dyn FeedFetcher>,
        oauth: OAuthConfig,
    ) -> Self {
        Self {
            db,
            issuer,
            fetcher,
            oauth,
        }
    }
}
