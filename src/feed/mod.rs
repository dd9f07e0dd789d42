//! Feed subscriptions and article storage.
//!
//! Feeds are shared between users: subscribing to a URL another user already
//! follows reuses the stored feed and its articles.

mod fetcher;
mod repository;
mod service;
mod types;

pub use fetcher::{parse_feed, validate_url, FeedFetcher, HttpFeedFetcher};
pub use repository::{ArticleRepository, FeedRepository, SubscriptionRepository};
pub use service::FeedService;
pub use types::{
    Article, Feed, NewArticle, NewFeed, ParsedEntry, ParsedFeed, Subscription,
    MAX_CONTENT_LENGTH, MAX_ENTRIES_PER_FETCH, MAX_FEED_SIZE,
};
