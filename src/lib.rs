//! catnews - RSS aggregation backend
//!
//! Users register with a password or an OAuth2 provider, subscribe to feeds,
//! read deduplicated articles over HTTP, and get generated tags and summaries
//! through the chat bot.

pub mod auth;
pub mod bot;
pub mod config;
pub mod db;
pub mod enrich;
pub mod error;
pub mod feed;
pub mod logging;
pub mod web;

pub use auth::{
    hash_password, resolve_user, validate_password, verify_password, Claims, OAuthClient,
    OAuthProfile, OAuthService, OAuthTokens, Provider, TokenIssuer, TokenSource,
};
pub use bot::{BotCommand, BotHandler, BotMessage};
pub use config::Config;
pub use db::{Database, NewOAuthLink, NewUser, OAuthLink, OAuthLinkRepository, User, UserRepository};
pub use enrich::{EnrichService, OpenAiGenerator, Summary, Tag, TextGenerator};
pub use error::{CatnewsError, Result};
pub use feed::{
    Article, ArticleRepository, Feed, FeedFetcher, FeedRepository, FeedService, HttpFeedFetcher,
    NewArticle, NewFeed, Subscription, SubscriptionRepository,
};
pub use web::WebServer;
