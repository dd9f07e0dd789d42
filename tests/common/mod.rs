//! Test helpers for web API tests.
//!
//! Builds an axum-test server over an in-memory database with a canned
//! feed fetcher, so tests never touch the network.

#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum_test::TestServer;
use serde_json::{json, Value};

use catnews::config::{AuthConfig, OAuthConfig};
use catnews::feed::{FeedFetcher, ParsedEntry, ParsedFeed};
use catnews::web::{create_health_router, create_router, AppState, AuthState};
use catnews::{CatnewsError, Database, Result, TokenIssuer};

/// Fetcher serving canned feed documents by URL.
pub struct StubFetcher {
    feeds: HashMap<String, ParsedFeed>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self {
            feeds: HashMap::new(),
        }
    }

    pub fn with_feed(mut self, url: &str, title: &str, entries: Vec<ParsedEntry>) -> Self {
        self.feeds.insert(
            url.to_string(),
            ParsedFeed {
                title: title.to_string(),
                entries,
            },
        );
        self
    }
}

impl FeedFetcher for StubFetcher {
    fn fetch<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ParsedFeed>> + Send + 'a>> {
        Box::pin(async move {
            self.feeds
                .get(url)
                .cloned()
                .ok_or_else(|| CatnewsError::Fetch(format!("unreachable: {url}")))
        })
    }
}

/// A feed entry for canned documents.
pub fn entry(title: &str, url: &str) -> ParsedEntry {
    ParsedEntry {
        title: title.to_string(),
        url: url.to_string(),
        content: Some(format!("content of {title}")),
        published_at: None,
    }
}

/// Create a test server with an in-memory database and the given fetcher.
pub async fn create_test_server(fetcher: StubFetcher) -> (TestServer, Arc<Database>) {
    let db = Arc::new(
        Database::open_in_memory()
            .await
            .expect("Failed to create test database"),
    );

    let issuer = TokenIssuer::new(&AuthConfig::default());
    let auth_state = Arc::new(AuthState::new(issuer.clone(), db.pool().clone()));

    let feed_fetcher: Arc<dyn FeedFetcher> = Arc::new(fetcher);
    let app_state = Arc::new(AppState::new(
        db.clone(),
        issuer,
        feed_fetcher,
        OAuthConfig::default(),
    ));

    let router =
        create_router(app_state, auth_state, &[]).merge(create_health_router());
    let server = TestServer::new(router).expect("Failed to create test server");

    (server, db)
}

/// Register a user and return the response body.
pub async fn register(server: &TestServer, username: &str, email: &str, password: &str) -> Value {
    let response = server
        .post("/auth/register")
        .json(&json!({
            "username": username,
            "email": email,
            "password": password
        }))
        .await;

    response.json::<Value>()
}

/// Register the default test user and return a bearer token.
pub async fn register_and_token(server: &TestServer) -> String {
    let body = register(server, "alice", "alice@example.com", "password123").await;
    body["access_token"]
        .as_str()
        .expect("registration returned no token")
        .to_string()
}

/// Format a bearer authorization header value.
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
