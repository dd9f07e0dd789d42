//! Web server for catnews.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use super::handlers::AppState;
use super::middleware::AuthState;
use super::router::{create_health_router, create_router};
use crate::auth::TokenIssuer;
use crate::config::Config;
use crate::db::Database;
use crate::feed::HttpFeedFetcher;
use crate::{CatnewsError, Result};

/// Web server for the API.
pub struct WebServer {
    addr: SocketAddr,
    app_state: Arc<AppState>,
    auth_state: Arc<AuthState>,
    cors_origins: Vec<String>,
}

impl WebServer {
    /// Create a new web server from the configuration and an open database.
    pub fn new(config: &Config, db: Database) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| CatnewsError::Config(format!("invalid server address: {e}")))?;

        let db = Arc::new(db);
        let issuer = TokenIssuer::new(&config.auth);
        let fetcher = Arc::new(HttpFeedFetcher::new()?);

        let auth_state = Arc::new(AuthState::new(issuer.clone(), db.pool().clone()));
        let app_state = Arc::new(AppState::new(db, issuer, fetcher, config.oauth.clone()));

        Ok(Self {
            addr,
            app_state,
            auth_state,
            cors_origins: config.server.cors_origins.clone(),
        })
    }

    /// Get the configured address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn router(&self) -> axum::Router {
        create_router(
            self.app_state.clone(),
            self.auth_state.clone(),
            &self.cors_origins,
        )
        .merge(create_health_router())
    }

    /// Run the web server until shutdown.
    pub async fn run(self) -> Result<()> {
        let router = self.router();

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(listener, router).await?;
        Ok(())
    }

    /// Run the server in the background and return the bound address.
    ///
    /// Useful for tests binding to port 0.
    pub async fn run_with_addr(self) -> Result<SocketAddr> {
        let router = self.router();

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 0;
        config
    }

    #[tokio::test]
    async fn test_web_server_new() {
        let db = Database::open_in_memory().await.unwrap();
        let server = WebServer::new(&test_config(), db).unwrap();
        assert_eq!(server.addr().ip().to_string(), "127.0.0.1");
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let db = Database::open_in_memory().await.unwrap();
        let server = WebServer::new(&test_config(), db).unwrap();
        let addr = server.run_with_addr().await.unwrap();

        let client = reqwest::Client::new();
        let resp = client
            .get(format!("http://{}/health", addr))
            .send()
            .await
            .unwrap();

        assert!(resp.status().is_success());
        assert_eq!(resp.text().await.unwrap(), "OK");
    }
}
