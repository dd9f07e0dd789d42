//! Router configuration for the catnews HTTP API.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    create_article, create_feed, delete_feed, feed_articles, get_feed, list_all_articles,
    list_articles, list_feeds, list_subscriptions, login, me, oauth_authorize, oauth_callback,
    register, subscribe, unsubscribe, update_feed, AppState,
};
use super::middleware::{auth_context, create_cors_layer, AuthState};

/// Create the main API router.
pub fn create_router(
    app_state: Arc<AppState>,
    auth_state: Arc<AuthState>,
    cors_origins: &[String],
) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/:provider", get(oauth_authorize))
        .route("/:provider/callback", get(oauth_callback));

    // Subscription-centric routes
    let feeds_routes = Router::new()
        .route("/", post(subscribe).get(list_subscriptions))
        .route("/unsubscribe", post(unsubscribe));

    // Direct feed and article management
    let feed_routes = Router::new()
        .route("/", post(create_feed).get(list_feeds))
        .route("/:id", get(get_feed).put(update_feed).delete(delete_feed));

    let article_routes = Router::new()
        .route("/", get(list_all_articles).post(create_article))
        .route("/feed", get(feed_articles));

    let auth_state_for_middleware = auth_state.clone();

    Router::new()
        .nest("/auth", auth_routes)
        .nest("/feeds", feeds_routes)
        .route("/articles", get(list_articles))
        .nest("/feed", feed_routes)
        .nest("/article", article_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let state = auth_state_for_middleware.clone();
                    auth_context(state, req, next)
                })),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_health_router() {
        let _router = create_health_router();
        // Should not panic
    }
}
