//! Article listing and direct article management handlers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;
use validator::Validate;

use super::AppState;
use crate::feed::{ArticleRepository, FeedRepository, FeedService, NewArticle};
use crate::web::dto::{ArticleResponse, CreateArticleRequest, FeedIdQuery, PageQuery};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

/// GET /articles - List articles across the caller's subscriptions.
///
/// Feeds are refreshed before listing; `skip` and `limit` apply per feed.
pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<ArticleResponse>>, ApiError> {
    let service = FeedService::new(&state.db, state.fetcher.as_ref());
    let articles = service.list_articles(user.id, page.skip, page.limit).await?;

    Ok(Json(
        articles.into_iter().map(ArticleResponse::from).collect(),
    ))
}

/// GET /article - List all stored articles.
pub async fn list_all_articles(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<ArticleResponse>>, ApiError> {
    let articles = ArticleRepository::new(state.db.pool())
        .list_all(page.skip, page.limit)
        .await?;

    Ok(Json(
        articles.into_iter().map(ArticleResponse::from).collect(),
    ))
}

/// POST /article?feed_id - Store an article in a feed directly.
///
/// Returns 201 for a new article, 200 when the URL already exists in the
/// feed.
pub async fn create_article(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    Query(query): Query<FeedIdQuery>,
    Json(req): Json<CreateArticleRequest>,
) -> Result<(StatusCode, Json<ArticleResponse>), ApiError> {
    req.validate().map_err(ApiError::from_validation_errors)?;

    FeedRepository::new(state.db.pool())
        .get_by_id(query.feed_id)
        .await?
        .ok_or_else(|| ApiError::not_found("feed not found"))?;

    let mut new_article = NewArticle::new(&req.title, &req.url);
    if let Some(content) = &req.content {
        new_article = new_article.with_content(content);
    }

    let articles = ArticleRepository::new(state.db.pool());
    match articles.store_in_feed(query.feed_id, &new_article).await? {
        Some(article) => Ok((StatusCode::CREATED, Json(ArticleResponse::from(article)))),
        None => {
            let existing = articles
                .get_in_feed_by_url(query.feed_id, &req.url)
                .await?
                .ok_or_else(|| ApiError::not_found("article not found"))?;
            Ok((StatusCode::OK, Json(ArticleResponse::from(existing))))
        }
    }
}

/// GET /article/feed?feed_id - List the articles of one feed.
pub async fn feed_articles(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    Query(query): Query<FeedIdQuery>,
) -> Result<Json<Vec<ArticleResponse>>, ApiError> {
    let service = FeedService::new(&state.db, state.fetcher.as_ref());
    let articles = service
        .list_feed_articles(query.feed_id, query.skip, query.limit)
        .await?;

    Ok(Json(
        articles.into_iter().map(ArticleResponse::from).collect(),
    ))
}
