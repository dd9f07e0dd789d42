//! Feed subscription and direct feed management handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;
use validator::Validate;

use super::AppState;
use crate::feed::{FeedRepository, FeedService};
use crate::web::dto::{FeedResponse, SubscribeRequest, UpdateFeedRequest};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;
use crate::CatnewsError;

/// POST /feeds - Subscribe the caller to a feed URL.
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(req): Json<SubscribeRequest>,
) -> Result<(StatusCode, Json<FeedResponse>), ApiError> {
    req.validate().map_err(ApiError::from_validation_errors)?;

    let service = FeedService::new(&state.db, state.fetcher.as_ref());
    let feed = service.subscribe(user.id, &req.url).await?;

    Ok((StatusCode::CREATED, Json(FeedResponse::from(feed))))
}

/// POST /feeds/unsubscribe - Remove the caller's subscription.
pub async fn unsubscribe(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(req): Json<SubscribeRequest>,
) -> Result<Json<FeedResponse>, ApiError> {
    let service = FeedService::new(&state.db, state.fetcher.as_ref());
    let feed = service.unsubscribe(user.id, &req.url).await?;

    Ok(Json(FeedResponse::from(feed)))
}

/// GET /feeds - List the caller's subscribed feeds.
pub async fn list_subscriptions(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<FeedResponse>>, ApiError> {
    let service = FeedService::new(&state.db, state.fetcher.as_ref());
    let feeds = service.list_subscriptions(user.id).await?;

    Ok(Json(feeds.into_iter().map(FeedResponse::from).collect()))
}

/// POST /feed - Create a feed record without subscribing.
pub async fn create_feed(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    Json(req): Json<SubscribeRequest>,
) -> Result<(StatusCode, Json<FeedResponse>), ApiError> {
    req.validate().map_err(ApiError::from_validation_errors)?;

    let parsed = state.fetcher.fetch(&req.url).await?;
    let feed = FeedRepository::new(state.db.pool())
        .get_or_create(&crate::feed::NewFeed::new(&parsed.title, &req.url))
        .await?;

    Ok((StatusCode::CREATED, Json(FeedResponse::from(feed))))
}

/// GET /feed - List all feeds.
pub async fn list_feeds(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
) -> Result<Json<Vec<FeedResponse>>, ApiError> {
    let feeds = FeedRepository::new(state.db.pool()).list_all().await?;
    Ok(Json(feeds.into_iter().map(FeedResponse::from).collect()))
}

/// GET /feed/{id} - Get a feed by ID.
pub async fn get_feed(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<FeedResponse>, ApiError> {
    let feed = FeedRepository::new(state.db.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("feed not found"))?;

    Ok(Json(FeedResponse::from(feed)))
}

/// PUT /feed/{id} - Update a feed's title or URL.
pub async fn update_feed(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateFeedRequest>,
) -> Result<Json<FeedResponse>, ApiError> {
    req.validate().map_err(ApiError::from_validation_errors)?;

    let repo = FeedRepository::new(state.db.pool());
    let updated = repo
        .update(id, req.title.as_deref(), req.url.as_deref())
        .await
        .map_err(|e| match e {
            CatnewsError::Database(msg) if msg.contains("UNIQUE") => {
                ApiError::conflict("Feed URL already in use")
            }
            other => ApiError::from(other),
        })?;

    if !updated {
        return Err(ApiError::not_found("feed not found"));
    }

    let feed = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("feed not found"))?;
    Ok(Json(FeedResponse::from(feed)))
}

/// DELETE /feed/{id} - Delete a feed and everything linked to it.
pub async fn delete_feed(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = FeedRepository::new(state.db.pool()).delete(id).await?;
    if !deleted {
        return Err(ApiError::not_found("feed not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}
