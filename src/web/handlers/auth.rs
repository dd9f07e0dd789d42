//! Authentication handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::Json;
use std::sync::Arc;
use validator::Validate;

use super::AppState;
use crate::auth::{hash_password, verify_password, OAuthClient, OAuthService, Provider, TokenSource};
use crate::config::OAuthProviderConfig;
use crate::db::{NewUser, UserRepository};
use crate::web::dto::{LoginRequest, OAuthCallbackQuery, RegisterRequest, TokenResponse, UserResponse};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

/// POST /auth/register - Register a new account.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    req.validate().map_err(ApiError::from_validation_errors)?;

    let password_hash = hash_password(&req.password)?;

    let repo = UserRepository::new(state.db.pool());
    let user = repo
        .create(&NewUser::new(&req.username, &req.email, password_hash))
        .await?;

    tracing::info!("Registered user {} ({})", user.id, user.username);

    let token = state.issuer.issue_for_user(&user)?;
    Ok((
        StatusCode::CREATED,
        Json(TokenResponse::new(token, TokenSource::Password)),
    ))
}

/// POST /auth/login - Password login.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let repo = UserRepository::new(state.db.pool());

    // Same response whether the email or the password is wrong
    let user = repo
        .get_by_email(&req.email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Incorrect email or password"))?;

    if !verify_password(&req.password, &user.password_hash)? {
        return Err(ApiError::unauthorized("Incorrect email or password"));
    }

    let token = state.issuer.issue_for_user(&user)?;
    Ok(Json(TokenResponse::new(token, TokenSource::Password)))
}

/// GET /auth/me - Current account details.
pub async fn me(AuthUser(user): AuthUser) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}

fn parse_provider(name: &str) -> Result<Provider, ApiError> {
    match name {
        "discord" => Ok(Provider::Discord),
        "github" => Ok(Provider::Github),
        _ => Err(ApiError::not_found(format!("unknown provider: {name}"))),
    }
}

fn provider_config(state: &AppState, provider: Provider) -> OAuthProviderConfig {
    match provider {
        Provider::Discord => state.oauth.discord.clone(),
        Provider::Github => state.oauth.github.clone(),
    }
}

/// GET /auth/{provider} - Redirect to the provider's authorization page.
pub async fn oauth_authorize(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
) -> Result<Redirect, ApiError> {
    let provider = parse_provider(&provider)?;
    let client = OAuthClient::new(provider, provider_config(&state, provider))?;
    let url = client.authorize_url()?;

    Ok(Redirect::temporary(&url))
}

/// GET /auth/{provider}/callback - Complete an OAuth2 login.
pub async fn oauth_callback(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    Query(query): Query<OAuthCallbackQuery>,
) -> Result<Json<TokenResponse>, ApiError> {
    let provider = parse_provider(&provider)?;
    let client = OAuthClient::new(provider, provider_config(&state, provider))?;

    let tokens = client.exchange_code(&query.code).await?;
    let profile = client.fetch_profile(&tokens.access_token).await?;

    let user = OAuthService::new(state.db.pool())
        .login(provider, &profile, &tokens)
        .await?;
    tracing::info!("OAuth login via {} for user {}", provider, user.id);

    let token = state
        .issuer
        .issue(&profile.external_id, provider.token_source())?;
    Ok(Json(TokenResponse::new(token, provider.token_source())))
}
