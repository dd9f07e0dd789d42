//! Bearer token authentication middleware.

use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::auth::{resolve_user, TokenIssuer};
use crate::db::{DbPool, User};
use crate::web::error::ApiError;

/// Shared authentication state injected into request extensions.
pub struct AuthState {
    /// Token validator.
    pub issuer: TokenIssuer,
    /// Pool for resolving token subjects to users.
    pub pool: DbPool,
}

impl AuthState {
    /// Create a new authentication state.
    pub fn new(issuer: TokenIssuer, pool: DbPool) -> Self {
        Self { issuer, pool }
    }
}

/// Extractor for authenticated users.
///
/// Validates the bearer token and resolves its subject to a stored user,
/// per the token's source (password, Discord, or GitHub login).
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let token = parts
                .headers
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|header| header.strip_prefix("Bearer "))
                .ok_or_else(|| ApiError::unauthorized("Missing authorization"))?;

            let auth_state = parts
                .extensions
                .get::<Arc<AuthState>>()
                .ok_or_else(|| ApiError::internal("Auth state not configured"))?;

            let claims = auth_state.issuer.validate(token).map_err(|e| {
                tracing::debug!("Token validation failed: {}", e);
                ApiError::unauthorized("Invalid or expired token")
            })?;

            let user = resolve_user(&claims, &auth_state.pool)
                .await
                .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;

            Ok(AuthUser(user))
        })
    }
}

/// Middleware function to inject auth state into request extensions.
pub async fn auth_context(
    auth_state: Arc<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(auth_state);
    next.run(request).await
}
