//! OAuth2 login against Discord and GitHub.
//!
//! Both providers follow the authorization-code flow: redirect the browser to
//! the provider, exchange the returned code for an access token, then fetch
//! the account profile. `OAuthService` turns a profile into a local user.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use super::token::TokenSource;
use crate::config::OAuthProviderConfig;
use crate::db::{DbPool, NewOAuthLink, NewUser, OAuthLinkRepository, User, UserRepository};
use crate::{CatnewsError, Result};

/// Supported OAuth2 providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Discord,
    Github,
}

impl Provider {
    /// Provider name as stored in `oauth_links.provider`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Discord => "discord",
            Provider::Github => "github",
        }
    }

    /// Token source for bearer tokens issued after this provider's login.
    pub fn token_source(&self) -> TokenSource {
        match self {
            Provider::Discord => TokenSource::Discord,
            Provider::Github => TokenSource::Github,
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tokens returned by the provider's code exchange.
#[derive(Debug, Clone)]
pub struct OAuthTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Provider account profile.
#[derive(Debug, Clone)]
pub struct OAuthProfile {
    /// Account id at the provider, unique per provider.
    pub external_id: String,
    /// Display or login name at the provider.
    pub username: String,
    /// Email, if the provider shares one.
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct DiscordUser {
    id: String,
    username: String,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubUser {
    id: i64,
    login: String,
    email: Option<String>,
}

/// HTTP client for one configured provider.
pub struct OAuthClient {
    provider: Provider,
    config: OAuthProviderConfig,
    http: reqwest::Client,
}

impl OAuthClient {
    /// Create a client for the given provider configuration.
    pub fn new(provider: Provider, config: OAuthProviderConfig) -> Result<Self> {
        // GitHub rejects requests without a User-Agent
        let http = reqwest::Client::builder()
            .user_agent(concat!("catnews/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CatnewsError::OAuth(e.to_string()))?;

        Ok(Self {
            provider,
            config,
            http,
        })
    }

    /// Build the provider authorization URL the browser is redirected to.
    pub fn authorize_url(&self) -> Result<String> {
        let mut url = Url::parse(&self.config.auth_url)
            .map_err(|e| CatnewsError::OAuth(format!("bad auth_url: {e}")))?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_url)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.config.scope);

        Ok(url.into())
    }

    /// Exchange an authorization code for provider tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<OAuthTokens> {
        debug!("Exchanging authorization code with {}", self.provider);

        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", &self.config.redirect_url),
            ("client_id", &self.config.client_id),
            ("client_secret", &self.config.client_secret),
        ];

        let response = self
            .http
            .post(&self.config.token_url)
            .header("Accept", "application/json")
            .form(&params)
            .send()
            .await
            .map_err(|e| CatnewsError::OAuth(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CatnewsError::OAuth(format!(
                "{} token exchange failed: HTTP {}",
                self.provider,
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| CatnewsError::OAuth(e.to_string()))?;

        Ok(OAuthTokens {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: token
                .expires_in
                .map(|secs| Utc::now() + Duration::seconds(secs)),
        })
    }

    /// Fetch the account profile with a provider access token.
    pub async fn fetch_profile(&self, access_token: &str) -> Result<OAuthProfile> {
        let response = self
            .http
            .get(&self.config.user_api_url)
            .header("Accept", "application/json")
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| CatnewsError::OAuth(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CatnewsError::OAuth(format!(
                "{} profile fetch failed: HTTP {}",
                self.provider,
                response.status()
            )));
        }

        match self.provider {
            Provider::Discord => {
                let user: DiscordUser = response
                    .json()
                    .await
                    .map_err(|e| CatnewsError::OAuth(e.to_string()))?;
                Ok(OAuthProfile {
                    external_id: user.id,
                    username: user.username,
                    email: user.email,
                })
            }
            Provider::Github => {
                let user: GithubUser = response
                    .json()
                    .await
                    .map_err(|e| CatnewsError::OAuth(e.to_string()))?;
                Ok(OAuthProfile {
                    external_id: user.id.to_string(),
                    username: user.login,
                    email: user.email,
                })
            }
        }
    }
}

/// Turns provider profiles into local users and stored links.
pub struct OAuthService<'a> {
    pool: &'a DbPool,
}

impl<'a> OAuthService<'a> {
    /// Create a service over the given pool.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Log in (or register) a user from a provider profile.
    ///
    /// Lookup order: existing account linked to the provider id, then an
    /// account with the provider's email (which gets the id linked onto it),
    /// then a fresh account. Stored provider tokens are replaced either way.
    pub async fn login(
        &self,
        provider: Provider,
        profile: &OAuthProfile,
        tokens: &OAuthTokens,
    ) -> Result<User> {
        let user = self.find_or_create(provider, profile).await?;

        let mut link = NewOAuthLink::new(provider.as_str(), user.id, &tokens.access_token);
        if let Some(refresh) = &tokens.refresh_token {
            link = link.with_refresh_token(refresh);
        }
        if let Some(expires_at) = tokens.expires_at {
            link = link.with_expires_at(expires_at);
        }
        OAuthLinkRepository::new(self.pool).upsert(&link).await?;

        Ok(user)
    }

    async fn find_or_create(&self, provider: Provider, profile: &OAuthProfile) -> Result<User> {
        let users = UserRepository::new(self.pool);

        let existing = match provider {
            Provider::Discord => users.get_by_discord_id(&profile.external_id).await?,
            Provider::Github => users.get_by_github_id(&profile.external_id).await?,
        };
        if let Some(user) = existing {
            return Ok(user);
        }

        // The provider email may belong to a password account: link it
        if let Some(email) = &profile.email {
            if let Some(user) = users.get_by_email(email).await? {
                info!(
                    "Linking {} account {} to existing user {}",
                    provider, profile.external_id, user.id
                );
                self.attach_external_id(provider, user.id, &profile.external_id)
                    .await?;
                return users
                    .get_by_id(user.id)
                    .await?
                    .ok_or_else(|| CatnewsError::NotFound("user".to_string()));
            }
        }

        info!(
            "Creating user for {} account {}",
            provider, profile.external_id
        );
        let email = profile
            .email
            .clone()
            .unwrap_or_else(|| format!("{}@{}.oauth", profile.external_id, provider));

        let new_user = self.profile_user(provider, profile, &profile.username, &email);
        match users.create(&new_user).await {
            Ok(user) => Ok(user),
            // Username taken by someone else: disambiguate with the provider id
            Err(CatnewsError::DuplicateUsername) => {
                let fallback = format!("{}_{}", profile.username, profile.external_id);
                users
                    .create(&self.profile_user(provider, profile, &fallback, &email))
                    .await
            }
            Err(e) => Err(e),
        }
    }

    fn profile_user(
        &self,
        provider: Provider,
        profile: &OAuthProfile,
        username: &str,
        email: &str,
    ) -> NewUser {
        // OAuth-created accounts have no password
        let user = NewUser::new(username, email, "");
        match provider {
            Provider::Discord => user.with_discord_id(&profile.external_id),
            Provider::Github => user.with_github_id(&profile.external_id),
        }
    }

    async fn attach_external_id(
        &self,
        provider: Provider,
        user_id: i64,
        external_id: &str,
    ) -> Result<()> {
        let users = UserRepository::new(self.pool);
        match provider {
            Provider::Discord => users.set_discord_id(user_id, external_id).await?,
            Provider::Github => users.set_github_id(user_id, external_id).await?,
        };
        Ok(())
    }
}
