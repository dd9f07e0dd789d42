//! User and OAuth link models for catnews.

use chrono::{DateTime, Utc};

/// A registered user.
///
/// `password_hash` is empty for accounts created through an OAuth provider
/// that never set a password.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Username (unique).
    pub username: String,
    /// Email address (unique).
    pub email: String,
    /// Discord account id, if linked (unique).
    pub discord_id: Option<String>,
    /// GitHub account id, if linked (unique).
    pub github_id: Option<String>,
    /// Argon2 password hash, empty for OAuth-only accounts.
    pub password_hash: String,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Password hash (pre-hashed with Argon2), empty for OAuth accounts.
    pub password_hash: String,
    /// Discord account id for OAuth-created accounts.
    pub discord_id: Option<String>,
    /// GitHub account id for OAuth-created accounts.
    pub github_id: Option<String>,
}

impl NewUser {
    /// Create a new user with the required fields.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            discord_id: None,
            github_id: None,
        }
    }

    /// Set the Discord id.
    pub fn with_discord_id(mut self, id: impl Into<String>) -> Self {
        self.discord_id = Some(id.into());
        self
    }

    /// Set the GitHub id.
    pub fn with_github_id(mut self, id: impl Into<String>) -> Self {
        self.github_id = Some(id.into());
        self
    }
}

/// A stored OAuth2 provider link.
#[derive(Debug, Clone)]
pub struct OAuthLink {
    /// Unique link ID.
    pub id: i64,
    /// Provider name ("discord" / "github").
    pub provider: String,
    /// Owning user.
    pub user_id: i64,
    /// Provider access token.
    pub access_token: String,
    /// Provider refresh token, if issued.
    pub refresh_token: Option<String>,
    /// Access token expiry, if known.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Data for creating or updating an OAuth2 provider link.
#[derive(Debug, Clone)]
pub struct NewOAuthLink {
    /// Provider name.
    pub provider: String,
    /// Owning user.
    pub user_id: i64,
    /// Provider access token.
    pub access_token: String,
    /// Provider refresh token, if issued.
    pub refresh_token: Option<String>,
    /// Access token expiry, if known.
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewOAuthLink {
    /// Create a new link with the required fields.
    pub fn new(
        provider: impl Into<String>,
        user_id: i64,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            user_id,
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
        }
    }

    /// Set the refresh token.
    pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
        self.refresh_token = Some(token.into());
        self
    }

    /// Set the expiry timestamp.
    pub fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_builder() {
        let user = NewUser::new("alice", "alice@x.com", "hash").with_discord_id("123");
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@x.com");
        assert_eq!(user.discord_id, Some("123".to_string()));
        assert!(user.github_id.is_none());
    }

    #[test]
    fn test_new_oauth_link_builder() {
        let link = NewOAuthLink::new("discord", 1, "tok").with_refresh_token("ref");
        assert_eq!(link.provider, "discord");
        assert_eq!(link.user_id, 1);
        assert_eq!(link.refresh_token, Some("ref".to_string()));
        assert!(link.expires_at.is_none());
    }
}
