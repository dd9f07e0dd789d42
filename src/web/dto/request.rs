//! Request DTOs.

use serde::{Deserialize, Deserializer};
use validator::{Validate, ValidationError};

/// Registration request body.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired username.
    #[validate(length(min = 3, max = 32, message = "Username must be 3-32 characters"))]
    pub username: String,
    /// Email address.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Plaintext password.
    #[validate(custom(function = "password_strength"))]
    pub password: String,
}

/// Password rules shared with the auth layer.
fn password_strength(password: &str) -> Result<(), ValidationError> {
    if crate::auth::validate_password(password).is_err() {
        let mut error = ValidationError::new("password");
        error.message = Some("Password must be at least 8 characters".into());
        return Err(error);
    }
    Ok(())
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Feed subscription request body.
#[derive(Debug, Deserialize, Validate)]
pub struct SubscribeRequest {
    /// Feed URL.
    #[validate(url(message = "Invalid feed URL"))]
    pub url: String,
}

/// Feed update request body.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFeedRequest {
    /// New title, if changing.
    pub title: Option<String>,
    /// New URL, if changing.
    #[validate(url(message = "Invalid feed URL"))]
    pub url: Option<String>,
}

/// Direct article creation request body.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateArticleRequest {
    /// Article title.
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    /// Article URL.
    #[validate(url(message = "Invalid article URL"))]
    pub url: String,
    /// Article content.
    pub content: Option<String>,
}

/// Pagination query parameters.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    /// Rows to skip.
    #[serde(default, deserialize_with = "de_non_negative")]
    pub skip: i64,
    /// Maximum rows to return.
    #[serde(default = "default_limit", deserialize_with = "de_non_negative")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    10
}

/// Negative values would reach the SQL layer unchecked; clamp them to 0.
fn de_non_negative<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = i64::deserialize(deserializer)?;
    Ok(value.max(0))
}

/// Feed selector query parameters.
#[derive(Debug, Deserialize)]
pub struct FeedIdQuery {
    /// Target feed.
    pub feed_id: i64,
    /// Rows to skip.
    #[serde(default, deserialize_with = "de_non_negative")]
    pub skip: i64,
    /// Maximum rows to return.
    #[serde(default = "default_limit", deserialize_with = "de_non_negative")]
    pub limit: i64,
}

/// OAuth2 callback query parameters.
#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    /// Authorization code from the provider.
    pub code: String,
}
