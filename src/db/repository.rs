//! User and OAuth link repositories for catnews.

use chrono::{DateTime, Utc};

use super::user::{NewOAuthLink, NewUser, OAuthLink, User};
use super::DbPool;
use crate::{CatnewsError, Result};

/// Parse a timestamp stored by SQLite.
pub(crate) fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    // Try RFC3339 first
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Try SQLite datetime format
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(DateTime::from_naive_utc_and_offset(naive, Utc));
    }
    None
}

/// Row type for a user from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    discord_id: Option<String>,
    github_id: Option<String>,
    password_hash: String,
    created_at: String,
    updated_at: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            email: row.email,
            discord_id: row.discord_id,
            github_id: row.github_id,
            password_hash: row.password_hash,
            created_at: parse_datetime(&row.created_at).unwrap_or_else(Utc::now),
            updated_at: parse_datetime(&row.updated_at).unwrap_or_else(Utc::now),
        }
    }
}

const USER_COLUMNS: &str =
    "id, username, email, discord_id, github_id, password_hash, created_at, updated_at";

/// Repository for user CRUD operations.
pub struct UserRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new user.
    ///
    /// A unique-constraint violation on email or username is translated to
    /// `DuplicateEmail` / `DuplicateUsername` so concurrent registrations
    /// surface the same error as the pre-insert checks.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (username, email, discord_id, github_id, password_hash)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.discord_id)
        .bind(&new_user.github_id)
        .bind(&new_user.password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();
            if msg.contains("UNIQUE") && msg.contains("users.email") {
                CatnewsError::DuplicateEmail
            } else if msg.contains("UNIQUE") && msg.contains("users.username") {
                CatnewsError::DuplicateUsername
            } else {
                CatnewsError::Database(msg)
            }
        })?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| CatnewsError::NotFound("user".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// Get a user by email.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// Get a user by username.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// Get a user by linked Discord account id.
    pub async fn get_by_discord_id(&self, discord_id: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE discord_id = $1"
        ))
        .bind(discord_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// Get a user by linked GitHub account id.
    pub async fn get_by_github_id(&self, github_id: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE github_id = $1"
        ))
        .bind(github_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// Store the Discord account id on an existing user.
    pub async fn set_discord_id(&self, user_id: i64, discord_id: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET discord_id = $1, updated_at = datetime('now') WHERE id = $2",
        )
        .bind(discord_id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Store the GitHub account id on an existing user.
    pub async fn set_github_id(&self, user_id: i64, github_id: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET github_id = $1, updated_at = datetime('now') WHERE id = $2",
        )
        .bind(github_id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Row type for an OAuth link from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct OAuthLinkRow {
    id: i64,
    provider: String,
    user_id: i64,
    access_token: String,
    refresh_token: Option<String>,
    expires_at: Option<String>,
}

impl From<OAuthLinkRow> for OAuthLink {
    fn from(row: OAuthLinkRow) -> Self {
        OAuthLink {
            id: row.id,
            provider: row.provider,
            user_id: row.user_id,
            access_token: row.access_token,
            refresh_token: row.refresh_token,
            expires_at: row.expires_at.and_then(|s| parse_datetime(&s)),
        }
    }
}

/// Repository for OAuth2 provider links.
pub struct OAuthLinkRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> OAuthLinkRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create or update the link for (user, provider).
    ///
    /// One row per (user, provider): repeat logins replace the stored tokens.
    pub async fn upsert(&self, link: &NewOAuthLink) -> Result<OAuthLink> {
        let expires_at = link.expires_at.map(|dt| dt.to_rfc3339());

        sqlx::query(
            "INSERT INTO oauth_links (provider, user_id, access_token, refresh_token, expires_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (user_id, provider) DO UPDATE SET
                access_token = excluded.access_token,
                refresh_token = excluded.refresh_token,
                expires_at = excluded.expires_at,
                updated_at = datetime('now')",
        )
        .bind(&link.provider)
        .bind(link.user_id)
        .bind(&link.access_token)
        .bind(&link.refresh_token)
        .bind(&expires_at)
        .execute(self.pool)
        .await?;

        self.get(link.user_id, &link.provider)
            .await?
            .ok_or_else(|| CatnewsError::NotFound("OAuth link".to_string()))
    }

    /// Get the link for (user, provider).
    pub async fn get(&self, user_id: i64, provider: &str) -> Result<Option<OAuthLink>> {
        let row = sqlx::query_as::<_, OAuthLinkRow>(
            "SELECT id, provider, user_id, access_token, refresh_token, expires_at
             FROM oauth_links
             WHERE user_id = $1 AND provider = $2",
        )
        .bind(user_id)
        .bind(provider)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(OAuthLink::from))
    }

    /// Count links for a user.
    pub async fn count_for_user(&self, user_id: i64) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM oauth_links WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(self.pool)
                .await?;

        Ok(count)
    }
}
