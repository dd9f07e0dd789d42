//! Error types for catnews.

use thiserror::Error;

/// Common error type for catnews.
#[derive(Error, Debug)]
pub enum CatnewsError {
    /// Database error.
    ///
    /// Generic database error wrapping failures from sqlx.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Registration failed because the email is already taken.
    #[error("email already registered")]
    DuplicateEmail,

    /// Registration failed because the username is already taken.
    #[error("username already taken")]
    DuplicateUsername,

    /// Login failed: unknown email or wrong password.
    #[error("incorrect email or password")]
    InvalidCredentials,

    /// Password hashing or stored-hash parsing failure.
    #[error("password hash error: {0}")]
    PasswordHash(String),

    /// Bearer token is expired, malformed, or not signed with our secret.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Feed URL unreachable or unparsable.
    #[error("feed fetch error: {0}")]
    Fetch(String),

    /// External text-generation service failure or malformed response.
    #[error("generation error: {0}")]
    Generation(String),

    /// OAuth2 code exchange or profile fetch failure.
    #[error("OAuth error: {0}")]
    OAuth(String),
}

impl From<sqlx::Error> for CatnewsError {
    fn from(e: sqlx::Error) -> Self {
        CatnewsError::Database(e.to_string())
    }
}

/// Result type alias for catnews operations.
pub type Result<T> = std::result::Result<T, CatnewsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_email_display() {
        assert_eq!(
            CatnewsError::DuplicateEmail.to_string(),
            "email already registered"
        );
    }

    #[test]
    fn test_invalid_credentials_display() {
        assert_eq!(
            CatnewsError::InvalidCredentials.to_string(),
            "incorrect email or password"
        );
    }

    #[test]
    fn test_not_found_display() {
        let err = CatnewsError::NotFound("feed".to_string());
        assert_eq!(err.to_string(), "feed not found");
    }

    #[test]
    fn test_fetch_error_display() {
        let err = CatnewsError::Fetch("connection refused".to_string());
        assert_eq!(err.to_string(), "feed fetch error: connection refused");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: CatnewsError = io_err.into();
        assert!(matches!(err, CatnewsError::Io(_)));
        assert!(err.to_string().contains("file missing"));
    }

    #[test]
    fn test_result_alias() {
        fn sample() -> Result<i32> {
            Ok(7)
        }
        assert_eq!(sample().unwrap(), 7);
    }
}
