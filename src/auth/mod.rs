//! Authentication for catnews.
//!
//! Password hashing (Argon2id), bearer token issuing and validation, and
//! OAuth2 login against Discord and GitHub.

mod oauth;
mod password;
mod token;

pub use oauth::{OAuthClient, OAuthProfile, OAuthService, OAuthTokens, Provider};
pub use password::{hash_password, validate_password, verify_password};
pub use token::{resolve_user, Claims, TokenIssuer, TokenSource};
