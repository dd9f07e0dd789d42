//! Bearer token issuing and validation.
//!
//! Tokens are JWTs signed with HMAC-SHA256. The `token_source` claim records
//! which login path produced the token and decides how the subject is
//! resolved back to a user: password tokens carry the user id, OAuth tokens
//! carry the provider account id.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::db::{DbPool, User, UserRepository};
use crate::{CatnewsError, Result};

/// Which login path issued a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenSource {
    /// Email and password login. Subject is the user id.
    Password,
    /// Discord OAuth2 login. Subject is the Discord account id.
    Discord,
    /// GitHub OAuth2 login. Subject is the GitHub account id.
    Github,
}

/// JWT claims carried by every catnews token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, interpreted per `token_source`.
    pub sub: String,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
    /// Login path that produced this token.
    pub token_source: TokenSource,
}

/// Issues and validates bearer tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_mins: i64,
}

impl TokenIssuer {
    /// Create an issuer from the auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            expiry_mins: config.token_expiry_mins as i64,
        }
    }

    /// Issue a token for the given subject and login path.
    pub fn issue(&self, subject: &str, source: TokenSource) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(self.expiry_mins)).timestamp(),
            token_source: source,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| CatnewsError::InvalidToken(e.to_string()))
    }

    /// Issue a password-login token for a user.
    pub fn issue_for_user(&self, user: &User) -> Result<String> {
        self.issue(&user.id.to_string(), TokenSource::Password)
    }

    /// Validate a token and return its claims.
    ///
    /// Expired, malformed, and wrongly-signed tokens all fail here.
    pub fn validate(&self, token: &str) -> Result<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| CatnewsError::InvalidToken(e.to_string()))?;
        Ok(data.claims)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("expiry_mins", &self.expiry_mins)
            .finish()
    }
}

/// Resolve validated claims to the owning user.
pub async fn resolve_user(claims: &Claims, pool: &DbPool) -> Result<User> {
    let repo = UserRepository::new(pool);

    let user = match claims.token_source {
        TokenSource::Password => {
            let id: i64 = claims
                .sub
                .parse()
                .map_err(|_| CatnewsError::InvalidToken("bad subject".to_string()))?;
            repo.get_by_id(id).await?
        }
        TokenSource::Discord => repo.get_by_discord_id(&claims.sub).await?,
        TokenSource::Github => repo.get_by_github_id(&claims.sub).await?,
    };

    user.ok_or_else(|| CatnewsError::InvalidToken("unknown user".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, NewUser};

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(&AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_expiry_mins: 30,
        })
    }

    #[test]
    fn test_issue_and_validate_round_trip() {
        let issuer = issuer();
        let token = issuer.issue("42", TokenSource::Password).unwrap();
        let claims = issuer.validate(&token).unwrap();

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.token_source, TokenSource::Password);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issuer().issue("42", TokenSource::Password).unwrap();
        let other = TokenIssuer::new(&AuthConfig {
            jwt_secret: "different".to_string(),
            token_expiry_mins: 30,
        });

        assert!(matches!(
            other.validate(&token),
            Err(CatnewsError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(issuer().validate("not.a.jwt").is_err());
    }

    #[tokio::test]
    async fn test_resolve_user_per_source() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());
        let user = repo
            .create(&NewUser::new("alice", "alice@x.com", "h").with_discord_id("d-9"))
            .await
            .unwrap();

        let by_id = Claims {
            sub: user.id.to_string(),
            iat: 0,
            exp: 0,
            token_source: TokenSource::Password,
        };
        assert_eq!(resolve_user(&by_id, db.pool()).await.unwrap().id, user.id);

        let by_discord = Claims {
            sub: "d-9".to_string(),
            token_source: TokenSource::Discord,
            ..by_id.clone()
        };
        assert_eq!(
            resolve_user(&by_discord, db.pool()).await.unwrap().id,
            user.id
        );

        let unknown = Claims {
            sub: "g-404".to_string(),
            token_source: TokenSource::Github,
            ..by_id
        };
        assert!(matches!(
            resolve_user(&unknown, db.pool()).await,
            Err(CatnewsError::InvalidToken(_))
        ));
    }
}
