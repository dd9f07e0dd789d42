//! Configuration module for catnews.
//!
//! All settings live in one `Config` struct loaded from a TOML file at process
//! start and passed by reference to the components that need it.

use serde::Deserialize;
use std::path::Path;

use crate::{CatnewsError, Result};

/// Web server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins (empty = allow any).
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/catnews.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign bearer tokens (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Access token lifetime in minutes.
    #[serde(default = "default_token_expiry_mins")]
    pub token_expiry_mins: u64,
}

fn default_jwt_secret() -> String {
    "change-me".to_string()
}

fn default_token_expiry_mins() -> u64 {
    30
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_expiry_mins: default_token_expiry_mins(),
        }
    }
}

/// Settings for a single OAuth2 provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OAuthProviderConfig {
    /// OAuth2 client id.
    #[serde(default)]
    pub client_id: String,
    /// OAuth2 client secret.
    #[serde(default)]
    pub client_secret: String,
    /// Redirect URL registered with the provider.
    #[serde(default)]
    pub redirect_url: String,
    /// Authorization endpoint.
    #[serde(default)]
    pub auth_url: String,
    /// Token exchange endpoint.
    #[serde(default)]
    pub token_url: String,
    /// Profile endpoint.
    #[serde(default)]
    pub user_api_url: String,
    /// Requested scopes.
    #[serde(default)]
    pub scope: String,
}

/// OAuth2 configuration for all supported providers.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthConfig {
    /// Discord provider settings.
    #[serde(default = "default_discord_provider")]
    pub discord: OAuthProviderConfig,
    /// GitHub provider settings.
    #[serde(default = "default_github_provider")]
    pub github: OAuthProviderConfig,
}

fn default_discord_provider() -> OAuthProviderConfig {
    OAuthProviderConfig {
        auth_url: "https://discord.com/api/oauth2/authorize".to_string(),
        token_url: "https://discord.com/api/oauth2/token".to_string(),
        user_api_url: "https://discord.com/api/users/@me".to_string(),
        scope: "identify email".to_string(),
        ..Default::default()
    }
}

fn default_github_provider() -> OAuthProviderConfig {
    OAuthProviderConfig {
        auth_url: "https://github.com/login/oauth/authorize".to_string(),
        token_url: "https://github.com/login/oauth/access_token".to_string(),
        user_api_url: "https://api.github.com/user".to_string(),
        scope: "read:user user:email".to_string(),
        ..Default::default()
    }
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            discord: default_discord_provider(),
            github: default_github_provider(),
        }
    }
}

/// Text-generation service configuration.
///
/// Consumed by `OpenAiGenerator` in chat-bot deployments; the bundled binary
/// serves the HTTP API only and does not read these settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// API key for the completion service.
    #[serde(default)]
    pub api_key: String,
    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_ai_base_url")]
    pub base_url: String,
    /// Model name.
    #[serde(default = "default_ai_model")]
    pub model: String,
}

fn default_ai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_ai_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_ai_base_url(),
            model: default_ai_model(),
        }
    }
}

/// Chat bot configuration.
///
/// Consumed by `BotHandler` in chat-bot deployments; the bundled binary
/// serves the HTTP API only and does not read these settings.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Articles per page for the `news` command.
    #[serde(default = "default_news_page_size")]
    pub news_page_size: i64,
}

fn default_news_page_size() -> i64 {
    3
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            news_page_size: default_news_page_size(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/catnews.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Web server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// OAuth2 provider settings.
    #[serde(default)]
    pub oauth: OAuthConfig,
    /// Text-generation settings.
    #[serde(default)]
    pub ai: AiConfig,
    /// Chat bot settings.
    #[serde(default)]
    pub bot: BotConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CatnewsError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.database.path, "data/catnews.db");
        assert_eq!(config.auth.token_expiry_mins, 30);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_default_oauth_endpoints() {
        let config = Config::default();
        assert!(config.oauth.discord.auth_url.contains("discord.com"));
        assert!(config.oauth.github.token_url.contains("github.com"));
        assert!(config.oauth.discord.client_id.is_empty());
    }

    #[test]
    fn test_parse_partial_toml() {
        let toml_str = r#"
            [server]
            port = 9000

            [auth]
            jwt_secret = "s3cret"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert_eq!(config.auth.token_expiry_mins, 30);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("does/not/exist.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "[database]\npath = \"test.db\"").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.database.path, "test.db");
    }
}
