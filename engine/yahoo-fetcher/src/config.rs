//! Configuration for the Yahoo Fantasy API client

use crate::FetchError;
use serde::{Deserialize, Serialize};

/// Yahoo OAuth2 application credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
    pub auth_url: String,
    pub token_url: String,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_url: "http://localhost:5000/callback".to_string(),
            auth_url: "https://api.login.yahoo.com/oauth2/request_auth".to_string(),
            token_url: "https://api.login.yahoo.com/oauth2/get_token".to_string(),
        }
    }
}

/// Yahoo Fantasy API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YahooConfig {
    pub api_base_url: String,
    /// Game key scoping league discovery, e.g. "nfl" or a season id like "449"
    pub game_key: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub oauth: OAuthConfig,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://fantasysports.yahooapis.com/fantasy/v2".to_string(),
            game_key: "nfl".to_string(),
            request_timeout_secs: 30,
            user_agent: format!("fantasy-wrapped/{}", env!("CARGO_PKG_VERSION")),
            oauth: OAuthConfig::default(),
        }
    }
}

impl YahooConfig {
    /// Defaults overridden from the process environment
    pub fn from_env() -> Result<Self, FetchError> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden from the environment, without OAuth credentials.
    ///
    /// For callers that already hold a bearer token.
    pub fn api_from_env() -> Result<Self, FetchError> {
        Self::api_from_lookup(|key| std::env::var(key).ok())
    }

    pub fn api_from_lookup<F>(lookup: F) -> Result<Self, FetchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        config.apply_overrides(lookup)?;
        config.validate_api()?;
        Ok(config)
    }

    /// Apply `YAHOO_*` overrides from any key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), FetchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(id) = lookup("YAHOO_CLIENT_ID") {
            self.oauth.client_id = id;
        }
        if let Some(secret) = lookup("YAHOO_CLIENT_SECRET") {
            self.oauth.client_secret = secret;
        }
        if let Some(url) = lookup("YAHOO_REDIRECT_URL") {
            self.oauth.redirect_url = url;
        }
        if let Some(base) = lookup("YAHOO_API_BASE_URL") {
            self.api_base_url = base;
        }
        if let Some(game) = lookup("YAHOO_GAME_KEY") {
            self.game_key = game;
        }
        if let Some(timeout) = lookup("YAHOO_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = timeout.parse().map_err(|_| FetchError::InvalidConfig {
                message: format!("YAHOO_REQUEST_TIMEOUT_SECS must be a number, got '{timeout}'"),
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), FetchError> {
        let required = [
            ("YAHOO_CLIENT_ID", &self.oauth.client_id),
            ("YAHOO_CLIENT_SECRET", &self.oauth.client_secret),
            ("YAHOO_REDIRECT_URL", &self.oauth.redirect_url),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(FetchError::InvalidConfig { message: format!("{name} not set") });
            }
        }
        self.validate_api()
    }

    /// Checks for the data API alone
    pub fn validate_api(&self) -> Result<(), FetchError> {
        if self.request_timeout_secs == 0 {
            return Err(FetchError::InvalidConfig {
                message: "Request timeout must be greater than 0".to_string(),
            });
        }
        if self.game_key.trim().is_empty() {
            return Err(FetchError::InvalidConfig { message: "Game key cannot be empty".to_string() });
        }
        Ok(())
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}
