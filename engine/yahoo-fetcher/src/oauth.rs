//! Yahoo OAuth2 authorization-code flow

use crate::config::OAuthConfig;
use crate::FetchError;
use chrono::{DateTime, Duration, Utc};
use oauth2::basic::BasicClient;
use oauth2::{AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, TokenResponse, TokenUrl};
use serde::{Deserialize, Serialize};

/// Access token held for one browser session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionToken {
    pub access_token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionToken {
    pub fn new(access_token: impl Into<String>, expires_in: Option<Duration>) -> Self {
        Self { access_token: access_token.into(), expires_at: expires_in.map(|d| Utc::now() + d) }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(false, |at| at <= now)
    }
}

/// Yahoo OAuth client
#[derive(Debug)]
pub struct YahooOAuthClient {
    client: BasicClient,
}

impl YahooOAuthClient {
    pub fn new(config: &OAuthConfig) -> Result<Self, FetchError> {
        let invalid = |what: &str, e: oauth2::url::ParseError| FetchError::InvalidConfig {
            message: format!("Invalid {what} URL: {e}"),
        };

        let client = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            AuthUrl::new(config.auth_url.clone()).map_err(|e| invalid("auth", e))?,
            Some(TokenUrl::new(config.token_url.clone()).map_err(|e| invalid("token", e))?),
        )
        .set_redirect_uri(RedirectUrl::new(config.redirect_url.clone()).map_err(|e| invalid("redirect", e))?);

        Ok(Self { client })
    }

    /// Authorization URL and the CSRF state the callback must echo back
    pub fn authorization_url(&self) -> (String, String) {
        let (url, state) = self.client.authorize_url(CsrfToken::new_random).url();
        (url.to_string(), state.secret().clone())
    }

    /// Exchange an authorization code for an access token
    pub async fn exchange_code(&self, code: &str) -> Result<SessionToken, FetchError> {
        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(oauth2::reqwest::async_http_client)
            .await
            .map_err(|e| FetchError::OAuth { message: e.to_string() })?;

        let expires_in = token.expires_in().and_then(|d| Duration::from_std(d).ok());
        Ok(SessionToken::new(token.access_token().secret().clone(), expires_in))
    }
}
