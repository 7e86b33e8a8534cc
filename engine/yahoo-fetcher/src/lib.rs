//! # YahooFetcher
//!
//! Client for the Yahoo Fantasy Sports API.
//!
//! Exposes the [`LeagueDataProvider`] trait the dashboard talks to, a reqwest-backed
//! [`YahooClient`] implementing it, the sequential [`fetch_season`] fan-out, and the
//! OAuth2 authorization-code flow in [`oauth`].

pub mod client;
pub mod config;
pub mod error;
pub mod oauth;
pub mod provider;
pub mod season;

#[cfg(any(test, feature = "fixtures"))]
pub mod testing;

pub use client::YahooClient;
pub use config::{OAuthConfig, YahooConfig};
pub use error::FetchError;
pub use oauth::{SessionToken, YahooOAuthClient};
pub use provider::LeagueDataProvider;
pub use season::fetch_season;

/// First few characters of a token, safe to log
pub fn token_prefix(token: &str) -> String {
    let prefix: String = token.chars().take(6).collect();
    format!("{prefix}…")
}
