//! The raw league data seam between the dashboard and the Yahoo API

use crate::FetchError;
use async_trait::async_trait;
use serde_json::Value;

/// Source of raw provider responses for one authenticated user.
///
/// Every call takes the caller's bearer token; implementations hold no per-user state.
#[async_trait]
pub trait LeagueDataProvider: Send + Sync {
    /// Key of the first league the user belongs to
    async fn league_key(&self, token: &str) -> Result<String, FetchError>;

    async fn teams(&self, token: &str, league_key: &str) -> Result<Value, FetchError>;

    async fn standings(&self, token: &str, league_key: &str) -> Result<Value, FetchError>;

    async fn scoreboard(&self, token: &str, league_key: &str, week: u32) -> Result<Value, FetchError>;

    /// `Ok(false)` when the provider rejects the token
    async fn verify_token(&self, token: &str) -> Result<bool, FetchError>;
}
