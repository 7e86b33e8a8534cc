//! # Fantasy Wrapped Dashboard
//!
//! Web front for a Yahoo fantasy football league's season in review.
//!
//! A browser signs in through Yahoo's OAuth flow; every dashboard request then fetches the
//! league with the session's token, computes the season report, and renders it as HTML or
//! JSON. Sessions live in memory and nothing else is shared between requests.

pub mod config;
pub mod error;
pub mod logging;
pub mod render;
pub mod routes;
pub mod service;
pub mod session;

pub use config::{load_config, DashboardConfig};
pub use error::{ApiResponse, DashboardError};
pub use logging::initialize_logging;
pub use routes::{create_routes, AppState};
pub use service::DashboardService;
pub use session::{RequestContext, SessionStore};

use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use yahoo_fetcher::{LeagueDataProvider, YahooClient, YahooOAuthClient};

/// Wire the Yahoo client, OAuth client, and session store together
pub fn build_state(config: &DashboardConfig) -> Result<Arc<AppState>> {
    let client = YahooClient::new(config.yahoo.clone()).context("Failed to create Yahoo client")?;
    let provider: Arc<dyn LeagueDataProvider> = Arc::new(client);
    let oauth = YahooOAuthClient::new(&config.yahoo.oauth).context("Failed to create OAuth client")?;

    let service = DashboardService::new(provider, config.stats.sparse_sample_policy);
    Ok(Arc::new(AppState::new(service, oauth, &config.session)))
}

/// Periodically drop idle sessions
pub fn spawn_session_pruner(sessions: Arc<SessionStore>, interval_secs: u64) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            interval.tick().await;
            let removed = sessions.prune_expired(Utc::now());
            if removed > 0 {
                tracing::debug!("Pruned {} idle sessions ({} active)", removed, sessions.len());
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_state_from_config() {
        let mut config = DashboardConfig::default();
        config.yahoo.oauth.client_id = "id".into();
        config.yahoo.oauth.client_secret = "secret".into();

        let state = build_state(&config).unwrap();
        assert!(state.sessions.is_empty());
    }

    #[tokio::test]
    async fn test_pruner_runs_in_background() {
        let sessions = Arc::new(SessionStore::new(chrono::Duration::zero()));
        sessions.get_or_create(None);

        let handle = spawn_session_pruner(sessions.clone(), 1);
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();

        assert!(sessions.is_empty());
    }
}
