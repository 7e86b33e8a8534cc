//! reqwest-backed Yahoo Fantasy API client

use crate::config::YahooConfig;
use crate::provider::LeagueDataProvider;
use crate::{token_prefix, FetchError};
use async_trait::async_trait;
use league_analytics::normalizer::first_league_key;
use reqwest::{header, Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Yahoo Fantasy API client
#[derive(Debug, Clone)]
pub struct YahooClient {
    config: YahooConfig,
    client: Client,
}

impl YahooClient {
    pub fn new(config: YahooConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &YahooConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url(), path)
    }

    /// GET a resource path as JSON
    async fn get_json(&self, token: &str, path: &str) -> Result<Value, FetchError> {
        let url = self.url(path);
        debug!("GET {} (token {})", url, token_prefix(token));

        let response = self
            .client
            .get(&url)
            .query(&[("format", "json")])
            .bearer_auth(token)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!("Yahoo rejected token {} for {}", token_prefix(token), url);
            return Err(FetchError::NotAuthenticated);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Yahoo returned {} for {}: {}", status, url, FetchError::body_excerpt(&body));
            return Err(FetchError::Upstream { status: status.as_u16(), url, body });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl LeagueDataProvider for YahooClient {
    async fn league_key(&self, token: &str) -> Result<String, FetchError> {
        let path = format!("users;use_login=1/games;game_keys={}/leagues", self.config.game_key);
        let body = self.get_json(token, &path).await?;
        Ok(first_league_key(&body)?)
    }

    async fn teams(&self, token: &str, league_key: &str) -> Result<Value, FetchError> {
        self.get_json(token, &format!("league/{league_key}/teams")).await
    }

    async fn standings(&self, token: &str, league_key: &str) -> Result<Value, FetchError> {
        self.get_json(token, &format!("league/{league_key}/standings")).await
    }

    async fn scoreboard(&self, token: &str, league_key: &str, week: u32) -> Result<Value, FetchError> {
        self.get_json(token, &format!("league/{league_key}/scoreboard;week={week}")).await
    }

    async fn verify_token(&self, token: &str) -> Result<bool, FetchError> {
        match self.get_json(token, "users;use_login=1").await {
            Ok(_) => Ok(true),
            Err(FetchError::NotAuthenticated) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use league_analytics::fixtures;
    use std::net::SocketAddr;
    use warp::http::StatusCode as WarpStatus;
    use warp::Filter;

    const TOKEN: &str = "good-token-123456";

    /// Local stand-in for the Yahoo API: checks the bearer token and format query.
    fn spawn_fake_yahoo() -> SocketAddr {
        let auth = warp::header::<String>("authorization");
        let routes = warp::path!("v2" / String / ..)
            .and(warp::path::tail())
            .and(warp::query::raw())
            .and(auth)
            .map(|root: String, tail: warp::path::Tail, query: String, auth: String| {
                if auth != format!("Bearer {TOKEN}") {
                    return warp::reply::with_status(warp::reply::json(&"denied"), WarpStatus::UNAUTHORIZED);
                }
                if query != "format=json" {
                    return warp::reply::with_status(warp::reply::json(&query), WarpStatus::BAD_REQUEST);
                }
                let body = match (root.as_str(), tail.as_str()) {
                    ("users;use_login=1", "games;game_keys=nfl/leagues") => {
                        fixtures::leagues_json(&[fixtures::LEAGUE_KEY])
                    }
                    ("users;use_login=1", "") => serde_json::json!({ "fantasy_content": {} }),
                    ("league", tail) if tail.ends_with("/teams") => {
                        fixtures::teams_json(&[("Alpha", "https://logo/a")])
                    }
                    _ => {
                        return warp::reply::with_status(
                            warp::reply::json(&"maintenance"),
                            WarpStatus::SERVICE_UNAVAILABLE,
                        )
                    }
                };
                warp::reply::with_status(warp::reply::json(&body), WarpStatus::OK)
            });

        let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        addr
    }

    fn client_for(addr: SocketAddr) -> YahooClient {
        let config = YahooConfig { api_base_url: format!("http://{addr}/v2"), ..YahooConfig::default() };
        YahooClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_league_key_discovery() {
        let client = client_for(spawn_fake_yahoo());
        assert_eq!(client.league_key(TOKEN).await.unwrap(), fixtures::LEAGUE_KEY);
    }

    #[tokio::test]
    async fn test_teams_returns_raw_body() {
        let client = client_for(spawn_fake_yahoo());
        let body = client.teams(TOKEN, fixtures::LEAGUE_KEY).await.unwrap();
        assert!(body.get("fantasy_content").is_some());
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_not_authenticated() {
        let client = client_for(spawn_fake_yahoo());
        let err = client.teams("stale", fixtures::LEAGUE_KEY).await.unwrap_err();
        assert!(matches!(err, FetchError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_other_failures_keep_status_and_body() {
        let client = client_for(spawn_fake_yahoo());
        let err = client.scoreboard(TOKEN, fixtures::LEAGUE_KEY, 1).await.unwrap_err();
        match err {
            FetchError::Upstream { status, url, body } => {
                assert_eq!(status, 503);
                assert!(url.ends_with("scoreboard;week=1"));
                assert!(body.contains("maintenance"));
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_verify_token() {
        let client = client_for(spawn_fake_yahoo());
        assert!(client.verify_token(TOKEN).await.unwrap());
        assert!(!client.verify_token("expired").await.unwrap());
    }
}
