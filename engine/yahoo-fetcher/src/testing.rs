//! In-memory [`LeagueDataProvider`] serving a canned season

use crate::provider::LeagueDataProvider;
use crate::FetchError;
use async_trait::async_trait;
use league_analytics::normalizer::RawSeason;
use serde_json::Value;
use std::sync::Mutex;

/// Serves the responses of a [`RawSeason`] and records every call made
#[derive(Debug)]
pub struct FixtureProvider {
    season: RawSeason,
    failing_week: Option<u32>,
    calls: Mutex<Vec<String>>,
}

impl FixtureProvider {
    /// Token every call rejects with [`FetchError::NotAuthenticated`]
    pub const REJECTED_TOKEN: &'static str = "rejected";

    pub fn new(season: RawSeason) -> Self {
        Self { season, failing_week: None, calls: Mutex::new(Vec::new()) }
    }

    /// Make the scoreboard for `week` fail with an upstream 500
    pub fn failing_week(mut self, week: u32) -> Self {
        self.failing_week = Some(week);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    fn record(&self, token: &str, call: String) -> Result<(), FetchError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        if token == Self::REJECTED_TOKEN {
            return Err(FetchError::NotAuthenticated);
        }
        Ok(())
    }
}

#[async_trait]
impl LeagueDataProvider for FixtureProvider {
    async fn league_key(&self, token: &str) -> Result<String, FetchError> {
        self.record(token, "league_key".into())?;
        Ok(self.season.league_key.clone())
    }

    async fn teams(&self, token: &str, _league_key: &str) -> Result<Value, FetchError> {
        self.record(token, "teams".into())?;
        Ok(self.season.teams.clone())
    }

    async fn standings(&self, token: &str, _league_key: &str) -> Result<Value, FetchError> {
        self.record(token, "standings".into())?;
        Ok(self.season.standings.clone())
    }

    async fn scoreboard(&self, token: &str, league_key: &str, week: u32) -> Result<Value, FetchError> {
        self.record(token, format!("scoreboard:{week}"))?;
        if self.failing_week == Some(week) {
            return Err(FetchError::Upstream {
                status: 500,
                url: format!("league/{league_key}/scoreboard;week={week}"),
                body: "internal error".into(),
            });
        }
        self.season
            .scoreboards
            .iter()
            .find(|s| s.week == week)
            .map(|s| s.body.clone())
            .ok_or_else(|| FetchError::Upstream {
                status: 404,
                url: format!("league/{league_key}/scoreboard;week={week}"),
                body: String::new(),
            })
    }

    async fn verify_token(&self, token: &str) -> Result<bool, FetchError> {
        match self.record(token, "verify_token".into()) {
            Ok(()) => Ok(true),
            Err(FetchError::NotAuthenticated) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
