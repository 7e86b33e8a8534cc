//! Request-scoped orchestration: fetch, normalize, aggregate

use crate::error::DashboardError;
use crate::session::RequestContext;
use league_analytics::normalizer::roster;
use league_analytics::{build_report, RosterEntry, SeasonReport, SparseSamplePolicy, WrappedSummary};
use std::sync::Arc;
use tracing::{info, warn};
use yahoo_fetcher::{fetch_season, LeagueDataProvider};

/// Builds every dashboard view from scratch for the calling session
#[derive(Clone)]
pub struct DashboardService {
    provider: Arc<dyn LeagueDataProvider>,
    policy: SparseSamplePolicy,
}

impl DashboardService {
    pub fn new(provider: Arc<dyn LeagueDataProvider>, policy: SparseSamplePolicy) -> Self {
        Self { provider, policy }
    }

    /// Full season report for the session's league
    pub async fn season_report(&self, ctx: &RequestContext) -> Result<SeasonReport, DashboardError> {
        let token = ctx.require_token()?;
        let raw = fetch_season(self.provider.as_ref(), token).await?;
        let report = build_report(&raw, self.policy).map_err(|e| {
            warn!("Season computation failed for {}: {}", raw.league_key, e);
            DashboardError::DataConsistency(e)
        })?;

        info!("Built season report for {} ({} teams)", report.league_key, report.teams.len());
        Ok(report)
    }

    /// Team names and logos, in provider order
    pub async fn teams(&self, ctx: &RequestContext) -> Result<Vec<RosterEntry>, DashboardError> {
        let token = ctx.require_token()?;
        let league_key = self.provider.league_key(token).await?;
        let body = self.provider.teams(token, &league_key).await?;
        Ok(roster(&body)?)
    }

    pub async fn wrapped(&self, ctx: &RequestContext, team: &str) -> Result<WrappedSummary, DashboardError> {
        let report = self.season_report(ctx).await?;
        report.wrapped(team).ok_or_else(|| DashboardError::TeamNotFound { team: team.to_string() })
    }

    /// Whether the session holds a token the provider still accepts
    pub async fn token_is_valid(&self, ctx: &RequestContext) -> Result<bool, DashboardError> {
        let Ok(token) = ctx.require_token() else {
            return Ok(false);
        };
        Ok(self.provider.verify_token(token).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use league_analytics::fixtures;
    use yahoo_fetcher::testing::FixtureProvider;
    use yahoo_fetcher::SessionToken;

    fn ctx(token: &str) -> RequestContext {
        RequestContext { session_id: None, token: Some(SessionToken::new(token, Some(Duration::hours(1)))) }
    }

    fn service(policy: SparseSamplePolicy) -> DashboardService {
        DashboardService::new(Arc::new(FixtureProvider::new(fixtures::demo_season())), policy)
    }

    #[tokio::test]
    async fn test_report_requires_a_token() {
        let err = service(SparseSamplePolicy::Undefined)
            .season_report(&RequestContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_report_from_provider() {
        let report = service(SparseSamplePolicy::Undefined).season_report(&ctx("t")).await.unwrap();
        assert_eq!(report.teams.len(), 4);
        assert_eq!(report.teams["Alpha"].bbq_chicken, "Charlie");
    }

    #[tokio::test]
    async fn test_teams_in_provider_order() {
        let teams = service(SparseSamplePolicy::Undefined).teams(&ctx("t")).await.unwrap();
        let names: Vec<_> = teams.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Bravo", "Charlie", "Delta"]);
    }

    #[tokio::test]
    async fn test_wrapped_unknown_team() {
        let err = service(SparseSamplePolicy::Undefined).wrapped(&ctx("t"), "Zulu").await.unwrap_err();
        assert!(matches!(err, DashboardError::TeamNotFound { ref team } if team == "Zulu"));
    }

    #[tokio::test]
    async fn test_inconsistent_data_is_reported_as_such() {
        let mut season = fixtures::demo_season();
        // Week 2 request answered with the week 1 scoreboard
        season.scoreboards[1].body = season.scoreboards[0].body.clone();
        let service = DashboardService::new(Arc::new(FixtureProvider::new(season)), SparseSamplePolicy::Undefined);

        let err = service.season_report(&ctx("t")).await.unwrap_err();
        assert_eq!(err.code(), "DATA_CONSISTENCY");
        assert_eq!(err.status(), warp::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_passed_through() {
        let provider = FixtureProvider::new(fixtures::demo_season()).failing_week(2);
        let service = DashboardService::new(Arc::new(provider), SparseSamplePolicy::Undefined);

        let err = service.season_report(&ctx("t")).await.unwrap_err();
        assert_eq!(err.code(), "UPSTREAM_ERROR");
    }

    #[tokio::test]
    async fn test_token_validity() {
        let service = service(SparseSamplePolicy::Undefined);
        assert!(service.token_is_valid(&ctx("t")).await.unwrap());
        assert!(!service.token_is_valid(&ctx(FixtureProvider::REJECTED_TOKEN)).await.unwrap());
        assert!(!service.token_is_valid(&RequestContext::default()).await.unwrap());
    }
}
