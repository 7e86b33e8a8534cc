//! Sequential fan-out collecting everything one season computation needs

use crate::provider::LeagueDataProvider;
use crate::FetchError;
use league_analytics::normalizer::{current_week, RawScoreboard, RawSeason};
use tracing::info;

/// Fetch league key, teams, standings, then every completed week's scoreboard.
///
/// One request per week, in order; the first failure aborts the whole fetch.
pub async fn fetch_season(provider: &dyn LeagueDataProvider, token: &str) -> Result<RawSeason, FetchError> {
    let league_key = provider.league_key(token).await?;
    info!("Fetching season for league {}", league_key);

    let teams = provider.teams(token, &league_key).await?;
    let standings = provider.standings(token, &league_key).await?;
    let current = current_week(&standings)?;
    info!("League {} is in week {}", league_key, current);

    let mut scoreboards = Vec::with_capacity(current.saturating_sub(1) as usize);
    for week in 1..current {
        let body = provider.scoreboard(token, &league_key, week).await?;
        info!("Fetched week {} scoreboard for {}", week, league_key);
        scoreboards.push(RawScoreboard { week, body });
    }

    Ok(RawSeason { league_key, teams, standings, scoreboards })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FixtureProvider;
    use league_analytics::fixtures;

    #[tokio::test]
    async fn test_fetches_every_completed_week_in_order() {
        let provider = FixtureProvider::new(fixtures::demo_season());
        let raw = fetch_season(&provider, "token").await.unwrap();

        assert_eq!(raw.league_key, fixtures::LEAGUE_KEY);
        assert_eq!(raw.scoreboards.iter().map(|s| s.week).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(
            provider.calls(),
            vec!["league_key", "teams", "standings", "scoreboard:1", "scoreboard:2"]
        );
    }

    #[tokio::test]
    async fn test_first_failure_aborts() {
        let provider = FixtureProvider::new(fixtures::demo_season()).failing_week(1);
        let err = fetch_season(&provider, "token").await.unwrap_err();

        assert!(matches!(err, FetchError::Upstream { status: 500, .. }));
        assert!(!provider.calls().contains(&"scoreboard:2".to_string()));
    }

    #[tokio::test]
    async fn test_rejected_token_propagates() {
        let provider = FixtureProvider::new(fixtures::demo_season());
        let err = fetch_season(&provider, FixtureProvider::REJECTED_TOKEN).await.unwrap_err();
        assert!(matches!(err, FetchError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_week_one_league_has_no_scoreboards() {
        let mut season = fixtures::demo_season();
        season.standings = fixtures::standings_json(1, &[]);
        let provider = FixtureProvider::new(season);

        let raw = fetch_season(&provider, "token").await.unwrap();
        assert!(raw.scoreboards.is_empty());
    }
}
