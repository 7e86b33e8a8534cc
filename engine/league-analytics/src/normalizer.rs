//! # League Data Normalizer
//!
//! Joins the team list, standings, and per-week scoreboards (by team name) into the flat
//! [`League`] model. Pure transform: the raw responses are fetched elsewhere.

use crate::error::AnalyticsError;
use crate::model::{League, Matchup, Record, Team, WeeklyResult};
use crate::yahoo::{self, RosterEntry, ScoreboardMatchup, ScoreboardSide};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

type Result<T> = std::result::Result<T, AnalyticsError>;

/// One scoreboard response and the week it was requested for
#[derive(Debug, Clone)]
pub struct RawScoreboard {
    pub week: u32,
    pub body: Value,
}

/// Every provider response needed for one season computation
#[derive(Debug, Clone)]
pub struct RawSeason {
    pub league_key: String,
    pub teams: Value,
    pub standings: Value,
    pub scoreboards: Vec<RawScoreboard>,
}

/// Team names and logos, in provider order
pub fn roster(teams: &Value) -> Result<Vec<RosterEntry>> {
    yahoo::decode_teams(teams)
}

/// The in-progress week reported by the standings
pub fn current_week(standings: &Value) -> Result<u32> {
    Ok(yahoo::decode_standings(standings)?.current_week)
}

/// The first league the logged-in user belongs to
pub fn first_league_key(leagues: &Value) -> Result<String> {
    yahoo::decode_league_keys(leagues)?.into_iter().next().ok_or(AnalyticsError::NoLeagues)
}

/// Build the normalized league model from raw provider responses.
pub fn normalize(raw: &RawSeason) -> Result<League> {
    let mut logos = BTreeMap::new();
    for entry in roster(&raw.teams)? {
        if logos.insert(entry.name.clone(), entry.logo_url).is_some() {
            return Err(AnalyticsError::DuplicateTeam { name: entry.name });
        }
    }

    let standings = yahoo::decode_standings(&raw.standings)?;
    let mut teams = BTreeMap::new();
    for row in standings.teams {
        let logo_url = logos.get(&row.name).cloned().ok_or_else(|| {
            AnalyticsError::UnknownTeam { name: row.name.clone(), context: "standings".into() }
        })?;
        teams.insert(
            row.name.clone(),
            Team {
                name: row.name,
                logo_url,
                rank: row.rank,
                record: Record::new(row.wins, row.losses, row.ties),
                points_for: row.points_for,
            },
        );
    }
    if let Some(missing) = logos.keys().find(|name| !teams.contains_key(*name)) {
        return Err(AnalyticsError::missing(format!("standings for team '{missing}'"), "team_standings"));
    }

    let current_week = standings.current_week;
    let matchups = collect_matchups(&raw.scoreboards, current_week, &teams)?;

    tracing::debug!(
        "Normalized league {}: {} teams, {} matchups through week {}",
        raw.league_key,
        teams.len(),
        matchups.len(),
        current_week.saturating_sub(1)
    );

    Ok(League { league_key: raw.league_key.clone(), current_week, teams, matchups })
}

fn collect_matchups(
    scoreboards: &[RawScoreboard],
    current_week: u32,
    teams: &BTreeMap<String, Team>,
) -> Result<Vec<Matchup>> {
    let mut by_week: BTreeMap<u32, &RawScoreboard> = BTreeMap::new();
    for scoreboard in scoreboards {
        if scoreboard.week == 0 || scoreboard.week >= current_week {
            return Err(AnalyticsError::InvalidMatchup {
                week: scoreboard.week,
                reason: format!("week is outside the completed range 1..{current_week}"),
            });
        }
        if by_week.insert(scoreboard.week, scoreboard).is_some() {
            return Err(AnalyticsError::InvalidMatchup {
                week: scoreboard.week,
                reason: "scoreboard supplied more than once".into(),
            });
        }
    }

    let mut matchups = Vec::new();
    let mut postseason = 0;
    for week in 1..current_week {
        let scoreboard = by_week.get(&week).ok_or(AnalyticsError::MissingScoreboard { week })?;
        let mut seen = BTreeSet::new();

        for (i, matchup) in yahoo::decode_scoreboard(&scoreboard.body)?.iter().enumerate() {
            // Standings records only count the regular season
            if !matchup.is_regular_season() {
                postseason += 1;
                continue;
            }
            let matchup = pair_sides(week, i, matchup, teams)?;
            for side in matchup.sides() {
                if !seen.insert(side.team.clone()) {
                    return Err(AnalyticsError::InvalidMatchup {
                        week,
                        reason: format!("'{}' appears in more than one matchup", side.team),
                    });
                }
            }
            matchups.push(matchup);
        }
    }

    if postseason > 0 {
        tracing::debug!("Skipped {} playoff/consolation matchups", postseason);
    }

    Ok(matchups)
}

fn pair_sides(
    week: u32,
    index: usize,
    matchup: &ScoreboardMatchup,
    teams: &BTreeMap<String, Team>,
) -> Result<Matchup> {
    if let Some(reported) = matchup.week {
        if reported != week {
            return Err(AnalyticsError::InvalidMatchup {
                week,
                reason: format!("matchup {index} reports week {reported}"),
            });
        }
    }

    if !matchup.is_final() {
        return Err(AnalyticsError::InvalidMatchup {
            week,
            reason: format!(
                "matchup {index} is still '{}' in a completed week",
                matchup.status.as_deref().unwrap_or_default()
            ),
        });
    }

    let [first, second] = matchup.sides.as_slice() else {
        return Err(AnalyticsError::InvalidMatchup {
            week,
            reason: format!("matchup {index} has {} sides, expected 2", matchup.sides.len()),
        });
    };

    let context = format!("week {week} matchup {index}");
    let first_result = weekly_result(week, first, second, &context, teams)?;
    let second_result = weekly_result(week, second, first, &context, teams)?;
    Matchup::new(first_result, second_result)
}

fn weekly_result(
    week: u32,
    side: &ScoreboardSide,
    opponent: &ScoreboardSide,
    context: &str,
    teams: &BTreeMap<String, Team>,
) -> Result<WeeklyResult> {
    if !teams.contains_key(&side.name) {
        return Err(AnalyticsError::UnknownTeam { name: side.name.clone(), context: context.into() });
    }

    let side_context = format!("{context} ('{}')", side.name);
    let points =
        side.points.ok_or_else(|| AnalyticsError::missing(&side_context, "team_points"))?;
    let projected_points = side
        .projected_points
        .ok_or_else(|| AnalyticsError::missing(&side_context, "team_projected_points"))?;

    if points < 0.0 || projected_points < 0.0 {
        return Err(AnalyticsError::InvalidMatchup {
            week,
            reason: format!("{side_context} has a negative score"),
        });
    }

    Ok(WeeklyResult {
        team: side.name.clone(),
        week,
        points,
        projected_points,
        opponent: opponent.name.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, Bracket, Side, Standing};

    fn four_team_season() -> RawSeason {
        let names = ["Alpha", "Bravo", "Charlie", "Delta"];
        let logos: Vec<String> = names.iter().map(|n| fixtures::logo_for(n)).collect();
        let roster: Vec<(&str, &str)> =
            names.iter().zip(logos.iter()).map(|(n, l)| (*n, l.as_str())).collect();

        RawSeason {
            league_key: fixtures::LEAGUE_KEY.to_string(),
            teams: fixtures::teams_json(&roster),
            standings: fixtures::standings_json(
                3,
                &[
                    Standing::new("Alpha", 1, (2, 0, 0), 220.0),
                    Standing::new("Bravo", 2, (1, 1, 0), 220.0),
                    Standing::new("Charlie", 3, (1, 1, 0), 180.0),
                    Standing::new("Delta", 4, (0, 2, 0), 170.0),
                ],
            ),
            scoreboards: vec![
                RawScoreboard {
                    week: 1,
                    body: fixtures::scoreboard_json(
                        1,
                        &[
                            (Side::new("Alpha", 100.0, 100.0), Side::new("Bravo", 90.0, 95.0)),
                            (Side::new("Charlie", 85.0, 90.0), Side::new("Delta", 80.0, 88.0)),
                        ],
                    ),
                },
                RawScoreboard {
                    week: 2,
                    body: fixtures::scoreboard_json(
                        2,
                        &[
                            (Side::new("Alpha", 120.0, 100.0), Side::new("Charlie", 95.0, 92.0)),
                            (Side::new("Bravo", 130.0, 101.0), Side::new("Delta", 90.0, 87.0)),
                        ],
                    ),
                },
            ],
        }
    }

    #[test]
    fn test_normalize_builds_teams_and_matchups() {
        let league = normalize(&four_team_season()).unwrap();

        assert_eq!(league.current_week, 3);
        assert_eq!(league.weeks_completed(), 2);
        assert_eq!(league.teams.len(), 4);
        assert_eq!(league.matchups.len(), 4);

        let alpha = &league.teams["Alpha"];
        assert_eq!(alpha.rank, 1);
        assert_eq!(alpha.record, Record::new(2, 0, 0));
        assert_eq!(alpha.logo_url, fixtures::logo_for("Alpha"));

        let weeks: Vec<u32> = league.matchups.iter().map(Matchup::week).collect();
        assert_eq!(weeks, vec![1, 1, 2, 2]);

        let alpha_results: Vec<&WeeklyResult> = league.results_for("Alpha").collect();
        assert_eq!(alpha_results.len(), 2);
        assert_eq!(alpha_results[0].opponent, "Bravo");
        assert_eq!(alpha_results[1].opponent, "Charlie");
        assert_eq!(alpha_results[1].points, 120.0);
        assert_eq!(alpha_results[1].projected_points, 100.0);
    }

    #[test]
    fn test_every_result_references_a_known_opponent() {
        let league = normalize(&four_team_season()).unwrap();
        for result in league.weekly_results() {
            assert!(league.teams.contains_key(&result.opponent));
            assert_ne!(result.team, result.opponent);
        }
    }

    #[test]
    fn test_scoreboard_order_does_not_matter() {
        let mut raw = four_team_season();
        raw.scoreboards.reverse();
        let league = normalize(&raw).unwrap();
        assert_eq!(league.matchups[0].week(), 1);
    }

    #[test]
    fn test_unknown_scoreboard_team_is_rejected() {
        let mut raw = four_team_season();
        raw.scoreboards[1].body = fixtures::scoreboard_json(
            2,
            &[
                (Side::new("Alpha", 120.0, 100.0), Side::new("Echo", 95.0, 92.0)),
                (Side::new("Bravo", 130.0, 101.0), Side::new("Delta", 90.0, 87.0)),
            ],
        );

        let err = normalize(&raw).unwrap_err();
        match err {
            AnalyticsError::UnknownTeam { name, .. } => assert_eq!(name, "Echo"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_projection_is_a_consistency_error() {
        let mut raw = four_team_season();
        raw.scoreboards[0].body = fixtures::scoreboard_json(
            1,
            &[
                (Side::new("Alpha", 100.0, 100.0), Side::new("Bravo", 90.0, 0.0).without_projection()),
                (Side::new("Charlie", 85.0, 90.0), Side::new("Delta", 80.0, 88.0)),
            ],
        );

        let err = normalize(&raw).unwrap_err();
        assert!(matches!(err, AnalyticsError::MissingField { field: "team_projected_points", .. }));
    }

    #[test]
    fn test_missing_points_is_a_consistency_error() {
        let mut raw = four_team_season();
        raw.scoreboards[1].body = fixtures::scoreboard_json(
            2,
            &[
                (Side::new("Alpha", 120.0, 100.0), Side::new("Charlie", 95.0, 92.0).without_points()),
                (Side::new("Bravo", 130.0, 101.0), Side::new("Delta", 90.0, 87.0)),
            ],
        );

        let err = normalize(&raw).unwrap_err();
        match err {
            AnalyticsError::MissingField { context, field } => {
                assert_eq!(field, "team_points");
                assert!(context.contains("Charlie"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_opponent_name_is_a_consistency_error() {
        let mut raw = four_team_season();
        raw.scoreboards[0]
            .body
            .pointer_mut("/fantasy_content/league/1/scoreboard/0/matchups/0/matchup/0/teams/1/team/0/2")
            .and_then(Value::as_object_mut)
            .unwrap()
            .remove("name");

        let err = normalize(&raw).unwrap_err();
        assert!(matches!(err, AnalyticsError::MissingField { field: "name", .. }));
    }

    #[test]
    fn test_playoff_and_consolation_weeks_are_left_out() {
        let mut raw = four_team_season();
        raw.standings = fixtures::standings_json(
            4,
            &[
                Standing::new("Alpha", 1, (2, 0, 0), 220.0),
                Standing::new("Bravo", 2, (1, 1, 0), 220.0),
                Standing::new("Charlie", 3, (1, 1, 0), 180.0),
                Standing::new("Delta", 4, (0, 2, 0), 170.0),
            ],
        );
        raw.scoreboards.push(RawScoreboard {
            week: 3,
            body: fixtures::bracket_scoreboard_json(
                3,
                &[
                    (Side::new("Alpha", 140.0, 110.0), Side::new("Bravo", 100.0, 105.0), Bracket::Playoffs),
                    (Side::new("Charlie", 70.0, 95.0), Side::new("Delta", 75.0, 90.0), Bracket::Consolation),
                ],
            ),
        });

        let league = normalize(&raw).unwrap();
        assert_eq!(league.current_week, 4);
        assert_eq!(league.matchups.len(), 4);
        assert!(league.matchups.iter().all(|m| m.week() < 3));
        assert_eq!(league.results_for("Alpha").count(), 2);
    }

    #[test]
    fn test_unfinished_matchup_in_completed_week_is_rejected() {
        let mut raw = four_team_season();
        *raw.scoreboards[1]
            .body
            .pointer_mut("/fantasy_content/league/1/scoreboard/0/matchups/1/matchup/status")
            .unwrap() = Value::from("midevent");

        let err = normalize(&raw).unwrap_err();
        match err {
            AnalyticsError::InvalidMatchup { week, reason } => {
                assert_eq!(week, 2);
                assert!(reason.contains("midevent"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_week_is_rejected() {
        let mut raw = four_team_season();
        raw.scoreboards.remove(0);
        let err = normalize(&raw).unwrap_err();
        assert!(matches!(err, AnalyticsError::MissingScoreboard { week: 1 }));
    }

    #[test]
    fn test_current_week_scoreboard_is_out_of_range() {
        let mut raw = four_team_season();
        raw.scoreboards.push(RawScoreboard {
            week: 3,
            body: fixtures::scoreboard_json(3, &[]),
        });
        let err = normalize(&raw).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidMatchup { week: 3, .. }));
    }

    #[test]
    fn test_team_playing_twice_in_a_week_is_rejected() {
        let mut raw = four_team_season();
        raw.scoreboards[0].body = fixtures::scoreboard_json(
            1,
            &[
                (Side::new("Alpha", 100.0, 100.0), Side::new("Bravo", 90.0, 95.0)),
                (Side::new("Alpha", 85.0, 90.0), Side::new("Delta", 80.0, 88.0)),
            ],
        );
        let err = normalize(&raw).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidMatchup { week: 1, .. }));
    }

    #[test]
    fn test_three_sided_matchup_is_rejected() {
        let mut raw = four_team_season();
        let body = &mut raw.scoreboards[0].body;
        let extra = body
            .pointer("/fantasy_content/league/1/scoreboard/0/matchups/1/matchup/0/teams/0")
            .cloned()
            .unwrap();
        body.pointer_mut("/fantasy_content/league/1/scoreboard/0/matchups/0/matchup/0/teams")
            .and_then(Value::as_object_mut)
            .unwrap()
            .insert("2".into(), extra);

        let err = normalize(&raw).unwrap_err();
        match err {
            AnalyticsError::InvalidMatchup { week, reason } => {
                assert_eq!(week, 1);
                assert!(reason.contains("3 sides"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_standings_team_missing_from_roster() {
        let mut raw = four_team_season();
        raw.teams = fixtures::teams_json(&[("Alpha", "a"), ("Bravo", "b"), ("Charlie", "c")]);
        let err = normalize(&raw).unwrap_err();
        assert!(matches!(err, AnalyticsError::UnknownTeam { .. }));
    }

    #[test]
    fn test_duplicate_roster_names_are_rejected() {
        let mut raw = four_team_season();
        raw.teams = fixtures::teams_json(&[("Alpha", "a"), ("Alpha", "b")]);
        let err = normalize(&raw).unwrap_err();
        assert!(matches!(err, AnalyticsError::DuplicateTeam { .. }));
    }

    #[test]
    fn test_helpers() {
        let raw = four_team_season();
        assert_eq!(current_week(&raw.standings).unwrap(), 3);
        assert_eq!(roster(&raw.teams).unwrap().len(), 4);
    }
}
