//! Normalized league model built fresh for every request.

use crate::error::AnalyticsError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Win/loss/tie totals from the league standings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Record {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl Record {
    pub fn new(wins: u32, losses: u32, ties: u32) -> Self {
        Self { wins, losses, ties }
    }

    /// Number of completed games
    pub fn games_played(&self) -> u32 {
        self.wins + self.losses + self.ties
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.wins, self.losses, self.ties)
    }
}

/// A team in the league, keyed by its display name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Team {
    pub name: String,
    pub logo_url: String,
    /// Standings position, 1 = best
    pub rank: u32,
    pub record: Record,
    /// Season points-for as reported by the standings
    pub points_for: f64,
}

/// One team's side of one week's matchup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyResult {
    pub team: String,
    pub week: u32,
    pub points: f64,
    pub projected_points: f64,
    pub opponent: String,
}

/// A head-to-head pairing; both sides reference each other and share the week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Matchup {
    week: u32,
    sides: [WeeklyResult; 2],
}

impl Matchup {
    /// Pair two results, validating that they describe the same game.
    pub fn new(first: WeeklyResult, second: WeeklyResult) -> Result<Self, AnalyticsError> {
        let week = first.week;
        if second.week != week {
            return Err(AnalyticsError::InvalidMatchup {
                week,
                reason: format!(
                    "'{}' is in week {} but '{}' is in week {}",
                    first.team, week, second.team, second.week
                ),
            });
        }
        if first.team == second.team {
            return Err(AnalyticsError::InvalidMatchup {
                week,
                reason: format!("'{}' cannot face itself", first.team),
            });
        }
        if first.opponent != second.team || second.opponent != first.team {
            return Err(AnalyticsError::InvalidMatchup {
                week,
                reason: format!(
                    "'{}' and '{}' do not reference each other as opponents",
                    first.team, second.team
                ),
            });
        }

        Ok(Self { week, sides: [first, second] })
    }

    pub fn week(&self) -> u32 {
        self.week
    }

    pub fn sides(&self) -> &[WeeklyResult; 2] {
        &self.sides
    }

    /// Each side paired with the opposing side
    pub fn perspectives(&self) -> [(&WeeklyResult, &WeeklyResult); 2] {
        [(&self.sides[0], &self.sides[1]), (&self.sides[1], &self.sides[0])]
    }
}

/// The normalized season: teams by name plus matchups ordered by week
#[derive(Debug, Clone, Serialize)]
pub struct League {
    pub league_key: String,
    /// The in-progress week; weeks `1..current_week` are complete
    pub current_week: u32,
    pub teams: BTreeMap<String, Team>,
    pub matchups: Vec<Matchup>,
}

impl League {
    pub fn weeks_completed(&self) -> u32 {
        self.current_week.saturating_sub(1)
    }

    /// All weekly results in week order
    pub fn weekly_results(&self) -> impl Iterator<Item = &WeeklyResult> {
        self.matchups.iter().flat_map(|m| m.sides().iter())
    }

    /// A team's results in week order
    pub fn results_for<'a>(&'a self, team: &'a str) -> impl Iterator<Item = &'a WeeklyResult> {
        self.weekly_results().filter(move |r| r.team == team)
    }
}
