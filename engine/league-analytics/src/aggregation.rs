//! # Season Aggregation
//!
//! Turns a normalized [`League`] into per-team season statistics and superlatives.
//!
//! One pass over the matchups feeds a [`TeamProfileBuilder`] per team (weekly scores,
//! projection total, and an opponent ledger); each builder is then finished into an
//! immutable [`TeamSeasonStats`].
//!
//! Opponent superlatives break ties by opponent name: the ledger is ordered
//! lexically and only a strictly greater mean replaces the current pick.

use crate::error::AnalyticsError;
use crate::model::{League, Team, WeeklyResult};
use crate::stats::{self, ordinal, round2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

type Result<T> = std::result::Result<T, AnalyticsError>;

/// What to do with a team that has fewer than two weekly scores, where the sample
/// standard deviation is undefined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SparseSamplePolicy {
    /// Keep the team and report `std_dev` as null
    #[default]
    Undefined,
    /// Leave the team out of the report and list it under `omitted`
    Omit,
}

impl FromStr for SparseSamplePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "undefined" | "null" => Ok(SparseSamplePolicy::Undefined),
            "omit" => Ok(SparseSamplePolicy::Omit),
            other => Err(format!("Unknown sparse sample policy: {other}")),
        }
    }
}

/// Whether a team beat its season projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Performance {
    Over,
    Under,
}

impl fmt::Display for Performance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Performance::Over => write!(f, "Over"),
            Performance::Under => write!(f, "Under"),
        }
    }
}

/// Season statistics and superlatives for one team
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSeasonStats {
    pub team: String,
    pub logo_url: String,
    /// Ordinal standings position, e.g. "1st"
    pub rank: String,
    /// Standings position as a number, for ordering
    #[serde(skip)]
    pub rank_position: u32,
    /// "{wins}-{losses}-{ties}"
    pub record: String,
    pub games_played: u32,
    /// Standings points-for per game, 2 decimals
    pub avg_points: f64,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; null with fewer than two scores
    pub std_dev: Option<f64>,
    pub max: f64,
    pub min: f64,
    /// Weekly scores in week order
    pub scores: Vec<f64>,
    pub total_points: f64,
    pub total_projected_points: f64,
    pub bbq_chicken: String,
    pub bbq_chicken_avg_points: f64,
    pub nemesis: String,
    pub nemesis_avg_points: f64,
    /// Magnitude of the deviation from projection, in percent
    pub percentage_improvement: f64,
    pub over_under_performer: Performance,
}

/// The per-team "wrapped" view exposed to the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WrappedSummary {
    pub team: String,
    pub logo_url: String,
    pub rank: String,
    pub record: String,
    pub avg_points: f64,
    /// Where this team's average sits among all reported teams
    pub avg_points_rank: String,
    pub bbq_chicken: String,
    pub bbq_chicken_avg_points: f64,
    pub nemesis: String,
    pub nemesis_avg_points: f64,
    pub percentage_improvement: f64,
    pub over_under_performer: Performance,
}

/// Output of one aggregation run
#[derive(Debug, Clone, Serialize)]
pub struct SeasonReport {
    pub league_key: String,
    pub weeks_completed: u32,
    pub policy: SparseSamplePolicy,
    pub teams: BTreeMap<String, TeamSeasonStats>,
    /// Teams dropped under [`SparseSamplePolicy::Omit`]
    pub omitted: Vec<String>,
}

impl SeasonReport {
    /// Build the wrapped summary for one team
    pub fn wrapped(&self, team: &str) -> Option<WrappedSummary> {
        let stats = self.teams.get(team)?;
        let better = self.teams.values().filter(|t| t.avg_points > stats.avg_points).count();

        Some(WrappedSummary {
            team: stats.team.clone(),
            logo_url: stats.logo_url.clone(),
            rank: stats.rank.clone(),
            record: stats.record.clone(),
            avg_points: stats.avg_points,
            avg_points_rank: ordinal(better as u32 + 1),
            bbq_chicken: stats.bbq_chicken.clone(),
            bbq_chicken_avg_points: stats.bbq_chicken_avg_points,
            nemesis: stats.nemesis.clone(),
            nemesis_avg_points: stats.nemesis_avg_points,
            percentage_improvement: stats.percentage_improvement,
            over_under_performer: stats.over_under_performer,
        })
    }
}

/// Points scored for and against one specific opponent
#[derive(Debug, Default)]
struct OpponentLedger {
    points_for: Vec<f64>,
    points_against: Vec<f64>,
}

/// Accumulates one team's season while walking the matchups
#[derive(Debug)]
pub struct TeamProfileBuilder<'a> {
    team: &'a Team,
    scores: Vec<(u32, f64)>,
    total_projected: f64,
    opponents: BTreeMap<String, OpponentLedger>,
}

impl<'a> TeamProfileBuilder<'a> {
    pub fn new(team: &'a Team) -> Self {
        Self { team, scores: Vec::new(), total_projected: 0.0, opponents: BTreeMap::new() }
    }

    /// Fold in one game: this team's result and what the opponent scored.
    pub fn record(&mut self, result: &WeeklyResult, opponent_points: f64) {
        self.scores.push((result.week, result.points));
        self.total_projected += result.projected_points;

        let ledger = self.opponents.entry(result.opponent.clone()).or_default();
        ledger.points_for.push(result.points);
        ledger.points_against.push(opponent_points);
    }

    pub fn sample_count(&self) -> usize {
        self.scores.len()
    }

    /// Check the season against the standings record
    pub fn validate(&self) -> Result<()> {
        let games = self.team.record.games_played();
        if self.scores.is_empty() || games == 0 {
            return Err(AnalyticsError::NoGamesPlayed { team: self.team.name.clone() });
        }
        if self.scores.len() != games as usize {
            return Err(AnalyticsError::RecordMismatch {
                team: self.team.name.clone(),
                expected: games,
                actual: self.scores.len(),
            });
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<TeamSeasonStats> {
        self.validate()?;

        self.scores.sort_by_key(|(week, _)| *week);
        let scores: Vec<f64> = self.scores.iter().map(|(_, points)| *points).collect();
        let name = &self.team.name;
        let no_games = || AnalyticsError::NoGamesPlayed { team: name.clone() };

        let (bbq_chicken, bbq_avg) =
            best_opponent(&self.opponents, |l| &l.points_for).ok_or_else(no_games)?;
        let (nemesis, nemesis_avg) =
            best_opponent(&self.opponents, |l| &l.points_against).ok_or_else(no_games)?;

        if self.total_projected <= 0.0 {
            return Err(AnalyticsError::MissingProjection { team: name.clone() });
        }
        let total_points: f64 = scores.iter().sum();
        let signed = round2((total_points / self.total_projected - 1.0) * 100.0);
        let over_under_performer = if signed > 0.0 { Performance::Over } else { Performance::Under };

        let games_played = self.team.record.games_played();

        Ok(TeamSeasonStats {
            team: name.clone(),
            logo_url: self.team.logo_url.clone(),
            rank: ordinal(self.team.rank),
            rank_position: self.team.rank,
            record: self.team.record.to_string(),
            games_played,
            avg_points: round2(self.team.points_for / games_played as f64),
            mean: stats::mean(&scores).ok_or_else(no_games)?,
            median: stats::median(&scores).ok_or_else(no_games)?,
            std_dev: stats::sample_std_dev(&scores),
            max: stats::max(&scores).ok_or_else(no_games)?,
            min: stats::min(&scores).ok_or_else(no_games)?,
            total_points,
            total_projected_points: self.total_projected,
            bbq_chicken,
            bbq_chicken_avg_points: round2(bbq_avg),
            nemesis,
            nemesis_avg_points: round2(nemesis_avg),
            percentage_improvement: signed.abs(),
            over_under_performer,
            scores,
        })
    }
}

/// Opponent with the highest mean of the selected series; lexically first on ties.
fn best_opponent<F>(opponents: &BTreeMap<String, OpponentLedger>, select: F) -> Option<(String, f64)>
where
    F: Fn(&OpponentLedger) -> &Vec<f64>,
{
    let mut best: Option<(&String, f64)> = None;
    for (name, ledger) in opponents {
        let Some(avg) = stats::mean(select(ledger)) else {
            continue;
        };
        match best {
            Some((_, current)) if avg <= current => {}
            _ => best = Some((name, avg)),
        }
    }
    best.map(|(name, avg)| (name.clone(), avg))
}

/// Season aggregation engine
#[derive(Debug, Clone, Default)]
pub struct SeasonAggregator {
    policy: SparseSamplePolicy,
}

impl SeasonAggregator {
    pub fn new(policy: SparseSamplePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> SparseSamplePolicy {
        self.policy
    }

    /// Compute statistics for every team in the league
    pub fn aggregate(&self, league: &League) -> Result<SeasonReport> {
        let mut builders: BTreeMap<&str, TeamProfileBuilder> =
            league.teams.iter().map(|(name, team)| (name.as_str(), TeamProfileBuilder::new(team))).collect();

        for matchup in &league.matchups {
            for (result, opponent) in matchup.perspectives() {
                if !league.teams.contains_key(&result.opponent) {
                    return Err(AnalyticsError::UnknownTeam {
                        name: result.opponent.clone(),
                        context: format!("week {} opponent of '{}'", result.week, result.team),
                    });
                }
                let builder = builders.get_mut(result.team.as_str()).ok_or_else(|| {
                    AnalyticsError::UnknownTeam {
                        name: result.team.clone(),
                        context: format!("week {} matchup", result.week),
                    }
                })?;
                builder.record(result, opponent.points);
            }
        }

        let mut teams = BTreeMap::new();
        let mut omitted = Vec::new();
        for (name, builder) in builders {
            builder.validate()?;
            if builder.sample_count() < 2 && self.policy == SparseSamplePolicy::Omit {
                tracing::debug!("Omitting {} with {} weekly score(s)", name, builder.sample_count());
                omitted.push(name.to_string());
                continue;
            }
            teams.insert(name.to_string(), builder.finish()?);
        }

        tracing::info!(
            "Aggregated {} teams over {} weeks ({} omitted)",
            teams.len(),
            league.weeks_completed(),
            omitted.len()
        );

        Ok(SeasonReport {
            league_key: league.league_key.clone(),
            weeks_completed: league.weeks_completed(),
            policy: self.policy,
            teams,
            omitted,
        })
    }
}
