//! Typed decoding of Yahoo Fantasy Sports v2 JSON responses.
//!
//! The provider wraps everything in `fantasy_content`, encodes collections as objects keyed
//! `"0"`, `"1"`, ... next to a `"count"` key, and splits each resource across a JSON array
//! of fragments (`[{"team_key": ..}, {"name": ..}, [], {"team_logos": ..}]`). Fragments are
//! merged by key before decoding, so field position never matters.

use crate::error::AnalyticsError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::{
    deserialize_number_from_string, deserialize_option_number_from_string,
};
use serde_json::{Map, Value};

type Result<T> = std::result::Result<T, AnalyticsError>;

/// Team name and logo from the league's team list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    pub logo_url: String,
}

/// One row of the league standings
#[derive(Debug, Clone, PartialEq)]
pub struct StandingsEntry {
    pub name: String,
    pub rank: u32,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub points_for: f64,
}

/// Standings plus the league's current (in-progress) week
#[derive(Debug, Clone, PartialEq)]
pub struct StandingsSnapshot {
    pub league_key: Option<String>,
    pub current_week: u32,
    pub teams: Vec<StandingsEntry>,
}

/// One team's line in a scoreboard matchup
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreboardSide {
    pub name: String,
    pub points: Option<f64>,
    pub projected_points: Option<f64>,
}

/// A scoreboard matchup as reported, before pairing validation
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreboardMatchup {
    pub week: Option<u32>,
    /// "preevent", "midevent", or "postevent"
    pub status: Option<String>,
    pub is_playoffs: bool,
    pub is_consolation: bool,
    pub sides: Vec<ScoreboardSide>,
}

impl ScoreboardMatchup {
    /// Playoff and consolation games are not part of the standings record
    pub fn is_regular_season(&self) -> bool {
        !self.is_playoffs && !self.is_consolation
    }

    pub fn is_final(&self) -> bool {
        self.status.as_deref().map_or(true, |status| status == "postevent")
    }
}

#[derive(Debug, Deserialize)]
struct LeagueResource {
    league_key: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    current_week: Option<u32>,
    teams: Option<Value>,
    standings: Option<Value>,
    scoreboard: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct TeamResource {
    name: Option<String>,
    #[serde(default)]
    team_logos: Vec<TeamLogoEntry>,
    team_points: Option<PointsTotal>,
    team_projected_points: Option<PointsTotal>,
    team_standings: Option<TeamStandings>,
}

#[derive(Debug, Deserialize)]
struct TeamLogoEntry {
    team_logo: TeamLogo,
}

#[derive(Debug, Deserialize)]
struct TeamLogo {
    url: String,
}

#[derive(Debug, Deserialize)]
struct PointsTotal {
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    total: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TeamStandings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    rank: u32,
    outcome_totals: OutcomeTotals,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    points_for: f64,
}

#[derive(Debug, Deserialize)]
struct OutcomeTotals {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    wins: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    losses: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    ties: u32,
}

#[derive(Debug, Deserialize)]
struct MatchupResource {
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    week: Option<u32>,
    status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    is_playoffs: Option<u8>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    is_consolation: Option<u8>,
}

/// Decode the `league/{key}/teams` response
pub fn decode_teams(body: &Value) -> Result<Vec<RosterEntry>> {
    let league = league_resource(body, "teams response")?;
    let teams = league.teams.ok_or_else(|| AnalyticsError::missing("teams response", "teams"))?;

    indexed(&teams, "teams collection")?
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            let context = format!("teams entry {i}");
            let team = team_resource(entry, &context)?;
            let name = team.name.ok_or_else(|| AnalyticsError::missing(&context, "name"))?;
            let logo_url = team
                .team_logos
                .into_iter()
                .next()
                .map(|logo| logo.team_logo.url)
                .ok_or_else(|| AnalyticsError::missing(format!("team '{name}'"), "team_logos"))?;
            Ok(RosterEntry { name, logo_url })
        })
        .collect()
}

/// Decode the `league/{key}/standings` response
pub fn decode_standings(body: &Value) -> Result<StandingsSnapshot> {
    let league = league_resource(body, "standings response")?;
    let current_week = league
        .current_week
        .ok_or_else(|| AnalyticsError::missing("standings response", "current_week"))?;
    let standings = league
        .standings
        .ok_or_else(|| AnalyticsError::missing("standings response", "standings"))?;

    let merged = merge_fragments(&standings);
    let teams = merged
        .get("teams")
        .ok_or_else(|| AnalyticsError::missing("standings", "teams"))?;

    let teams = indexed(teams, "standings teams")?
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            let context = format!("standings entry {i}");
            let team = team_resource(entry, &context)?;
            let name = team.name.ok_or_else(|| AnalyticsError::missing(&context, "name"))?;
            let standing = team
                .team_standings
                .ok_or_else(|| AnalyticsError::missing(format!("team '{name}'"), "team_standings"))?;
            Ok(StandingsEntry {
                name,
                rank: standing.rank,
                wins: standing.outcome_totals.wins,
                losses: standing.outcome_totals.losses,
                ties: standing.outcome_totals.ties,
                points_for: standing.points_for,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(StandingsSnapshot { league_key: league.league_key, current_week, teams })
}

/// Decode the `league/{key}/scoreboard;week={n}` response
pub fn decode_scoreboard(body: &Value) -> Result<Vec<ScoreboardMatchup>> {
    let league = league_resource(body, "scoreboard response")?;
    let scoreboard = league
        .scoreboard
        .ok_or_else(|| AnalyticsError::missing("scoreboard response", "scoreboard"))?;

    let mut matchups = Vec::new();
    for section in indexed(&scoreboard, "scoreboard")? {
        let collection = section
            .get("matchups")
            .ok_or_else(|| AnalyticsError::missing("scoreboard", "matchups"))?;

        for (i, entry) in indexed(collection, "matchups collection")?.into_iter().enumerate() {
            let context = format!("matchup {i}");
            let matchup = entry
                .get("matchup")
                .ok_or_else(|| AnalyticsError::missing(&context, "matchup"))?;
            matchups.push(decode_matchup(matchup, &context)?);
        }
    }

    Ok(matchups)
}

/// Decode the `users;use_login=1/games;game_keys={game}/leagues` response into league keys
pub fn decode_league_keys(body: &Value) -> Result<Vec<String>> {
    let users = content(body, "leagues response")?
        .get("users")
        .ok_or_else(|| AnalyticsError::missing("leagues response", "users"))?;

    let mut keys = Vec::new();
    for user in indexed(users, "users collection")? {
        let user = merge_fragments(field(user, "user", "users entry")?);
        let Some(games) = user.get("games") else {
            continue;
        };
        for game in indexed(games, "games collection")? {
            let game = merge_fragments(field(game, "game", "games entry")?);
            let Some(leagues) = game.get("leagues") else {
                continue;
            };
            for league in indexed(leagues, "leagues collection")? {
                let league = merge_fragments(field(league, "league", "leagues entry")?);
                let key = league
                    .get("league_key")
                    .and_then(Value::as_str)
                    .ok_or_else(|| AnalyticsError::missing("leagues entry", "league_key"))?;
                keys.push(key.to_string());
            }
        }
    }

    Ok(keys)
}

fn decode_matchup(matchup: &Value, context: &str) -> Result<ScoreboardMatchup> {
    let header: MatchupResource = decode(matchup.clone(), context)?;

    // The teams collection hangs off the matchup's "0" entry
    let mut sides = Vec::new();
    for part in indexed(matchup, context)? {
        let Some(teams) = part.get("teams") else {
            continue;
        };
        for (i, entry) in indexed(teams, context)?.into_iter().enumerate() {
            let side_context = format!("{context} side {i}");
            let team = team_resource(entry, &side_context)?;
            let name = team.name.ok_or_else(|| AnalyticsError::missing(&side_context, "name"))?;
            sides.push(ScoreboardSide {
                name,
                points: team.team_points.and_then(|p| p.total),
                projected_points: team.team_projected_points.and_then(|p| p.total),
            });
        }
    }

    Ok(ScoreboardMatchup {
        week: header.week,
        status: header.status,
        is_playoffs: header.is_playoffs.unwrap_or(0) != 0,
        is_consolation: header.is_consolation.unwrap_or(0) != 0,
        sides,
    })
}

fn content<'a>(body: &'a Value, context: &str) -> Result<&'a Value> {
    field(body, "fantasy_content", context)
}

fn league_resource(body: &Value, context: &str) -> Result<LeagueResource> {
    let league = field(content(body, context)?, "league", context)?;
    decode(Value::Object(merge_fragments(league)), context)
}

fn team_resource(entry: &Value, context: &str) -> Result<TeamResource> {
    let team = field(entry, "team", context)?;
    decode(Value::Object(merge_fragments(team)), context)
}

fn field<'a>(value: &'a Value, key: &'static str, context: &str) -> Result<&'a Value> {
    value.get(key).ok_or_else(|| AnalyticsError::missing(context, key))
}

fn decode<T: DeserializeOwned>(value: Value, context: &str) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|source| AnalyticsError::Decode { context: context.to_string(), source })
}

/// Entries of a `{"0": .., "1": .., "count": n}` collection in index order
fn indexed<'a>(value: &'a Value, context: &str) -> Result<Vec<&'a Value>> {
    // Empty collections sometimes arrive as `[]`
    if let Value::Array(items) = value {
        return Ok(items.iter().collect());
    }
    let map = value
        .as_object()
        .ok_or_else(|| AnalyticsError::malformed(context, "expected an indexed collection"))?;

    let mut entries: Vec<(usize, &Value)> =
        map.iter().filter_map(|(k, v)| k.parse::<usize>().ok().map(|i| (i, v))).collect();
    entries.sort_by_key(|(i, _)| *i);
    Ok(entries.into_iter().map(|(_, v)| v).collect())
}

/// Flatten a resource split across fragment arrays into one object
fn merge_fragments(value: &Value) -> Map<String, Value> {
    let mut merged = Map::new();
    match value {
        Value::Object(obj) => merged.extend(obj.clone()),
        Value::Array(parts) => {
            for part in parts {
                match part {
                    Value::Object(obj) => merged.extend(obj.clone()),
                    Value::Array(fragments) => {
                        for fragment in fragments {
                            if let Value::Object(obj) = fragment {
                                merged.extend(obj.clone());
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }
    merged
}
