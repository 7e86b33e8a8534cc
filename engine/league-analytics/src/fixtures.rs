//! Builders for provider-shaped JSON used in tests.

use crate::normalizer::{RawScoreboard, RawSeason};
use serde_json::{json, Map, Value};

pub const LEAGUE_KEY: &str = "449.l.424242";

/// One side of a scoreboard matchup
#[derive(Debug, Clone)]
pub struct Side {
    pub name: String,
    pub points: Option<f64>,
    pub projected: Option<f64>,
}

impl Side {
    pub fn new(name: &str, points: f64, projected: f64) -> Self {
        Self { name: name.to_string(), points: Some(points), projected: Some(projected) }
    }

    pub fn without_points(mut self) -> Self {
        self.points = None;
        self
    }

    pub fn without_projection(mut self) -> Self {
        self.projected = None;
        self
    }
}

/// Which bracket a scoreboard matchup belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket {
    Regular,
    Playoffs,
    Consolation,
}

/// One standings row
#[derive(Debug, Clone)]
pub struct Standing {
    pub name: String,
    pub rank: u32,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub points_for: f64,
}

impl Standing {
    pub fn new(name: &str, rank: u32, (wins, losses, ties): (u32, u32, u32), points_for: f64) -> Self {
        Self { name: name.to_string(), rank, wins, losses, ties, points_for }
    }
}

fn team_meta(index: usize, name: &str, logo_url: &str) -> Value {
    json!([
        { "team_key": format!("{}.t.{}", LEAGUE_KEY, index + 1) },
        { "team_id": (index + 1).to_string() },
        { "name": name },
        [],
        { "url": format!("https://football.fantasysports.yahoo.com/f1/424242/{}", index + 1) },
        { "team_logos": [{ "team_logo": { "size": "large", "url": logo_url } }] }
    ])
}

fn collection(entries: Vec<Value>) -> Value {
    let mut map = Map::new();
    let count = entries.len();
    for (i, entry) in entries.into_iter().enumerate() {
        map.insert(i.to_string(), entry);
    }
    map.insert("count".to_string(), json!(count));
    Value::Object(map)
}

pub fn logo_for(name: &str) -> String {
    format!("https://s.yimg.com/logos/{}.png", name.to_lowercase().replace(' ', "-"))
}

/// `league/{key}/teams`
pub fn teams_json(teams: &[(&str, &str)]) -> Value {
    let entries = teams
        .iter()
        .enumerate()
        .map(|(i, (name, logo))| json!({ "team": [team_meta(i, name, logo)] }))
        .collect();

    json!({
        "fantasy_content": {
            "league": [
                { "league_key": LEAGUE_KEY, "name": "Test League" },
                { "teams": collection(entries) }
            ]
        }
    })
}

/// `league/{key}/standings`; points are encoded as strings the way the provider sends them
pub fn standings_json(current_week: u32, rows: &[Standing]) -> Value {
    let entries = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            json!({ "team": [
                team_meta(i, &row.name, &logo_for(&row.name)),
                { "team_points": { "coverage_type": "season", "total": format!("{:.2}", row.points_for) } },
                { "team_standings": {
                    "rank": row.rank,
                    "outcome_totals": {
                        "wins": row.wins.to_string(),
                        "losses": row.losses.to_string(),
                        "ties": row.ties,
                        "percentage": ".500"
                    },
                    "points_for": format!("{:.2}", row.points_for),
                    "points_against": 0
                } }
            ] })
        })
        .collect();

    json!({
        "fantasy_content": {
            "league": [
                { "league_key": LEAGUE_KEY, "current_week": current_week },
                { "standings": [{ "teams": collection(entries) }] }
            ]
        }
    })
}

/// `league/{key}/scoreboard;week={week}` with regular-season matchups only
pub fn scoreboard_json(week: u32, matchups: &[(Side, Side)]) -> Value {
    let tagged: Vec<(Side, Side, Bracket)> =
        matchups.iter().map(|(home, away)| (home.clone(), away.clone(), Bracket::Regular)).collect();
    bracket_scoreboard_json(week, &tagged)
}

/// `league/{key}/scoreboard;week={week}` with each matchup tagged by bracket
pub fn bracket_scoreboard_json(week: u32, matchups: &[(Side, Side, Bracket)]) -> Value {
    let entries = matchups
        .iter()
        .map(|(home, away, bracket)| {
            let sides = [home, away]
                .iter()
                .enumerate()
                .map(|(i, side)| {
                    let mut stats = Map::new();
                    if let Some(points) = side.points {
                        stats.insert(
                            "team_points".into(),
                            json!({ "coverage_type": "week", "week": week.to_string(), "total": format!("{:.2}", points) }),
                        );
                    }
                    if let Some(projected) = side.projected {
                        stats.insert(
                            "team_projected_points".into(),
                            json!({ "coverage_type": "week", "week": week.to_string(), "total": format!("{:.2}", projected) }),
                        );
                    }
                    json!({ "team": [team_meta(i, &side.name, &logo_for(&side.name)), Value::Object(stats)] })
                })
                .collect();

            let flag = |b: Bracket| if *bracket == b { "1" } else { "0" };
            json!({ "matchup": {
                "week": week.to_string(),
                "status": "postevent",
                "is_playoffs": flag(Bracket::Playoffs),
                "is_consolation": flag(Bracket::Consolation),
                "is_tied": 0,
                "0": { "teams": collection(sides) }
            } })
        })
        .collect();

    json!({
        "fantasy_content": {
            "league": [
                { "league_key": LEAGUE_KEY, "current_week": week + 1 },
                { "scoreboard": { "0": { "matchups": collection(entries) }, "week": week.to_string() } }
            ]
        }
    })
}

/// Four teams, two completed weeks, current week 3.
///
/// | week | matchup                          |
/// |------|----------------------------------|
/// | 1    | Alpha 100 (100) v Bravo 90 (95)  |
/// | 1    | Charlie 85 (90) v Delta 80 (88)  |
/// | 2    | Alpha 120 (100) v Charlie 95 (92)|
/// | 2    | Bravo 130 (101) v Delta 90 (87)  |
pub fn demo_season() -> RawSeason {
    let names = ["Alpha", "Bravo", "Charlie", "Delta"];
    let logos: Vec<String> = names.iter().map(|n| logo_for(n)).collect();
    let roster: Vec<(&str, &str)> = names.iter().zip(logos.iter()).map(|(n, l)| (*n, l.as_str())).collect();

    RawSeason {
        league_key: LEAGUE_KEY.to_string(),
        teams: teams_json(&roster),
        standings: demo_standings(3),
        scoreboards: vec![
            RawScoreboard {
                week: 1,
                body: scoreboard_json(
                    1,
                    &[
                        (Side::new("Alpha", 100.0, 100.0), Side::new("Bravo", 90.0, 95.0)),
                        (Side::new("Charlie", 85.0, 90.0), Side::new("Delta", 80.0, 88.0)),
                    ],
                ),
            },
            RawScoreboard {
                week: 2,
                body: scoreboard_json(
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

fn demo_standings(current_week: u32) -> Value {
    standings_json(
        current_week,
        &[
            Standing::new("Alpha", 1, (2, 0, 0), 220.0),
            Standing::new("Bravo", 2, (1, 1, 0), 220.0),
            Standing::new("Charlie", 3, (1, 1, 0), 180.0),
            Standing::new("Delta", 4, (0, 2, 0), 170.0),
        ],
    )
}

/// [`demo_season`] followed by a postseason week 3, current week 4.
///
/// Standings still count the two regular-season games.
///
/// | week | bracket     | matchup                          |
/// |------|-------------|----------------------------------|
/// | 3    | playoffs    | Alpha 140 (110) v Bravo 100 (105)|
/// | 3    | consolation | Charlie 70 (95) v Delta 75 (90)  |
pub fn demo_season_with_playoffs() -> RawSeason {
    let mut season = demo_season();
    season.standings = demo_standings(4);
    season.scoreboards.push(RawScoreboard {
        week: 3,
        body: bracket_scoreboard_json(
            3,
            &[
                (Side::new("Alpha", 140.0, 110.0), Side::new("Bravo", 100.0, 105.0), Bracket::Playoffs),
                (Side::new("Charlie", 70.0, 95.0), Side::new("Delta", 75.0, 90.0), Bracket::Consolation),
            ],
        ),
    });
    season
}

/// `users;use_login=1/games;game_keys=nfl/leagues`
pub fn leagues_json(league_keys: &[&str]) -> Value {
    let leagues = league_keys
        .iter()
        .map(|key| json!({ "league": [{ "league_key": key, "name": "Test League" }] }))
        .collect();

    json!({
        "fantasy_content": {
            "users": collection(vec![json!({ "user": [
                { "guid": "TESTGUID" },
                { "games": collection(vec![json!({ "game": [
                    { "game_key": "449", "code": "nfl" },
                    { "leagues": collection(leagues) }
                ] })]) }
            ] })])
        }
    })
}
