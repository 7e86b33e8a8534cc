//! Error types for LeagueAnalytics

use thiserror::Error;

/// Errors raised while normalizing provider data or aggregating a season.
///
/// Every variant is a data-consistency failure: the computation is abandoned and
/// no partial report is produced.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Missing field '{field}' in {context}")]
    MissingField { context: String, field: &'static str },

    #[error("Malformed provider response in {context}: {reason}")]
    MalformedResponse { context: String, reason: String },

    #[error("Failed to decode {context}: {source}")]
    Decode { context: String, source: serde_json::Error },

    #[error("Unknown team '{name}' referenced in {context}")]
    UnknownTeam { name: String, context: String },

    #[error("Duplicate team '{name}' in roster")]
    DuplicateTeam { name: String },

    #[error("Invalid matchup in week {week}: {reason}")]
    InvalidMatchup { week: u32, reason: String },

    #[error("No scoreboard supplied for completed week {week}")]
    MissingScoreboard { week: u32 },

    #[error("No leagues found for the logged-in user")]
    NoLeagues,

    #[error("Team '{team}' has no completed games")]
    NoGamesPlayed { team: String },

    #[error("Team '{team}' has {actual} weekly scores but a record of {expected} games")]
    RecordMismatch { team: String, expected: u32, actual: usize },

    #[error("Team '{team}' has no projected points for the season")]
    MissingProjection { team: String },
}

impl AnalyticsError {
    pub(crate) fn missing(context: impl Into<String>, field: &'static str) -> Self {
        AnalyticsError::MissingField { context: context.into(), field }
    }

    pub(crate) fn malformed(context: impl Into<String>, reason: impl Into<String>) -> Self {
        AnalyticsError::MalformedResponse { context: context.into(), reason: reason.into() }
    }
}
