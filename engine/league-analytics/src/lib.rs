//! # LeagueAnalytics
//!
//! Pure data layer of the Fantasy Wrapped dashboard.
//!
//! Raw provider payloads are decoded by [`yahoo`], reconciled into a typed [`League`]
//! by [`normalizer`], and reduced to per-team season statistics by [`aggregation`].
//! Nothing in this crate performs I/O.

pub mod aggregation;
pub mod error;
pub mod model;
pub mod normalizer;
pub mod stats;
pub mod yahoo;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;


pub use aggregation::{
    Performance, SeasonAggregator, SeasonReport, SparseSamplePolicy, TeamSeasonStats, WrappedSummary,
};
pub use error::AnalyticsError;
pub use model::{League, Matchup, Record, Team, WeeklyResult};
pub use normalizer::{normalize, RawScoreboard, RawSeason};
pub use yahoo::RosterEntry;

pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// Normalize a fetched season and aggregate it in one step
pub fn build_report(raw: &RawSeason, policy: SparseSamplePolicy) -> Result<SeasonReport> {
    let league = normalize(raw)?;
    SeasonAggregator::new(policy).aggregate(&league)
}
