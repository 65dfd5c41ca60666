//! Facade crate for the forAgents trending engine.
//!
//! This crate re-exports the core domain types and the trending scorer, and
//! exposes the flat-file and `SQLite` counter sources behind feature flags.

#![forbid(unsafe_code)]

pub use foragents_core::{
    CounterMap, CounterSource, CounterSourceError, EngagementCounters, Entity,
    FallbackCounterSource, RatingEvent, RawCounters, RawRating, RawValue, TrendingBadge,
    TrendingResult,
};

pub use foragents_trending::{
    BadgeTiers, DecayParams, TrendingConfig, TrendingConfigError, TrendingExplanation,
    TrendingScorer, TrendingSignals, TrendingWeights, assign_badges, decay_weight,
    explain_from_source, rank_from_source,
};

#[cfg(feature = "store-json")]
pub use foragents_core::JsonCounterSource;

#[cfg(feature = "store-sqlite")]
pub use foragents_core::{SQLITE_SCHEMA, SqliteCounterSource};

#[cfg(feature = "test-support")]
pub use foragents_core::test_support;
