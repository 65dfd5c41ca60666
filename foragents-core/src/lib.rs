//! Core domain types for the forAgents trending engine.
//!
//! The crate models catalogue entities, the engagement counters gathered for
//! them, and the ranked output produced by the trending scorer. It also
//! defines the [`CounterSource`] seam through which counters are fetched from
//! a flat file or a database without the scorer knowing which.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod counters;
pub mod entity;
pub mod store;
pub mod trending;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use counters::{CounterMap, EngagementCounters, RatingEvent};
pub use entity::Entity;
pub use store::{
    CounterSource, CounterSourceError, FallbackCounterSource, RawCounters, RawRating, RawValue,
    parse_instant,
};
pub use trending::{TrendingBadge, TrendingResult};

#[cfg(feature = "store-json")]
pub use store::JsonCounterSource;
#[cfg(feature = "store-sqlite")]
pub use store::{SQLITE_SCHEMA, SqliteCounterSource};
