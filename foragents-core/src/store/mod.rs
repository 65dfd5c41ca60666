//! Sourcing engagement counters.
//!
//! The [`CounterSource`] trait is the only way the trending scorer's callers
//! obtain counters. Implementations may read a flat JSON file
//! ([`JsonCounterSource`]), a SQLite database ([`SqliteCounterSource`]), or
//! chain two sources with [`FallbackCounterSource`].

use camino::Utf8PathBuf;
use log::warn;
use thiserror::Error;

use crate::CounterMap;

#[cfg(feature = "store-json")]
mod json;
mod raw;
#[cfg(feature = "store-sqlite")]
mod sqlite;

#[cfg(feature = "store-json")]
pub use json::JsonCounterSource;
pub use raw::{RawCounters, RawRating, RawValue, parse_instant};
#[cfg(feature = "store-sqlite")]
pub use sqlite::{SQLITE_SCHEMA, SqliteCounterSource};

/// Errors raised while fetching counters from a backing store.
#[derive(Debug, Error)]
pub enum CounterSourceError {
    /// Reading a counters file failed.
    #[error("failed to read counters file at {path}")]
    ReadFile {
        /// Location of the counters file.
        path: Utf8PathBuf,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
    /// A counters file was not valid JSON of the expected shape.
    #[cfg(feature = "store-json")]
    #[error("failed to parse counters file at {path}")]
    ParseFile {
        /// Location of the counters file.
        path: Utf8PathBuf,
        /// Source error from `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// Opening the SQLite database failed.
    #[cfg(feature = "store-sqlite")]
    #[error("failed to open counters database at {path}")]
    OpenDatabase {
        /// Location of the SQLite database.
        path: Utf8PathBuf,
        /// Source error from `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Preparing or executing a database query failed.
    #[cfg(feature = "store-sqlite")]
    #[error("failed to query {operation}")]
    Query {
        /// Description of the failed operation.
        operation: &'static str,
        /// Source error from `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A custom source reported a failure of its own.
    #[error("counter source unavailable: {reason}")]
    Unavailable {
        /// Human-readable explanation.
        reason: String,
    },
}

/// Fetch engagement counters for a set of entities.
///
/// Implementations return counters only for the ids they know about; ids
/// without any recorded engagement are simply absent from the map, and the
/// scorer treats them as all-zero. Duplicate ids are tolerated.
///
/// # Examples
///
/// ```rust
/// use foragents_core::{CounterMap, CounterSource, CounterSourceError, EngagementCounters};
///
/// struct Fixed(CounterMap);
///
/// impl CounterSource for Fixed {
///     fn get(&self, entity_ids: &[String]) -> Result<CounterMap, CounterSourceError> {
///         Ok(self
///             .0
///             .iter()
///             .filter(|(id, _)| entity_ids.contains(id))
///             .map(|(id, counters)| (id.clone(), counters.clone()))
///             .collect())
///     }
/// }
///
/// let mut map = CounterMap::new();
/// map.insert("skill-a".to_owned(), EngagementCounters::default());
/// let source = Fixed(map);
///
/// let found = source.get(&["skill-a".to_owned(), "skill-b".to_owned()])?;
/// assert_eq!(found.len(), 1);
/// # Ok::<(), CounterSourceError>(())
/// ```
pub trait CounterSource {
    /// Return counters for the requested entity ids.
    ///
    /// # Errors
    /// Returns [`CounterSourceError`] when the backing store cannot be read.
    fn get(&self, entity_ids: &[String]) -> Result<CounterMap, CounterSourceError>;
}

impl<T: CounterSource + ?Sized> CounterSource for &T {
    fn get(&self, entity_ids: &[String]) -> Result<CounterMap, CounterSourceError> {
        (**self).get(entity_ids)
    }
}

impl<T: CounterSource + ?Sized> CounterSource for Box<T> {
    fn get(&self, entity_ids: &[String]) -> Result<CounterMap, CounterSourceError> {
        (**self).get(entity_ids)
    }
}

/// Ask a primary source first and fall back to a secondary one on failure.
///
/// A primary failure is logged at `warn` level; only the secondary's error
/// reaches the caller.
#[derive(Debug, Clone)]
pub struct FallbackCounterSource<P, S> {
    primary: P,
    secondary: S,
}

impl<P, S> FallbackCounterSource<P, S> {
    /// Chain `primary` with `secondary`.
    pub const fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

impl<P: CounterSource, S: CounterSource> CounterSource for FallbackCounterSource<P, S> {
    fn get(&self, entity_ids: &[String]) -> Result<CounterMap, CounterSourceError> {
        match self.primary.get(entity_ids) {
            Ok(counters) => Ok(counters),
            Err(err) => {
                warn!("Primary counter source failed, using fallback: {err}");
                self.secondary.get(entity_ids)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngagementCounters;
    use crate::test_support::{FailingCounterSource, MemoryCounterSource};
    use rstest::rstest;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|&value| value.to_owned()).collect()
    }

    fn counters_with_views(views: u64) -> EngagementCounters {
        EngagementCounters {
            views_total: views,
            ..EngagementCounters::default()
        }
    }

    #[rstest]
    fn fallback_prefers_primary() {
        let primary = MemoryCounterSource::with_entry("skill-a", counters_with_views(1));
        let secondary = MemoryCounterSource::with_entry("skill-a", counters_with_views(2));
        let source = FallbackCounterSource::new(primary, secondary);

        let found = source.get(&ids(&["skill-a"])).expect("counters");
        assert_eq!(found.get("skill-a").map(|c| c.views_total), Some(1));
    }

    #[rstest]
    fn fallback_uses_secondary_when_primary_fails() {
        let secondary = MemoryCounterSource::with_entry("skill-a", counters_with_views(2));
        let source = FallbackCounterSource::new(FailingCounterSource::default(), secondary);

        let found = source.get(&ids(&["skill-a"])).expect("counters");
        assert_eq!(found.get("skill-a").map(|c| c.views_total), Some(2));
    }

    #[rstest]
    fn fallback_surfaces_secondary_error() {
        let source = FallbackCounterSource::new(
            FailingCounterSource::default(),
            FailingCounterSource::new("flat file gone"),
        );

        let err = source.get(&ids(&["skill-a"])).expect_err("both sources fail");
        assert!(
            matches!(&err, CounterSourceError::Unavailable { reason } if reason == "flat file gone"),
            "unexpected error: {err}"
        );
    }

    #[rstest]
    fn boxed_sources_delegate() {
        let source: Box<dyn CounterSource> =
            Box::new(MemoryCounterSource::with_entry("skill-a", counters_with_views(3)));
        let found = source.get(&ids(&["skill-a", "skill-b"])).expect("counters");
        assert_eq!(found.len(), 1);
    }
}
