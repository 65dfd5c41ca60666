//! Test-only counter sources and fixtures used by unit and behaviour tests.

#[cfg(feature = "store-sqlite")]
use camino::Utf8Path;

use crate::{CounterMap, CounterSource, CounterSourceError, EngagementCounters};

/// In-memory `CounterSource` implementation used in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryCounterSource {
    counters: CounterMap,
}

impl MemoryCounterSource {
    /// Create a source holding counters for a single entity.
    #[must_use]
    pub fn with_entry(entity_id: &str, counters: EngagementCounters) -> Self {
        Self::with_counters(CounterMap::from([(entity_id.to_owned(), counters)]))
    }

    /// Create a source from a prepared counter map.
    #[must_use]
    pub const fn with_counters(counters: CounterMap) -> Self {
        Self { counters }
    }
}

impl CounterSource for MemoryCounterSource {
    fn get(&self, entity_ids: &[String]) -> Result<CounterMap, CounterSourceError> {
        Ok(entity_ids
            .iter()
            .filter_map(|id| {
                self.counters
                    .get(id)
                    .map(|counters| (id.clone(), counters.clone()))
            })
            .collect())
    }
}

/// `CounterSource` that always fails with [`CounterSourceError::Unavailable`].
#[derive(Debug, Clone)]
pub struct FailingCounterSource {
    reason: String,
}

impl FailingCounterSource {
    /// Create a failing source reporting `reason`.
    #[must_use]
    pub fn new(reason: &str) -> Self {
        Self {
            reason: reason.to_owned(),
        }
    }
}

impl Default for FailingCounterSource {
    fn default() -> Self {
        Self::new("database offline")
    }
}

impl CounterSource for FailingCounterSource {
    fn get(&self, _entity_ids: &[String]) -> Result<CounterMap, CounterSourceError> {
        Err(CounterSourceError::Unavailable {
            reason: self.reason.clone(),
        })
    }
}

/// Create a counters database at `path` and persist `counters` into it.
///
/// Instants are written as RFC 3339 and days as `YYYY-MM-DD`, matching what
/// [`SqliteCounterSource`](crate::SqliteCounterSource) reads back.
///
/// # Errors
/// Propagates any `rusqlite` failure.
#[cfg(feature = "store-sqlite")]
pub fn write_sqlite_counters(path: &Utf8Path, counters: &CounterMap) -> rusqlite::Result<()> {
    use chrono::SecondsFormat;
    use rusqlite::{Connection, params};

    let mut connection = Connection::open(path.as_std_path())?;
    connection.execute_batch(crate::store::SQLITE_SCHEMA)?;
    let tx = connection.transaction()?;
    for (id, entry) in counters {
        tx.execute(
            "INSERT INTO entity_totals (entity_id, installs_total, views_total) VALUES (?1, ?2, ?3)",
            params![id, entry.installs_total, entry.views_total],
        )?;
        for (metric, days) in [("install", &entry.installs_by_day), ("view", &entry.views_by_day)] {
            for (day, count) in days {
                tx.execute(
                    "INSERT INTO daily_counts (entity_id, metric, day, count) VALUES (?1, ?2, ?3, ?4)",
                    params![id, metric, day.format("%Y-%m-%d").to_string(), count],
                )?;
            }
        }
        for at in &entry.comments {
            tx.execute(
                "INSERT INTO comments (entity_id, created_at) VALUES (?1, ?2)",
                params![id, at.to_rfc3339_opts(SecondsFormat::Secs, true)],
            )?;
        }
        for rating in &entry.ratings {
            tx.execute(
                "INSERT INTO ratings (entity_id, created_at, rating) VALUES (?1, ?2, ?3)",
                params![
                    id,
                    rating.at.to_rfc3339_opts(SecondsFormat::Secs, true),
                    rating.score
                ],
            )?;
        }
    }
    tx.commit()
}
