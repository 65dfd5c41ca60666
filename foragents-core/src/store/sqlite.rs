//! SQLite-backed counter source.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, warn};
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags, Row, params_from_iter};

use super::{CounterSource, CounterSourceError, RawCounters, RawRating, RawValue};
use crate::CounterMap;

/// SQLite limits bound parameters per statement to 999 by default. Lookups
/// chunk their `IN` lists to remain below that ceiling.
const SQLITE_MAX_VARIABLE_NUMBER: usize = 999;

const METRIC_INSTALL: &str = "install";
const METRIC_VIEW: &str = "view";

/// Tables read by [`SqliteCounterSource`].
///
/// Event recorders own the writes; the source only ever opens the database
/// read-only.
pub const SQLITE_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS entity_totals (
    entity_id TEXT PRIMARY KEY,
    installs_total INTEGER NOT NULL DEFAULT 0,
    views_total INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS daily_counts (
    entity_id TEXT NOT NULL,
    metric TEXT NOT NULL,
    day TEXT NOT NULL,
    count INTEGER NOT NULL,
    PRIMARY KEY (entity_id, metric, day)
);
CREATE TABLE IF NOT EXISTS comments (
    entity_id TEXT NOT NULL,
    created_at TEXT
);
CREATE TABLE IF NOT EXISTS ratings (
    entity_id TEXT NOT NULL,
    created_at TEXT,
    rating REAL
);
";

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Missing,
            Value::Integer(number) => Self::Integer(number),
            Value::Real(number) => Self::Real(number),
            Value::Text(text) => Self::Text(text),
            Value::Blob(_) => Self::Unsupported("blob"),
        }
    }
}

/// Read-only counter source backed by a SQLite database.
///
/// Columns are read without type checks; a cell holding the wrong kind of
/// value is dropped during normalisation rather than failing the query.
///
/// A fresh read-only connection is opened for every [`CounterSource::get`]
/// call, so a database that is missing or locked surfaces as an error from
/// that call and can be answered by a fallback source instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteCounterSource {
    path: Utf8PathBuf,
}

impl SqliteCounterSource {
    /// Create a source reading the database at `path`.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the underlying database.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn open(&self) -> Result<Connection, CounterSourceError> {
        Connection::open_with_flags(self.path.as_std_path(), OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|source| CounterSourceError::OpenDatabase {
                path: self.path.clone(),
                source,
            })
    }

    fn load_chunk(
        connection: &Connection,
        ids: &[&str],
        raw: &mut BTreeMap<String, RawCounters>,
    ) -> Result<(), CounterSourceError> {
        let placeholders = vec!["?"; ids.len()].join(", ");

        Self::for_each_row(
            connection,
            &format!(
                "SELECT entity_id, installs_total, views_total FROM entity_totals \
                 WHERE entity_id IN ({placeholders})"
            ),
            "entity totals",
            ids,
            |row| {
                let entity_id: String = row.get(0)?;
                let entry = raw.entry(entity_id).or_default();
                entry.installs_total = row.get::<_, Value>(1)?.into();
                entry.views_total = row.get::<_, Value>(2)?.into();
                Ok(())
            },
        )?;

        Self::for_each_row(
            connection,
            &format!(
                "SELECT entity_id, metric, day, count FROM daily_counts \
                 WHERE entity_id IN ({placeholders})"
            ),
            "daily counts",
            ids,
            |row| {
                let entity_id: String = row.get(0)?;
                let metric: Value = row.get(1)?;
                let Value::Text(day) = row.get::<_, Value>(2)? else {
                    warn!("Skipped daily count for entity {entity_id}: day is not text");
                    return Ok(());
                };
                let count: Value = row.get(3)?;
                let entry = raw.entry(entity_id).or_default();
                let days = match &metric {
                    Value::Text(name) if name == METRIC_INSTALL => &mut entry.installs_by_day,
                    Value::Text(name) if name == METRIC_VIEW => &mut entry.views_by_day,
                    other => {
                        warn!("Skipped daily count with unknown metric {other:?}");
                        return Ok(());
                    }
                };
                days.insert(day, count.into());
                Ok(())
            },
        )?;

        Self::for_each_row(
            connection,
            &format!("SELECT entity_id, created_at FROM comments WHERE entity_id IN ({placeholders})"),
            "comments",
            ids,
            |row| {
                let entity_id: String = row.get(0)?;
                let created_at: Value = row.get(1)?;
                raw.entry(entity_id)
                    .or_default()
                    .comments
                    .push(created_at.into());
                Ok(())
            },
        )?;

        Self::for_each_row(
            connection,
            &format!(
                "SELECT entity_id, created_at, rating FROM ratings \
                 WHERE entity_id IN ({placeholders})"
            ),
            "ratings",
            ids,
            |row| {
                let entity_id: String = row.get(0)?;
                let rating = RawRating {
                    created_at: row.get::<_, Value>(1)?.into(),
                    rating: row.get::<_, Value>(2)?.into(),
                };
                raw.entry(entity_id).or_default().ratings.push(rating);
                Ok(())
            },
        )
    }

    fn for_each_row<F>(
        connection: &Connection,
        sql: &str,
        operation: &'static str,
        ids: &[&str],
        mut visit: F,
    ) -> Result<(), CounterSourceError>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<()>,
    {
        let query_error = |source| CounterSourceError::Query { operation, source };
        let mut statement = connection.prepare(sql).map_err(query_error)?;
        let mut rows = statement
            .query(params_from_iter(ids.iter()))
            .map_err(query_error)?;
        while let Some(row) = rows.next().map_err(query_error)? {
            visit(row).map_err(query_error)?;
        }
        Ok(())
    }
}

impl CounterSource for SqliteCounterSource {
    fn get(&self, entity_ids: &[String]) -> Result<CounterMap, CounterSourceError> {
        let mut ids: Vec<&str> = entity_ids.iter().map(String::as_str).collect();
        ids.sort_unstable();
        ids.dedup();

        let connection = self.open()?;
        let mut raw = BTreeMap::new();
        for chunk in ids.chunks(SQLITE_MAX_VARIABLE_NUMBER) {
            Self::load_chunk(&connection, chunk, &mut raw)?;
        }
        debug!(
            "Loaded counters for {} of {} entities from {}",
            raw.len(),
            ids.len(),
            self.path
        );

        Ok(raw
            .into_iter()
            .map(|(id, counters)| {
                let normalised = counters.normalise(&id);
                (id, normalised)
            })
            .collect())
    }
}
