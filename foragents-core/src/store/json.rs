//! Flat-file counter source.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, warn};

use super::{CounterSource, CounterSourceError, RawCounters};
use crate::CounterMap;

/// Counter source reading a JSON object keyed by entity id.
///
/// Each value is a [`RawCounters`] document:
///
/// ```json
/// {
///   "agent-memory": {
///     "installsTotal": 120,
///     "installsByDay": { "2026-10-18": 4 },
///     "comments": ["2026-10-17T12:00:00Z"],
///     "ratings": [{ "createdAt": "2026-10-17T12:05:00Z", "rating": 5 }]
///   }
/// }
/// ```
///
/// Leaves of the wrong type are dropped one by one during normalisation. An
/// entry whose overall shape is wrong (a number instead of an object, say)
/// is skipped with a warning and the other entities are still answered.
///
/// A missing file means nothing has been recorded yet and yields an empty
/// map. The file is re-read on every call, matching the recompute-per-query
/// model of the scorer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonCounterSource {
    path: Utf8PathBuf,
}

impl JsonCounterSource {
    /// Create a source reading `path`.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the counters file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, serde_json::Value>, CounterSourceError> {
        let contents = foragents_fs::read_utf8_if_exists(&self.path).map_err(|source| {
            CounterSourceError::ReadFile {
                path: self.path.clone(),
                source,
            }
        })?;
        let Some(contents) = contents else {
            debug!("Counters file {} does not exist; treating as empty", self.path);
            return Ok(BTreeMap::new());
        };
        serde_json::from_str(&contents).map_err(|source| CounterSourceError::ParseFile {
            path: self.path.clone(),
            source,
        })
    }
}

impl CounterSource for JsonCounterSource {
    fn get(&self, entity_ids: &[String]) -> Result<CounterMap, CounterSourceError> {
        let mut all = self.read_all()?;
        let mut found = CounterMap::new();
        for id in entity_ids {
            if found.contains_key(id) {
                continue;
            }
            let Some(document) = all.remove(id) else {
                continue;
            };
            match serde_json::from_value::<RawCounters>(document) {
                Ok(raw) => {
                    found.insert(id.clone(), raw.normalise(id));
                }
                Err(err) => warn!("Skipped counters for entity {id} in {}: {err}", self.path),
            }
        }
        debug!(
            "Loaded counters for {} of {} requested entities from {}",
            found.len(),
            entity_ids.len(),
            self.path
        );
        Ok(found)
    }
}
