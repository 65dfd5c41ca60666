//! Loosely typed counters as persisted by event recorders.
//!
//! Flat files and database rows store counts, days, instants and ratings
//! without any guarantee about their types. Every leaf is captured as a
//! [`RawValue`] and [`RawCounters::normalise`] turns the lot into
//! [`EngagementCounters`], dropping individual malformed entries instead of
//! rejecting the whole entity.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use log::warn;
#[cfg(feature = "serde")]
use serde::Deserialize;

use crate::{EngagementCounters, RatingEvent};

const DAY_FORMAT: &str = "%Y-%m-%d";
const NAIVE_INSTANT_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const MIN_RATING: f64 = 1.0;
const MAX_RATING: f64 = 5.0;

/// A persisted leaf value whose type has not been checked yet.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawValue {
    /// Absent or `null`.
    #[default]
    Missing,
    /// A whole number.
    Integer(i64),
    /// A floating-point number.
    Real(f64),
    /// A string.
    Text(String),
    /// Any other shape, named for logging.
    Unsupported(&'static str),
}

impl RawValue {
    fn as_instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Text(text) => parse_instant(text),
            _ => None,
        }
    }

    fn as_rating(&self) -> Option<f64> {
        match *self {
            Self::Integer(score) => i32::try_from(score).ok().map(f64::from),
            Self::Real(score) => Some(score),
            _ => None,
        }
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for RawValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(RawValueVisitor)
    }
}

#[cfg(feature = "serde")]
struct RawValueVisitor;

#[cfg(feature = "serde")]
impl<'de> serde::de::Visitor<'de> for RawValueVisitor {
    type Value = RawValue;

    fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("any persisted value")
    }

    fn visit_bool<E>(self, _value: bool) -> Result<RawValue, E> {
        Ok(RawValue::Unsupported("boolean"))
    }

    fn visit_i64<E>(self, value: i64) -> Result<RawValue, E> {
        Ok(RawValue::Integer(value))
    }

    fn visit_u64<E>(self, value: u64) -> Result<RawValue, E> {
        Ok(i64::try_from(value).map_or(RawValue::Unsupported("oversized integer"), RawValue::Integer))
    }

    fn visit_f64<E>(self, value: f64) -> Result<RawValue, E> {
        Ok(RawValue::Real(value))
    }

    fn visit_str<E>(self, value: &str) -> Result<RawValue, E> {
        Ok(RawValue::from(value))
    }

    fn visit_string<E>(self, value: String) -> Result<RawValue, E> {
        Ok(RawValue::Text(value))
    }

    fn visit_unit<E>(self) -> Result<RawValue, E> {
        Ok(RawValue::Missing)
    }

    fn visit_none<E>(self) -> Result<RawValue, E> {
        Ok(RawValue::Missing)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<RawValue, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        RawValue::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<RawValue, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        while seq.next_element::<serde::de::IgnoredAny>()?.is_some() {}
        Ok(RawValue::Unsupported("array"))
    }

    fn visit_map<A>(self, mut map: A) -> Result<RawValue, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        while map
            .next_entry::<serde::de::IgnoredAny, serde::de::IgnoredAny>()?
            .is_some()
        {}
        Ok(RawValue::Unsupported("object"))
    }
}

/// A rating as persisted: both fields may be absent or malformed.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct RawRating {
    /// Submission instant, RFC 3339 or `YYYY-MM-DD HH:MM:SS` in UTC.
    pub created_at: RawValue,
    /// Star rating; valid values lie in `1.0..=5.0`.
    pub rating: RawValue,
}

/// Engagement counters before validation.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct RawCounters {
    /// Lifetime install count; negative or non-integer values count as zero.
    pub installs_total: RawValue,
    /// Lifetime view count; negative or non-integer values count as zero.
    pub views_total: RawValue,
    /// Daily install counts keyed by `YYYY-MM-DD`.
    pub installs_by_day: BTreeMap<String, RawValue>,
    /// Daily view counts keyed by `YYYY-MM-DD`.
    pub views_by_day: BTreeMap<String, RawValue>,
    /// Comment creation instants.
    pub comments: Vec<RawValue>,
    /// Ratings with their submission instants.
    pub ratings: Vec<RawRating>,
}

impl RawCounters {
    /// Validate the raw counters for `entity_id`, discarding malformed entries.
    ///
    /// Each discarded entry is logged at `warn` level with the entity it
    /// belongs to.
    ///
    /// # Examples
    /// ```
    /// use foragents_core::{RawCounters, RawRating, RawValue};
    ///
    /// let raw = RawCounters {
    ///     installs_total: RawValue::from(-3),
    ///     comments: vec!["2026-10-18T09:30:00Z".into(), "yesterday".into(), RawValue::Missing],
    ///     ratings: vec![RawRating {
    ///         created_at: "2026-10-18T10:00:00Z".into(),
    ///         rating: RawValue::from(9.0),
    ///     }],
    ///     ..RawCounters::default()
    /// };
    ///
    /// let counters = raw.normalise("skill-a");
    /// assert_eq!(counters.installs_total, 0);
    /// assert_eq!(counters.comments.len(), 1);
    /// assert!(counters.ratings.is_empty());
    /// ```
    #[must_use]
    pub fn normalise(self, entity_id: &str) -> EngagementCounters {
        EngagementCounters {
            installs_total: non_negative_total(&self.installs_total, entity_id, "installsTotal"),
            views_total: non_negative_total(&self.views_total, entity_id, "viewsTotal"),
            installs_by_day: daily_counts(self.installs_by_day, entity_id, "installsByDay"),
            views_by_day: daily_counts(self.views_by_day, entity_id, "viewsByDay"),
            comments: comment_instants(self.comments, entity_id),
            ratings: rating_events(self.ratings, entity_id),
        }
    }
}

/// Parse a persisted instant.
///
/// RFC 3339 is preferred; naive `YYYY-MM-DDTHH:MM:SS` and SQLite's
/// `YYYY-MM-DD HH:MM:SS` forms are read as UTC.
#[must_use]
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(instant.with_timezone(&Utc));
    }
    NAIVE_INSTANT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| naive.and_utc())
}

fn non_negative_total(value: &RawValue, entity_id: &str, field: &str) -> u64 {
    match *value {
        RawValue::Missing => 0,
        RawValue::Integer(count) => u64::try_from(count).unwrap_or_else(|_| {
            warn!("Ignored negative {field}={count} for entity {entity_id}");
            0
        }),
        ref other => {
            warn!("Ignored {field} for entity {entity_id}: {other:?} is not a whole count");
            0
        }
    }
}

fn daily_counts(
    raw: BTreeMap<String, RawValue>,
    entity_id: &str,
    field: &str,
) -> BTreeMap<NaiveDate, u64> {
    let mut days = BTreeMap::new();
    for (key, value) in raw {
        let Ok(day) = NaiveDate::parse_from_str(key.trim(), DAY_FORMAT) else {
            warn!("Skipped {field} entry for entity {entity_id}: unparseable day {key:?}");
            continue;
        };
        let RawValue::Integer(value) = value else {
            warn!("Skipped {field} entry for entity {entity_id}: {value:?} on {day} is not a whole count");
            continue;
        };
        let Ok(count) = u64::try_from(value) else {
            warn!("Skipped {field} entry for entity {entity_id}: negative count {value} on {day}");
            continue;
        };
        let slot: &mut u64 = days.entry(day).or_default();
        *slot = slot.saturating_add(count);
    }
    days
}

fn comment_instants(raw: Vec<RawValue>, entity_id: &str) -> Vec<DateTime<Utc>> {
    raw.into_iter()
        .filter_map(|value| {
            let parsed = value.as_instant();
            if parsed.is_none() {
                warn!("Skipped comment for entity {entity_id}: invalid timestamp {value:?}");
            }
            parsed
        })
        .collect()
}

fn rating_events(raw: Vec<RawRating>, entity_id: &str) -> Vec<RatingEvent> {
    raw.into_iter()
        .filter_map(|rating| rating_event(&rating, entity_id))
        .collect()
}

fn rating_event(raw: &RawRating, entity_id: &str) -> Option<RatingEvent> {
    let Some(at) = raw.created_at.as_instant() else {
        warn!(
            "Skipped rating for entity {entity_id}: invalid timestamp {:?}",
            raw.created_at
        );
        return None;
    };
    match raw.rating.as_rating() {
        Some(score) if score.is_finite() && (MIN_RATING..=MAX_RATING).contains(&score) => {
            Some(RatingEvent { at, score })
        }
        _ => {
            warn!(
                "Skipped rating for entity {entity_id}: score {:?} is not a number in 1..=5",
                raw.rating
            );
            None
        }
    }
}
