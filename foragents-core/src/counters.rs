//! Engagement counters gathered per entity.
//!
//! Counters are produced by external event recorders (installs, page views,
//! comments and ratings). Values held here have already been validated:
//! counts are unsigned, days and instants are parsed, and ratings lie in
//! `1.0..=5.0`. See [`RawCounters`](crate::RawCounters) for the loosely
//! typed persisted form.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Counters keyed by entity identifier.
pub type CounterMap = BTreeMap<String, EngagementCounters>;

/// A single rating left on an entity.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RatingEvent {
    /// When the rating was submitted.
    pub at: DateTime<Utc>,
    /// Star rating, `1.0..=5.0`.
    pub score: f64,
}

/// Engagement counters for one entity.
///
/// The default value is the all-zero counter set used whenever a source has
/// nothing recorded for an entity.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use foragents_core::EngagementCounters;
///
/// let day = NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date");
/// let counters = EngagementCounters::default().with_installs_on(day, 4);
///
/// assert_eq!(counters.installs_total, 4);
/// assert_eq!(counters.installs_by_day.get(&day), Some(&4));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct EngagementCounters {
    /// Lifetime install count.
    pub installs_total: u64,
    /// Lifetime view count.
    pub views_total: u64,
    /// Daily install counts keyed by UTC calendar day.
    pub installs_by_day: BTreeMap<NaiveDate, u64>,
    /// Daily view counts keyed by UTC calendar day.
    pub views_by_day: BTreeMap<NaiveDate, u64>,
    /// Creation instants of comments referencing the entity.
    pub comments: Vec<DateTime<Utc>>,
    /// Ratings left on the entity.
    pub ratings: Vec<RatingEvent>,
}

impl EngagementCounters {
    /// Record `count` installs on `day`, bumping the lifetime total as well.
    #[must_use]
    pub fn with_installs_on(mut self, day: NaiveDate, count: u64) -> Self {
        *self.installs_by_day.entry(day).or_default() += count;
        self.installs_total = self.installs_total.saturating_add(count);
        self
    }

    /// Record `count` views on `day`, bumping the lifetime total as well.
    #[must_use]
    pub fn with_views_on(mut self, day: NaiveDate, count: u64) -> Self {
        *self.views_by_day.entry(day).or_default() += count;
        self.views_total = self.views_total.saturating_add(count);
        self
    }

    /// Append a comment created at `at`.
    #[must_use]
    pub fn with_comment(mut self, at: DateTime<Utc>) -> Self {
        self.comments.push(at);
        self
    }

    /// Append a rating of `score` submitted at `at`.
    #[must_use]
    pub fn with_rating(mut self, at: DateTime<Utc>, score: f64) -> Self {
        self.ratings.push(RatingEvent { at, score });
        self
    }

    /// Report whether no engagement has been recorded at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.installs_total == 0
            && self.views_total == 0
            && self.installs_by_day.is_empty()
            && self.views_by_day.is_empty()
            && self.comments.is_empty()
            && self.ratings.is_empty()
    }
}
