//! Per-entity engagement signals and the weighted trending score.

use chrono::{DateTime, Utc};
use foragents_core::{EngagementCounters, Entity, RatingEvent};
use serde::{Deserialize, Serialize};

use crate::decay::{age_in_days, day_age_in_days, decay_weight};
use crate::{DecayParams, TrendingWeights};

const NEUTRAL_RATING: f64 = 3.0_f64;
const RATING_HALF_SPAN: f64 = 2.0_f64;
const MIN_RATING: f64 = 1.0_f64;
const MAX_RATING: f64 = 5.0_f64;

/// Engagement signals aggregated for one entity at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingSignals {
    /// Lifetime installs.
    pub installs_total: u64,
    /// Lifetime views.
    pub views_total: u64,
    /// All comments ever left.
    pub comments_total: u64,
    /// Number of valid ratings.
    pub ratings_count: u64,
    /// Daily installs weighted by recency.
    pub installs_decay: f64,
    /// Daily views weighted by recency.
    pub views_decay: f64,
    /// Comments weighted by recency.
    pub comments_decay: f64,
    /// Ratings weighted by recency.
    pub ratings_decay: f64,
    /// `(average - 3) / 2`, in `-1.0..=1.0`; `0.0` without ratings.
    pub rating_quality: f64,
}

impl TrendingSignals {
    /// Aggregate `counters` as seen at `now`.
    ///
    /// Ratings that are not finite or fall outside `1.0..=5.0` are ignored,
    /// even though [`RawCounters`](foragents_core::RawCounters) normally
    /// filters them earlier.
    #[must_use]
    pub fn collect(counters: &EngagementCounters, now: DateTime<Utc>, decay: DecayParams) -> Self {
        let installs_decay = decayed_daily_sum(counters.installs_by_day.iter(), now, decay);
        let views_decay = decayed_daily_sum(counters.views_by_day.iter(), now, decay);
        let comments_decay = counters
            .comments
            .iter()
            .map(|&at| decay_weight(age_in_days(at, now), decay))
            .sum();

        let ratings: Vec<&RatingEvent> = counters
            .ratings
            .iter()
            .filter(|rating| {
                rating.score.is_finite() && (MIN_RATING..=MAX_RATING).contains(&rating.score)
            })
            .collect();
        let ratings_decay = ratings
            .iter()
            .map(|rating| decay_weight(age_in_days(rating.at, now), decay))
            .sum();

        Self {
            installs_total: counters.installs_total,
            views_total: counters.views_total,
            comments_total: len_as_u64(counters.comments.len()),
            ratings_count: len_as_u64(ratings.len()),
            installs_decay,
            views_decay,
            comments_decay,
            ratings_decay,
            rating_quality: rating_quality(&ratings),
        }
    }
}

/// Small deterministic offset that orders entities without engagement.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "baseline scales the tag count by a floating-point weight"
)]
pub fn baseline(entity: &Entity, weights: &TrendingWeights) -> f64 {
    let tags = weights.tag_baseline * entity.tag_count() as f64;
    if entity.verified {
        tags + weights.verified_baseline
    } else {
        tags
    }
}

/// Combine `signals` into a trending score.
///
/// Each signal passes through `log1p` so a single viral entity cannot dwarf
/// the rest of the catalogue. A non-finite result falls back to `baseline`.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "the trending score is a weighted sum of logarithms"
)]
pub fn score(signals: &TrendingSignals, baseline: f64, weights: &TrendingWeights) -> f64 {
    let ratings_log = (signals.ratings_count as f64).ln_1p();
    let raw = baseline
        + weights.installs_total * (signals.installs_total as f64).ln_1p()
        + weights.views_total * (signals.views_total as f64).ln_1p()
        + weights.comments_total * (signals.comments_total as f64).ln_1p()
        + weights.ratings_count * ratings_log
        + weights.installs_decay * signals.installs_decay.ln_1p()
        + weights.views_decay * signals.views_decay.ln_1p()
        + weights.comments_decay * signals.comments_decay.ln_1p()
        + weights.ratings_decay * signals.ratings_decay.ln_1p()
        + weights.rating_quality * signals.rating_quality * ratings_log;
    if raw.is_finite() { raw } else { baseline }
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "daily counts are scaled by their decay weight"
)]
fn decayed_daily_sum<'a, I>(days: I, now: DateTime<Utc>, decay: DecayParams) -> f64
where
    I: Iterator<Item = (&'a chrono::NaiveDate, &'a u64)>,
{
    days.map(|(&day, &count)| count as f64 * decay_weight(day_age_in_days(day, now), decay))
        .sum()
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "the average rating is mapped onto -1.0..=1.0"
)]
fn rating_quality(ratings: &[&RatingEvent]) -> f64 {
    if ratings.is_empty() {
        return 0.0_f64;
    }
    let total: f64 = ratings.iter().map(|rating| rating.score).sum();
    let average = total / ratings.len() as f64;
    (average - NEUTRAL_RATING) / RATING_HALF_SPAN
}

fn len_as_u64(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}
