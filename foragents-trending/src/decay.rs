//! Recency decay.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::DecayParams;

const MILLIS_PER_DAY: f64 = 86_400_000.0_f64;

/// Weight of an event aged `age_days` days.
///
/// The weight is `0.5^(age / half_life)` up to and including `max_age_days`
/// and zero beyond it. Events stamped in the future count as brand new;
/// non-finite ages contribute nothing.
///
/// # Examples
/// ```
/// use foragents_trending::{DecayParams, decay_weight};
///
/// let decay = DecayParams::default();
/// assert_eq!(decay_weight(0.0, decay), 1.0);
/// assert!((decay_weight(3.0, decay) - 0.5).abs() < 1e-12);
/// assert_eq!(decay_weight(22.0, decay), 0.0);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "exponential decay divides the age by the half-life"
)]
pub fn decay_weight(age_days: f64, decay: DecayParams) -> f64 {
    if !age_days.is_finite() || age_days > decay.max_age_days {
        return 0.0_f64;
    }
    0.5_f64.powf(age_days.max(0.0_f64) / decay.half_life_days)
}

/// Age in fractional days of `at`, measured at `now`.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "millisecond ages are converted to fractional days"
)]
pub fn age_in_days(at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - at).num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// Age in fractional days of a daily bucket, measured from the start of its
/// UTC day.
#[must_use]
pub fn day_age_in_days(day: NaiveDate, now: DateTime<Utc>) -> f64 {
    age_in_days(day.and_time(NaiveTime::MIN).and_utc(), now)
}
