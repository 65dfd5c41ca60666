//! Recency-decay trending scores for forAgents catalogue entities.
//!
//! Each entity's engagement counters are reduced to a handful of signals
//! (lifetime totals plus exponentially decayed recent activity), combined
//! into a weighted sum of `log1p` terms, and ranked. The ranked list is then
//! split into percentile badge tiers: `hot`, `rising` and `popular`.
//!
//! The scorer is pure: the caller supplies `now` once per pass and the same
//! inputs always yield the same ordering and badges.
//!
//! # Examples
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use foragents_core::{CounterMap, EngagementCounters, Entity};
//! use foragents_trending::TrendingScorer;
//!
//! let now = Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).single().expect("valid instant");
//! let entities = vec![Entity::new("quiet"), Entity::new("busy")];
//! let mut counters = CounterMap::new();
//! counters.insert(
//!     "busy".to_owned(),
//!     EngagementCounters::default().with_installs_on(now.date_naive(), 4),
//! );
//!
//! let ranked = TrendingScorer::default().rank(&entities, &counters, now);
//! assert_eq!(ranked[0].entity_id, "busy");
//! ```

#![forbid(unsafe_code)]

use chrono::{DateTime, Utc};
use foragents_core::{
    CounterMap, CounterSource, CounterSourceError, EngagementCounters, Entity, TrendingResult,
};
use log::debug;
use serde::Serialize;

mod badges;
mod config;
mod decay;
mod error;
mod signals;

pub use badges::assign_badges;
pub use config::{BadgeTiers, DecayParams, TrendingConfig, TrendingWeights};
pub use decay::{age_in_days, day_age_in_days, decay_weight};
pub use error::TrendingConfigError;
pub use signals::{TrendingSignals, baseline, score};

/// A ranked entity together with the signals that produced its score.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingExplanation {
    /// Ranked result.
    #[serde(flatten)]
    pub result: TrendingResult,
    /// Signals aggregated from the entity's counters.
    pub signals: TrendingSignals,
    /// Static-attribute baseline included in the score.
    pub baseline: f64,
}

/// Ranks entities by recency-weighted engagement.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrendingScorer {
    config: TrendingConfig,
}

impl TrendingScorer {
    /// Build a scorer from a validated configuration.
    ///
    /// # Errors
    /// Returns [`TrendingConfigError`] when `config` fails validation.
    pub fn new(config: TrendingConfig) -> Result<Self, TrendingConfigError> {
        Ok(Self {
            config: config.validate()?,
        })
    }

    /// Configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &TrendingConfig {
        &self.config
    }

    /// Score, sort and badge `entities` as seen at `now`.
    ///
    /// Entities without counters score their baseline alone. Equal scores
    /// keep their input order. The result has one entry per input entity.
    #[must_use]
    pub fn rank(
        &self,
        entities: &[Entity],
        counters: &CounterMap,
        now: DateTime<Utc>,
    ) -> Vec<TrendingResult> {
        self.explain(entities, counters, now)
            .into_iter()
            .map(|explanation| explanation.result)
            .collect()
    }

    /// Like [`Self::rank`], but keeps each entity's signals and baseline.
    #[must_use]
    pub fn explain(
        &self,
        entities: &[Entity],
        counters: &CounterMap,
        now: DateTime<Utc>,
    ) -> Vec<TrendingExplanation> {
        let empty = EngagementCounters::default();
        let mut scored: Vec<TrendingExplanation> = entities
            .iter()
            .map(|entity| {
                let entity_counters = counters.get(&entity.id).unwrap_or(&empty);
                self.score_entity(entity, entity_counters, now)
            })
            .collect();

        // `sort_by` is stable, so ties keep input order.
        scored.sort_by(|left, right| {
            right
                .result
                .trending_score
                .total_cmp(&left.result.trending_score)
        });

        let badges = assign_badges(scored.len(), self.config.tiers);
        for (explanation, badge) in scored.iter_mut().zip(badges) {
            explanation.result.trending_badge = badge;
        }
        debug!(
            "ranked {} entities at {} (decay {:?}, tiers {})",
            scored.len(),
            now,
            self.config.decay,
            self.config.tiers
        );
        scored
    }

    fn score_entity(
        &self,
        entity: &Entity,
        counters: &EngagementCounters,
        now: DateTime<Utc>,
    ) -> TrendingExplanation {
        let signals = TrendingSignals::collect(counters, now, self.config.decay);
        let base = baseline(entity, &self.config.weights);
        let trending_score = score(&signals, base, &self.config.weights);
        TrendingExplanation {
            result: TrendingResult {
                entity_id: entity.id.clone(),
                trending_score,
                trending_badge: None,
            },
            signals,
            baseline: base,
        }
    }
}

/// Fetch counters for `entities` from `source` and rank them.
///
/// # Errors
/// Propagates the [`CounterSourceError`] raised by `source`.
pub fn rank_from_source<S>(
    scorer: &TrendingScorer,
    source: &S,
    entities: &[Entity],
    now: DateTime<Utc>,
) -> Result<Vec<TrendingResult>, CounterSourceError>
where
    S: CounterSource + ?Sized,
{
    let counters = fetch_counters(source, entities)?;
    Ok(scorer.rank(entities, &counters, now))
}

/// Fetch counters for `entities` from `source` and explain their ranking.
///
/// # Errors
/// Propagates the [`CounterSourceError`] raised by `source`.
pub fn explain_from_source<S>(
    scorer: &TrendingScorer,
    source: &S,
    entities: &[Entity],
    now: DateTime<Utc>,
) -> Result<Vec<TrendingExplanation>, CounterSourceError>
where
    S: CounterSource + ?Sized,
{
    let counters = fetch_counters(source, entities)?;
    Ok(scorer.explain(entities, &counters, now))
}

fn fetch_counters<S>(source: &S, entities: &[Entity]) -> Result<CounterMap, CounterSourceError>
where
    S: CounterSource + ?Sized,
{
    let ids: Vec<String> = entities.iter().map(|entity| entity.id.clone()).collect();
    let counters = source.get(&ids)?;
    debug!(
        "counter source answered for {} of {} entities",
        counters.len(),
        ids.len()
    );
    Ok(counters)
}
