//! Property-based tests for trending ranking.
//!
//! # Invariants tested
//!
//! - **Cardinality:** every input entity appears exactly once in the output.
//! - **Ordering:** scores are non-increasing and always finite.
//! - **Contiguous tiers:** badges never skip back to a higher tier.
//! - **Determinism:** identical inputs rank identically.
//! - **Recency:** moving every event closer to `now` never lowers a score.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, TimeZone, Utc};
use foragents_core::{
    CounterMap, EngagementCounters, Entity, RatingEvent, TrendingBadge, TrendingResult,
};
use foragents_trending::{DecayParams, TrendingScorer, TrendingSignals, TrendingWeights, score};
use proptest::prelude::*;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0)
        .single()
        .expect("valid instant")
}

/// Counters with up to a handful of dated installs, views, comments and ratings.
fn counters_strategy() -> impl Strategy<Value = EngagementCounters> {
    (
        0_u64..5_000,
        0_u64..50_000,
        prop::collection::vec((0_i64..30, 0_u64..200), 0..4),
        prop::collection::vec((0_i64..30, 0_u64..2_000), 0..4),
        prop::collection::vec(-2_i64..40, 0..5),
        prop::collection::vec((0_i64..40, 1.0_f64..=5.0), 0..5),
    )
        .prop_map(|(installs_total, views_total, installs, views, comments, ratings)| {
            let now = now();
            let mut counters = EngagementCounters {
                installs_total,
                views_total,
                ..EngagementCounters::default()
            };
            for (age, count) in installs {
                counters = counters.with_installs_on((now - Duration::days(age)).date_naive(), count);
            }
            for (age, count) in views {
                counters = counters.with_views_on((now - Duration::days(age)).date_naive(), count);
            }
            for age in comments {
                counters = counters.with_comment(now - Duration::hours(age * 18));
            }
            for (age, score) in ratings {
                counters = counters.with_rating(now - Duration::days(age), score);
            }
            counters
        })
}

/// A catalogue of uniquely named entities, some with counters.
fn catalogue_strategy() -> impl Strategy<Value = (Vec<Entity>, CounterMap)> {
    prop::collection::vec(
        (
            prop::option::of(counters_strategy()),
            0_usize..4,
            any::<bool>(),
        ),
        0..40,
    )
    .prop_map(|rows| {
        let mut entities = Vec::with_capacity(rows.len());
        let mut counters = CounterMap::new();
        for (index, (entry, tags, verified)) in rows.into_iter().enumerate() {
            let id = format!("entity-{index}");
            entities.push(
                Entity::new(id.clone())
                    .with_tags((0..tags).map(|tag| format!("tag-{tag}")))
                    .verified(verified),
            );
            if let Some(entry) = entry {
                counters.insert(id, entry);
            }
        }
        (entities, counters)
    })
}

const fn tier(badge: Option<TrendingBadge>) -> u8 {
    match badge {
        Some(TrendingBadge::Hot) => 0,
        Some(TrendingBadge::Rising) => 1,
        Some(TrendingBadge::Popular) => 2,
        None => 3,
    }
}

fn rank(entities: &[Entity], counters: &CounterMap) -> Vec<TrendingResult> {
    TrendingScorer::default().rank(entities, counters, now())
}

fn score_at_now(counters: &EngagementCounters) -> f64 {
    let signals = TrendingSignals::collect(counters, now(), DecayParams::default());
    score(&signals, 0.0, &TrendingWeights::default())
}

/// Move every dated event `days` later, leaving lifetime totals untouched.
fn moved_later(counters: &EngagementCounters, days: i64) -> EngagementCounters {
    let by = Duration::days(days);
    EngagementCounters {
        installs_total: counters.installs_total,
        views_total: counters.views_total,
        installs_by_day: counters
            .installs_by_day
            .iter()
            .map(|(&day, &count)| (day + by, count))
            .collect(),
        views_by_day: counters
            .views_by_day
            .iter()
            .map(|(&day, &count)| (day + by, count))
            .collect(),
        comments: counters.comments.iter().map(|&at| at + by).collect(),
        ratings: counters
            .ratings
            .iter()
            .map(|rating| RatingEvent {
                at: rating.at + by,
                score: rating.score,
            })
            .collect(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: ranking neither drops nor duplicates entities.
    #[test]
    fn ranking_preserves_entities((entities, counters) in catalogue_strategy()) {
        let ranked = rank(&entities, &counters);

        prop_assert_eq!(ranked.len(), entities.len());
        let input: BTreeSet<&str> = entities.iter().map(|e| e.id.as_str()).collect();
        let output: BTreeSet<&str> = ranked.iter().map(|r| r.entity_id.as_str()).collect();
        prop_assert_eq!(input, output);
    }

    /// Property: scores are finite and sorted in descending order.
    #[test]
    fn scores_are_finite_and_descending((entities, counters) in catalogue_strategy()) {
        let ranked = rank(&entities, &counters);

        for result in &ranked {
            prop_assert!(result.trending_score.is_finite(), "score {} is not finite", result.trending_score);
        }
        for pair in ranked.windows(2) {
            if let [higher, lower] = pair {
                prop_assert!(
                    higher.trending_score >= lower.trending_score,
                    "{} ({}) ranked above {} ({})",
                    higher.entity_id,
                    higher.trending_score,
                    lower.entity_id,
                    lower.trending_score
                );
            }
        }
    }

    /// Property: badge tiers are contiguous and a non-empty ranking has a hot entity.
    #[test]
    fn badges_are_contiguous((entities, counters) in catalogue_strategy()) {
        let ranked = rank(&entities, &counters);

        for pair in ranked.windows(2) {
            if let [higher, lower] = pair {
                prop_assert!(tier(higher.trending_badge) <= tier(lower.trending_badge));
            }
        }
        if let Some(first) = ranked.first() {
            prop_assert_eq!(first.trending_badge, Some(TrendingBadge::Hot));
        }
    }

    /// Property: the same inputs always produce the same ranking.
    #[test]
    fn ranking_is_deterministic((entities, counters) in catalogue_strategy()) {
        prop_assert_eq!(rank(&entities, &counters), rank(&entities, &counters));
    }

    /// Property: fresher engagement never scores below the same engagement seen older.
    #[test]
    fn recent_events_never_score_lower(counters in counters_strategy(), days in 0_i64..30) {
        let original = score_at_now(&counters);
        let fresher = score_at_now(&moved_later(&counters, days));

        prop_assert!(
            fresher >= original,
            "moving events {days} days closer lowered the score from {original} to {fresher}"
        );
    }
}
