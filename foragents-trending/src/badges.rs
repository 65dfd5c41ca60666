//! Percentile badge tiers.

use foragents_core::TrendingBadge;

use crate::BadgeTiers;

/// Badges for `count` entities already sorted by descending score.
///
/// Cutoffs are `ceil(count * percent / 100)` computed in integer arithmetic,
/// with at least one `hot` entity and each cutoff no lower than the previous
/// one, so tiers are contiguous and never overlap.
///
/// # Examples
/// ```
/// use foragents_core::TrendingBadge;
/// use foragents_trending::{BadgeTiers, assign_badges};
///
/// let badges = assign_badges(10, BadgeTiers::default());
/// assert_eq!(badges[0], Some(TrendingBadge::Hot));
/// assert_eq!(badges[1], Some(TrendingBadge::Rising));
/// assert_eq!(badges[2], Some(TrendingBadge::Popular));
/// assert!(badges[3..].iter().all(Option::is_none));
/// ```
#[must_use]
pub fn assign_badges(count: usize, tiers: BadgeTiers) -> Vec<Option<TrendingBadge>> {
    if count == 0 {
        return Vec::new();
    }
    let hot = cutoff(count, tiers.hot_percent).max(1);
    let rising = cutoff(count, tiers.rising_percent).max(hot);
    let popular = cutoff(count, tiers.popular_percent).max(rising);

    (0..count)
        .map(|rank| {
            if rank < hot {
                Some(TrendingBadge::Hot)
            } else if rank < rising {
                Some(TrendingBadge::Rising)
            } else if rank < popular {
                Some(TrendingBadge::Popular)
            } else {
                None
            }
        })
        .collect()
}

fn cutoff(count: usize, percent: u8) -> usize {
    count.saturating_mul(usize::from(percent)).div_ceil(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn tally(badges: &[Option<TrendingBadge>]) -> (usize, usize, usize, usize) {
        let count = |wanted: Option<TrendingBadge>| badges.iter().filter(|b| **b == wanted).count();
        (
            count(Some(TrendingBadge::Hot)),
            count(Some(TrendingBadge::Rising)),
            count(Some(TrendingBadge::Popular)),
            count(None),
        )
    }

    #[rstest]
    #[case(0, (0, 0, 0, 0))]
    #[case(1, (1, 0, 0, 0))]
    #[case(3, (1, 0, 0, 2))]
    #[case(10, (1, 1, 1, 7))]
    #[case(20, (1, 2, 3, 14))]
    #[case(100, (5, 10, 15, 70))]
    #[case(101, (6, 10, 15, 70))]
    fn tier_sizes_follow_percentiles(
        #[case] count: usize,
        #[case] expected: (usize, usize, usize, usize),
    ) {
        let badges = assign_badges(count, BadgeTiers::default());
        assert_eq!(badges.len(), count);
        assert_eq!(tally(&badges), expected);
    }

    #[rstest]
    fn zero_percent_tiers_still_crown_one_entity() {
        let tiers = BadgeTiers {
            hot_percent: 0,
            rising_percent: 0,
            popular_percent: 0,
        };
        assert_eq!(tally(&assign_badges(50, tiers)), (1, 0, 0, 49));
    }

    #[rstest]
    fn tiers_are_contiguous_by_rank() {
        let badges = assign_badges(37, BadgeTiers::default());
        let order = |badge: &Option<TrendingBadge>| match badge {
            Some(TrendingBadge::Hot) => 0,
            Some(TrendingBadge::Rising) => 1,
            Some(TrendingBadge::Popular) => 2,
            None => 3,
        };
        assert!(badges.windows(2).all(|pair| match pair {
            [first, second] => order(first) <= order(second),
            _ => false,
        }));
    }
}
