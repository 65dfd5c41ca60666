//! Ranked trending output.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Discrete trending label assigned by rank percentile.
///
/// # Examples
/// ```
/// use foragents_core::TrendingBadge;
///
/// assert_eq!(TrendingBadge::Hot.as_str(), "hot");
/// assert_eq!(TrendingBadge::Popular.to_string(), "popular");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TrendingBadge {
    /// The top tier.
    Hot,
    /// The tier directly below `hot`.
    Rising,
    /// The last labelled tier.
    Popular,
}

impl TrendingBadge {
    /// Return the badge as a lowercase `&str`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hot => "hot",
            Self::Rising => "rising",
            Self::Popular => "popular",
        }
    }
}

impl fmt::Display for TrendingBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entity's position in a trending ranking.
///
/// Results are recomputed on every query and never persisted.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TrendingResult {
    /// Identifier of the ranked entity.
    pub entity_id: String,
    /// Unbounded score; higher is more trending. Always finite.
    pub trending_score: f64,
    /// Badge derived from the entity's rank within the scored set.
    pub trending_badge: Option<TrendingBadge>,
}
