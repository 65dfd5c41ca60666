//! Tunable parameters for trending computation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::TrendingConfigError;

/// Exponential decay applied to engagement events by age.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecayParams {
    /// Age in days at which an event's weight halves.
    pub half_life_days: f64,
    /// Events older than this many days contribute nothing.
    pub max_age_days: f64,
}

impl Default for DecayParams {
    fn default() -> Self {
        Self {
            half_life_days: 3.0_f64,
            max_age_days: 21.0_f64,
        }
    }
}

impl DecayParams {
    /// Validate the parameters and return a copy.
    ///
    /// # Errors
    /// Returns [`TrendingConfigError::InvalidDecay`] when either value is not
    /// finite or not strictly positive.
    pub fn validate(self) -> Result<Self, TrendingConfigError> {
        for (name, value) in [
            ("halfLifeDays", self.half_life_days),
            ("maxAgeDays", self.max_age_days),
        ] {
            if !value.is_finite() || value <= 0.0_f64 {
                return Err(TrendingConfigError::InvalidDecay { name, value });
            }
        }
        Ok(self)
    }
}

/// Multipliers applied to each signal in the trending score.
///
/// Recency-decayed installs outweigh lifetime installs, which outweigh every
/// other signal: the ranking favours what is hot lately over what has been
/// popular all-time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingWeights {
    /// Weight on `log1p(installs_total)`.
    pub installs_total: f64,
    /// Weight on `log1p(views_total)`.
    pub views_total: f64,
    /// Weight on `log1p(comments_total)`.
    pub comments_total: f64,
    /// Weight on `log1p(ratings_count)`.
    pub ratings_count: f64,
    /// Weight on `log1p(installs_decay)`.
    pub installs_decay: f64,
    /// Weight on `log1p(views_decay)`.
    pub views_decay: f64,
    /// Weight on `log1p(comments_decay)`.
    pub comments_decay: f64,
    /// Weight on `log1p(ratings_decay)`.
    pub ratings_decay: f64,
    /// Weight on `rating_quality * log1p(ratings_count)`.
    pub rating_quality: f64,
    /// Baseline contribution per tag.
    pub tag_baseline: f64,
    /// Baseline contribution for verified entities.
    pub verified_baseline: f64,
}

impl Default for TrendingWeights {
    fn default() -> Self {
        Self {
            installs_total: 12.0_f64,
            views_total: 3.0_f64,
            comments_total: 2.0_f64,
            ratings_count: 2.5_f64,
            installs_decay: 20.0_f64,
            views_decay: 7.0_f64,
            comments_decay: 6.0_f64,
            ratings_decay: 6.0_f64,
            rating_quality: 5.0_f64,
            tag_baseline: 0.05_f64,
            verified_baseline: 0.15_f64,
        }
    }
}

impl TrendingWeights {
    /// Validate the weights and return a copy.
    ///
    /// # Errors
    /// Returns [`TrendingConfigError::InvalidWeight`] for the first weight
    /// that is negative or not finite.
    pub fn validate(self) -> Result<Self, TrendingConfigError> {
        match self
            .named()
            .into_iter()
            .find(|(_, value)| !value.is_finite() || *value < 0.0_f64)
        {
            Some((name, value)) => Err(TrendingConfigError::InvalidWeight { name, value }),
            None => Ok(self),
        }
    }

    const fn named(self) -> [(&'static str, f64); 11] {
        [
            ("installsTotal", self.installs_total),
            ("viewsTotal", self.views_total),
            ("commentsTotal", self.comments_total),
            ("ratingsCount", self.ratings_count),
            ("installsDecay", self.installs_decay),
            ("viewsDecay", self.views_decay),
            ("commentsDecay", self.comments_decay),
            ("ratingsDecay", self.ratings_decay),
            ("ratingQuality", self.rating_quality),
            ("tagBaseline", self.tag_baseline),
            ("verifiedBaseline", self.verified_baseline),
        ]
    }
}

/// Cumulative rank percentages that earn each badge.
///
/// With the defaults, the top 5% (at least one entity) are `hot`, ranks up
/// to 15% are `rising`, and ranks up to 30% are `popular`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeTiers {
    /// Cumulative percentage of ranks labelled `hot`.
    pub hot_percent: u8,
    /// Cumulative percentage of ranks labelled `hot` or `rising`.
    pub rising_percent: u8,
    /// Cumulative percentage of ranks carrying any badge.
    pub popular_percent: u8,
}

impl Default for BadgeTiers {
    fn default() -> Self {
        Self {
            hot_percent: 5,
            rising_percent: 15,
            popular_percent: 30,
        }
    }
}

impl fmt::Display for BadgeTiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.hot_percent, self.rising_percent, self.popular_percent
        )
    }
}

impl BadgeTiers {
    /// Validate the tiers and return a copy.
    ///
    /// # Errors
    /// Returns [`TrendingConfigError::InvalidTiers`] unless
    /// `hot <= rising <= popular <= 100`.
    pub const fn validate(self) -> Result<Self, TrendingConfigError> {
        if self.hot_percent <= self.rising_percent
            && self.rising_percent <= self.popular_percent
            && self.popular_percent <= 100
        {
            Ok(self)
        } else {
            Err(TrendingConfigError::InvalidTiers { tiers: self })
        }
    }
}

/// Complete configuration for a [`TrendingScorer`](crate::TrendingScorer).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrendingConfig {
    /// Recency decay parameters.
    pub decay: DecayParams,
    /// Signal weights.
    pub weights: TrendingWeights,
    /// Badge percentiles.
    pub tiers: BadgeTiers,
}

impl TrendingConfig {
    /// Validate every component and return a copy.
    ///
    /// # Errors
    /// Propagates the first component validation failure.
    pub fn validate(self) -> Result<Self, TrendingConfigError> {
        Ok(Self {
            decay: self.decay.validate()?,
            weights: self.weights.validate()?,
            tiers: self.tiers.validate()?,
        })
    }
}
