//! Error types raised while configuring the trending scorer.

use thiserror::Error;

use crate::BadgeTiers;

/// Errors raised when a [`TrendingConfig`](crate::TrendingConfig) is invalid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrendingConfigError {
    /// A decay parameter was not finite or not strictly positive.
    #[error("decay parameter {name} must be a positive finite number (got {value})")]
    InvalidDecay {
        /// Name of the offending parameter.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// A signal weight was negative or not finite.
    #[error("weight {name} must be a non-negative finite number (got {value})")]
    InvalidWeight {
        /// Name of the offending weight.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// Badge percentages were out of order or above 100.
    #[error("badge tiers must satisfy hot <= rising <= popular <= 100 (got {tiers})")]
    InvalidTiers {
        /// Rejected tiers.
        tiers: BadgeTiers,
    },
}
