//! Error types.

use thiserror::Error;

use crate::predictor::Ticket;

/// Errors reported when building a predictor from a configuration.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{what} must be a power of two (got {size})")]
    NotPowerOfTwo { what: &'static str, size: usize },

    #[error("{what} must be non-zero")]
    Zero { what: &'static str },

    #[error("{what} must be less than {limit} bits (got {bits})")]
    TooWide { what: &'static str, bits: usize, limit: usize },

    #[error("history ({history_bits} bits) is wider than the table index ({table_bits} bits)")]
    HistoryWiderThanTable { history_bits: usize, table_bits: usize },

    #[error("threshold range is inconsistent (min {min}, initial {initial}, max {max})")]
    ThresholdRange { min: i32, initial: i32, max: i32 },

    #[error("maximum threshold {max} does not fit an 8-bit weight")]
    ThresholdTooLarge { max: i32 },

    #[error("counter range is inconsistent (min {min}, init {init}, taken at {taken_at}, max {max})")]
    CounterRange { min: i16, max: i16, init: i16, taken_at: i16 },
}

/// Errors reported by [`crate::BranchPredictor::update`].
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum PredictorError {
    #[error("update without a prediction in flight")]
    NoPendingPrediction,

    #[error("prediction {found} is not the one in flight ({expected})")]
    MismatchedPrediction { expected: Ticket, found: Ticket },
}
