use crate::error::ConfigError;
use crate::predictor::PerceptronPredictor;

/// Configuration for a [`PerceptronPredictor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PerceptronConfig {
    /// Number of rows in the weight table
    pub table_size: usize,

    /// Number of global history bits (one weight per bit)
    pub history_len: usize,

    /// Training threshold after a reset
    pub initial_threshold: i32,

    /// Lower bound on the training threshold
    pub threshold_min: i32,

    /// Upper bound on the training threshold
    pub threshold_max: i32,

    /// Number of recently-resolved addresses to remember
    pub recency_depth: usize,

    /// Added to the output when the address was recently resolved
    pub recency_bonus: i32,

    /// The threshold grows after more than this many consecutive confident
    /// and correct predictions
    pub streak_limit: u32,
}

impl Default for PerceptronConfig {
    fn default() -> Self {
        Self {
            table_size: 1 << 15,
            history_len: 60,
            initial_threshold: 60,
            threshold_min: 20,
            threshold_max: 100,
            recency_depth: 16,
            recency_bonus: 10,
            streak_limit: 10,
        }
    }
}

impl PerceptronConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.table_size.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                what: "perceptron table size", size: self.table_size
            });
        }
        if self.history_len == 0 {
            return Err(ConfigError::Zero { what: "perceptron history length" });
        }

        let ordered = 0 <= self.threshold_min
            && self.threshold_min <= self.initial_threshold
            && self.initial_threshold <= self.threshold_max;
        if !ordered {
            return Err(ConfigError::ThresholdRange {
                min: self.threshold_min,
                initial: self.initial_threshold,
                max: self.threshold_max,
            });
        }

        // Weights are stored in 8 bits and clamped to the threshold
        if self.threshold_max > i8::MAX as i32 {
            return Err(ConfigError::ThresholdTooLarge { max: self.threshold_max });
        }
        Ok(())
    }

    /// Get the [approximate] number of storage bits.
    pub fn storage_bits(&self) -> usize {
        // Bias, history weights, and the path accumulator in each row
        let row_bits = (self.history_len + 2) * 8;
        let recency_bits = self.recency_depth * usize::BITS as usize;
        (row_bits * self.table_size) + self.history_len + recency_bits
    }

    /// Use this configuration to create a new [`PerceptronPredictor`].
    pub fn build(self) -> Result<PerceptronPredictor, ConfigError> {
        self.validate()?;
        Ok(PerceptronPredictor::from_config(self))
    }
}
