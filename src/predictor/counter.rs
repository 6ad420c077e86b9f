//! Implementation of a saturating counter.

use crate::branch::Outcome;
use crate::error::ConfigError;
use crate::predictor::StatefulPredictor;

/// Configuration for building a [`SaturatingCounter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaturatingCounterConfig {
    /// Lowest state
    pub min: i16,

    /// Highest state
    pub max: i16,

    /// State after a reset
    pub init: i16,

    /// The counter predicts 'taken' in any state at or above this value
    pub taken_at: i16,
}
impl SaturatingCounterConfig {
    /// A 2-bit counter in [0, 3], predicting 'taken' in the upper half.
    pub const TWO_BIT: Self = Self { min: 0, max: 3, init: 0, taken_at: 2 };

    /// A signed 8-bit counter in [-128, 127], predicting 'taken' when
    /// non-negative.
    pub const SIGNED_8BIT: Self = Self {
        min: i8::MIN as i16,
        max: i8::MAX as i16,
        init: 0,
        taken_at: 0,
    };

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ordered = self.min < self.max
            && (self.min..=self.max).contains(&self.init)
            && self.min < self.taken_at && self.taken_at <= self.max;
        if ordered {
            Ok(())
        } else {
            Err(ConfigError::CounterRange {
                min: self.min, max: self.max,
                init: self.init, taken_at: self.taken_at,
            })
        }
    }

    /// Number of bits needed to hold every state.
    pub fn storage_bits(&self) -> usize {
        let states = (self.max as i32 - self.min as i32) as u32 + 1;
        states.next_power_of_two().ilog2() as usize
    }

    pub fn build(self) -> SaturatingCounter {
        SaturatingCounter {
            cfg: self,
            state: self.init,
        }
    }
}

/// An N-bit saturating counter used to follow the behavior of a branch.
#[derive(Clone, Copy, Debug)]
pub struct SaturatingCounter {
    cfg: SaturatingCounterConfig,
    state: i16,
}
impl SaturatingCounter {
    /// The current state.
    pub fn value(&self) -> i16 { self.state }

    pub fn inc(&mut self) {
        self.state = self.state.saturating_add(1).min(self.cfg.max);
    }

    pub fn dec(&mut self) {
        self.state = self.state.saturating_sub(1).max(self.cfg.min);
    }
}

impl StatefulPredictor for SaturatingCounter {
    fn name(&self) -> &'static str { "SaturatingCounter" }

    fn predict(&self) -> Outcome {
        Outcome::from(self.state >= self.cfg.taken_at)
    }

    fn reset(&mut self) {
        self.state = self.cfg.init;
    }

    /// Count up when taken, down when not taken.
    fn update(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::T => self.inc(),
            Outcome::N => self.dec(),
        }
    }
}
