//! Types for implementing a table of predictors.

use crate::branch::Outcome;
use crate::predictor::*;

/// Interface to a table of predictors.
///
/// Every table has a power-of-two number of entries, and every index is
/// masked down to the size of the table. Different inputs are expected to
/// alias onto the same entry.
pub trait PredictorTable {
    /// The type of entry in the table.
    type Entry;

    /// Returns the number of entries in the table.
    fn size(&self) -> usize;

    /// Returns a reference to an entry in the table.
    fn get_entry(&self, idx: usize) -> &Self::Entry;

    /// Returns a mutable reference to an entry in the table.
    fn get_entry_mut(&mut self, idx: usize) -> &mut Self::Entry;

    /// Returns a bitmask corresponding to the number of entries in the table.
    fn index_mask(&self) -> usize {
        debug_assert!(self.size().is_power_of_two());
        self.size() - 1
    }

    /// Reduce some hash into an index for this table.
    fn get_index(&self, hash: usize) -> usize {
        hash & self.index_mask()
    }
}

/// A table of [`SaturatingCounter`].
#[derive(Clone, Debug)]
pub struct CounterTable {
    /// Saturating counter configuration
    cfg: SaturatingCounterConfig,

    /// Table of counters
    data: Vec<SaturatingCounter>,
}
impl CounterTable {
    pub fn new(size: usize, cfg: SaturatingCounterConfig) -> Self {
        assert!(size.is_power_of_two());
        Self {
            cfg,
            data: vec![cfg.build(); size],
        }
    }

    /// Returns the configuration shared by all counters.
    pub fn counter_config(&self) -> SaturatingCounterConfig { self.cfg }

    /// Return the predicted direction of the counter at 'idx'.
    pub fn predict(&self, idx: usize) -> Outcome {
        self.get_entry(idx).predict()
    }

    /// Train the counter at 'idx' with some outcome.
    pub fn update(&mut self, idx: usize, outcome: Outcome) {
        self.get_entry_mut(idx).update(outcome);
    }

    /// Reset every counter in the table.
    pub fn reset(&mut self) {
        self.data.iter_mut().for_each(|c| c.reset());
    }

    /// Iterate over the state of every counter.
    pub fn values(&self) -> impl Iterator<Item = i16> + '_ {
        self.data.iter().map(|c| c.value())
    }

    /// Get the [approximate] number of storage bits.
    pub fn storage_bits(&self) -> usize {
        self.cfg.storage_bits() * self.size()
    }
}

impl PredictorTable for CounterTable {
    type Entry = SaturatingCounter;

    fn size(&self) -> usize { self.data.len() }

    fn get_entry(&self, idx: usize) -> &SaturatingCounter {
        let index = idx & self.index_mask();
        &self.data[index]
    }

    fn get_entry_mut(&mut self, idx: usize) -> &mut SaturatingCounter {
        let index = idx & self.index_mask();
        &mut self.data[index]
    }
}
