//! A multi-perspective perceptron predictor with an adaptive threshold.

mod config;

pub use config::*;

use itertools::Itertools;

use crate::branch::{ BranchInfo, Outcome };
use crate::error::PredictorError;
use crate::history::HistoryRegister;
use crate::predictor::*;

/// One row of the weight table: a perceptron [with integer weights] over
/// global history, plus a path accumulator.
///
/// See the following papers:
///
/// - "Neural Methods for Dynamic Branch Prediction" (Jiménez and Lin, 2002)
/// - "Fast Path-Based Neural Branch Prediction" (Jiménez, 2003)
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Perceptron {
    bias: i8,
    weights: Box<[i8]>,
    path: i8,
}
impl Perceptron {
    pub fn new(history_len: usize) -> Self {
        Self {
            bias: 0,
            weights: vec![0; history_len].into_boxed_slice(),
            path: 0,
        }
    }

    /// Reset the state.
    pub fn reset(&mut self) {
        self.bias = 0;
        self.weights.fill(0);
        self.path = 0;
    }

    pub fn bias(&self) -> i8 { self.bias }

    /// Return a reference to the list of history weights.
    /// Weight 'i' is paired with history bit 'i'.
    pub fn weights(&self) -> &[i8] { &self.weights }

    pub fn path(&self) -> i8 { self.path }

    /// Compute the bias plus the dot product of the weights and the history,
    /// where a set history bit counts as '+1' and a clear bit as '-1'.
    pub fn output(&self, ghr: &HistoryRegister) -> i32 {
        self.weights.iter()
            .zip_eq(ghr.data().iter().by_vals())
            .fold(self.bias as i32, |sum, (w, bit)| {
                if bit { sum + *w as i32 } else { sum - *w as i32 }
            })
    }

    /// Move every weight by 'rate' toward agreement with 'outcome', and the
    /// path accumulator by one. Everything is clamped to [-limit, limit].
    pub fn train(&mut self,
        ghr: &HistoryRegister,
        outcome: Outcome,
        rate: i32,
        limit: i32,
    )
    {
        let clamp = |x: i32| x.clamp(-limit, limit) as i8;

        self.bias = clamp(self.bias as i32 + rate * outcome.sign());
        for (w, bit) in self.weights.iter_mut().zip_eq(ghr.data().iter().by_vals()) {
            let adj = if Outcome::from(bit) == outcome { rate } else { -rate };
            *w = clamp(*w as i32 + adj);
        }
        self.path = clamp(self.path as i32 + outcome.sign());
    }
}

/// The table of [`Perceptron`] rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PerceptronTable {
    data: Vec<Perceptron>,
}
impl PerceptronTable {
    pub fn new(size: usize, history_len: usize) -> Self {
        assert!(size.is_power_of_two());
        Self { data: vec![Perceptron::new(history_len); size] }
    }

    pub fn reset(&mut self) {
        self.data.iter_mut().for_each(|p| p.reset());
    }

    pub fn iter(&self) -> impl Iterator<Item = &Perceptron> {
        self.data.iter()
    }
}
impl PredictorTable for PerceptronTable {
    type Entry = Perceptron;

    fn size(&self) -> usize { self.data.len() }

    fn get_entry(&self, idx: usize) -> &Perceptron {
        let index = idx & self.index_mask();
        &self.data[index]
    }

    fn get_entry_mut(&mut self, idx: usize) -> &mut Perceptron {
        let index = idx & self.index_mask();
        &mut self.data[index]
    }
}

/// State captured by [`PerceptronPredictor::predict`] for a conditional
/// branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PerceptronMeta {
    /// Row used to make the prediction
    pub index: usize,

    /// The output value; the prediction is the sign
    pub sum: i32,
}

/// Container for [`PerceptronPredictor`] runtime stats.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PerceptronStats {
    /// Conditional branches resolved
    pub updates: usize,

    /// Conditional branches mispredicted
    pub mispredictions: usize,

    /// Updates that trained the weights
    pub trainings: usize,

    /// Number of times the threshold was raised
    pub threshold_bumps: usize,
}

/// A perceptron predictor combining several perspectives on a branch:
/// global history, per-row path bias, and whether the branch was resolved
/// recently.
///
/// The training threshold adapts: long runs of confident, correct
/// predictions raise it, which both widens the range of the weights and
/// makes more predictions count as low-confidence.
#[derive(Clone, Debug)]
pub struct PerceptronPredictor {
    /// The configuration used to create this object
    cfg: PerceptronConfig,

    table: PerceptronTable,
    ghr: HistoryRegister,
    recency: RecencyStack,

    /// Current training threshold
    threshold: i32,

    /// Consecutive confident and correct predictions
    streak: u32,

    inflight: InFlight,
    stat: PerceptronStats,
}

impl PerceptronPredictor {
    /// Create a predictor with the default configuration.
    pub fn new() -> Self {
        Self::from_config(PerceptronConfig::default())
    }

    /// Expects a validated configuration.
    pub(crate) fn from_config(cfg: PerceptronConfig) -> Self {
        Self {
            table: PerceptronTable::new(cfg.table_size, cfg.history_len),
            ghr: HistoryRegister::new(cfg.history_len),
            recency: RecencyStack::new(cfg.recency_depth),
            threshold: cfg.initial_threshold,
            streak: 0,
            inflight: InFlight::new(),
            stat: PerceptronStats::default(),
            cfg,
        }
    }

    pub fn config(&self) -> &PerceptronConfig { &self.cfg }
    pub fn stats(&self) -> &PerceptronStats { &self.stat }
    pub fn threshold(&self) -> i32 { self.threshold }
    pub fn correct_streak(&self) -> u32 { self.streak }
    pub fn recency(&self) -> &RecencyStack { &self.recency }
    pub fn history(&self) -> &HistoryRegister { &self.ghr }
    pub fn table(&self) -> &PerceptronTable { &self.table }

    /// Return the row at 'index'.
    pub fn row(&self, index: usize) -> &Perceptron {
        self.table.get_entry(index)
    }

    /// Select a row with the program counter and the global history.
    fn index(&self, pc: usize) -> usize {
        self.table.get_index(pc ^ (self.ghr.low_bits() << 1) ^ (pc >> 2))
    }

    fn output(&self, pc: usize, index: usize) -> i32 {
        let row = self.table.get_entry(index);
        let mut sum = row.output(&self.ghr);

        let path_sign = if pc % 2 == 0 { 1 } else { -1 };
        sum += row.path() as i32 * path_sign;

        if self.recency.contains(pc) {
            sum += self.cfg.recency_bonus;
        }
        sum
    }

    fn train(&mut self, pc: usize, meta: PerceptronMeta, outcome: Outcome) {
        let PerceptronMeta { index, sum } = meta;
        let predicted = Outcome::from(sum >= 0);
        let magnitude = sum.abs();

        self.stat.updates += 1;
        let miss = predicted != outcome;
        if miss {
            self.stat.mispredictions += 1;
        }

        // Training occurs after a misprediction, or when the output value is
        // not above the threshold. Very weak outputs train twice as hard.
        if miss || magnitude <= self.threshold {
            let rate = if magnitude <= self.threshold / 2 { 2 } else { 1 };
            self.table.get_entry_mut(index)
                .train(&self.ghr, outcome, rate, self.threshold);
            self.streak = 0;
            self.stat.trainings += 1;
        }
        else {
            self.streak += 1;
            if self.streak > self.cfg.streak_limit {
                let next = (self.threshold + 1).min(self.cfg.threshold_max);
                if next != self.threshold {
                    log::debug!("perceptron threshold {} -> {}", self.threshold, next);
                    self.stat.threshold_bumps += 1;
                }
                self.threshold = next;
                self.streak = 0;
            }
        }

        self.recency.push(pc);
        self.ghr.push(outcome);
    }
}

impl Default for PerceptronPredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl BranchPredictor for PerceptronPredictor {
    type Meta = PerceptronMeta;

    fn name(&self) -> &'static str { "PerceptronPredictor" }

    fn reset(&mut self) {
        log::debug!("resetting {}", self.name());
        self.table.reset();
        self.ghr.reset();
        self.recency.clear();
        self.threshold = self.cfg.initial_threshold;
        self.streak = 0;
        self.inflight.clear();
        self.stat = PerceptronStats::default();
    }

    fn predict(&mut self, branch: BranchInfo) -> Prediction<PerceptronMeta> {
        let ticket = self.inflight.issue(branch);
        if branch.is_unconditional() {
            return Prediction { ticket, outcome: Outcome::T, meta: None };
        }

        let index = self.index(branch.pc);
        let sum = self.output(branch.pc, index);
        Prediction {
            ticket,
            outcome: Outcome::from(sum >= 0),
            meta: Some(PerceptronMeta { index, sum }),
        }
    }

    fn update(&mut self,
        prediction: &Prediction<PerceptronMeta>,
        outcome: Outcome,
        _target: usize,
    ) -> Result<(), PredictorError>
    {
        let branch = self.inflight.resolve(prediction.ticket)?;
        if let Some(meta) = prediction.meta {
            self.train(branch.pc, meta, outcome);
        }
        Ok(())
    }
}
