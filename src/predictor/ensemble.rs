//! An ensemble of gshare, TAGE-lite, and a statistical corrector.
//!
//! The "TAGE-lite" tables are only loosely inspired by TAGE: there are no
//! tags and no geometric history lengths, just differently-hashed tables of
//! saturating counters. See "A case for (partially) TAgged GEometric history
//! length branch prediction" (Seznec, 2006) for the real thing.

mod config;
mod stat;

pub use config::*;
pub use stat::*;

use crate::branch::{ BranchInfo, Outcome };
use crate::error::PredictorError;
use crate::history::HistoryRegister;
use crate::predictor::*;

/// State captured by [`EnsemblePredictor::predict`] for a conditional
/// branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnsembleMeta {
    /// Index into the gshare table
    pub gshare_idx: usize,

    /// Index into each TAGE-lite table
    pub tage_idx: [usize; TAGE_TABLES],

    /// Vote from the gshare table
    pub gshare: Outcome,

    /// Vote from the TAGE-lite tables
    pub tage: Outcome,

    /// Vote from the statistical corrector
    pub sc: Outcome,
}

/// Majority vote of a gshare table, a bank of TAGE-lite tables, and a
/// statistical corrector.
///
/// Every table is a plain array of saturating counters. Indices are never
/// checked for collisions: aliasing between branches is expected.
#[derive(Clone, Debug)]
pub struct EnsemblePredictor {
    /// The configuration used to create this object
    cfg: EnsembleConfig,

    ghr: HistoryRegister,
    gshare: CounterTable,
    tage: [CounterTable; TAGE_TABLES],
    sc: CounterTable,

    inflight: InFlight,
    stat: EnsembleStats,
}

impl EnsemblePredictor {
    /// Create a predictor with the default configuration.
    pub fn new() -> Self {
        Self::from_config(EnsembleConfig::default())
    }

    /// Expects a validated configuration.
    pub(crate) fn from_config(cfg: EnsembleConfig) -> Self {
        Self {
            ghr: HistoryRegister::new(cfg.history_bits),
            gshare: CounterTable::new(cfg.table_size(), cfg.gshare_ctr),
            tage: std::array::from_fn(|_| {
                CounterTable::new(cfg.table_size(), cfg.tage_ctr)
            }),
            sc: CounterTable::new(cfg.sc_size(), cfg.sc_ctr),
            inflight: InFlight::new(),
            stat: EnsembleStats::default(),
            cfg,
        }
    }

    pub fn config(&self) -> &EnsembleConfig { &self.cfg }
    pub fn stats(&self) -> &EnsembleStats { &self.stat }
    pub fn history(&self) -> &HistoryRegister { &self.ghr }
    pub fn gshare(&self) -> &CounterTable { &self.gshare }
    pub fn tage(&self) -> &[CounterTable; TAGE_TABLES] { &self.tage }
    pub fn corrector(&self) -> &CounterTable { &self.sc }

    fn gshare_index(&self, pc: usize) -> usize {
        let shift = self.cfg.table_bits - self.cfg.history_bits;
        let hist = self.ghr.low_bits() << shift;
        self.gshare.get_index(hist ^ (pc & self.gshare.index_mask()))
    }

    /// NOTE: With the default parameters, the index into table 0 is the
    /// same as the gshare index.
    fn tage_index(&self, table: usize, pc: usize) -> usize {
        self.tage[table].get_index((pc >> table) ^ self.ghr.low_bits())
    }

    fn sc_index(&self, pc: usize) -> usize {
        self.sc.get_index(pc ^ self.ghr.low_bits())
    }

    /// Every index is computed, but the vote comes from the first table
    /// predicting 'taken'. When no table predicts 'taken', neither does
    /// the vote.
    fn tage_vote(&self, pc: usize) -> ([usize; TAGE_TABLES], Outcome) {
        let idx: [usize; TAGE_TABLES] = std::array::from_fn(|i| {
            self.tage_index(i, pc)
        });
        let hit = self.tage.iter().zip(idx.iter())
            .any(|(table, i)| table.predict(*i) == Outcome::T);
        (idx, Outcome::from(hit))
    }

    fn train(&mut self, pc: usize, meta: EnsembleMeta, outcome: Outcome) {
        self.gshare.update(meta.gshare_idx, outcome);

        // All tables are trained, including those the prediction never
        // looked at.
        for (table, idx) in self.tage.iter_mut().zip(meta.tage_idx) {
            table.update(idx, outcome);
        }

        // History hasn't moved since the prediction
        let sc_idx = self.sc_index(pc);
        self.sc.update(sc_idx, outcome);

        self.stat.updates += 1;
        let votes = [
            (meta.gshare, &mut self.stat.gshare_miss),
            (meta.tage, &mut self.stat.tage_miss),
            (meta.sc, &mut self.stat.sc_miss),
        ];
        for (vote, miss) in votes {
            if vote != outcome {
                *miss += 1;
            }
        }
        if Self::majority(&meta) != outcome {
            self.stat.misses += 1;
        }

        self.ghr.push(outcome);
    }

    fn majority(meta: &EnsembleMeta) -> Outcome {
        let vote = meta.gshare.sign() + meta.tage.sign() + meta.sc.sign();
        Outcome::from(vote > 0)
    }
}

impl Default for EnsemblePredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl BranchPredictor for EnsemblePredictor {
    type Meta = EnsembleMeta;

    fn name(&self) -> &'static str { "EnsemblePredictor" }

    fn reset(&mut self) {
        log::debug!("resetting {}", self.name());
        self.ghr.reset();
        self.gshare.reset();
        self.tage.iter_mut().for_each(|t| t.reset());
        self.sc.reset();
        self.inflight.clear();
        self.stat = EnsembleStats::default();
    }

    fn predict(&mut self, branch: BranchInfo) -> Prediction<EnsembleMeta> {
        let ticket = self.inflight.issue(branch);
        if branch.is_unconditional() {
            return Prediction { ticket, outcome: Outcome::T, meta: None };
        }

        let pc = branch.pc;
        let gshare_idx = self.gshare_index(pc);
        let (tage_idx, tage) = self.tage_vote(pc);
        let meta = EnsembleMeta {
            gshare_idx,
            tage_idx,
            gshare: self.gshare.predict(gshare_idx),
            tage,
            sc: self.sc.predict(self.sc_index(pc)),
        };
        Prediction {
            ticket,
            outcome: Self::majority(&meta),
            meta: Some(meta),
        }
    }

    fn update(&mut self,
        prediction: &Prediction<EnsembleMeta>,
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

#[cfg(test)]
mod test {
    use super::*;
    use crate::branch::BranchKind;
    use crate::error::ConfigError;
    use proptest::prelude::*;
    use rand::{ Rng, SeedableRng };
    use rand::rngs::StdRng;

    fn small_config() -> EnsembleConfig {
        EnsembleConfig {
            history_bits: 4,
            table_bits: 6,
            sc_bits: 3,
            ..EnsembleConfig::default()
        }
    }

    fn resolve(p: &mut EnsemblePredictor, pc: usize, outcome: Outcome)
        -> Prediction<EnsembleMeta>
    {
        let pred = p.predict(BranchInfo::conditional(pc));
        p.update(&pred, outcome, 0).unwrap();
        pred
    }

    fn assert_bounded(p: &EnsemblePredictor) {
        assert!(p.gshare().values().all(|v| (0..=3).contains(&v)));
        for t in p.tage() {
            assert!(t.values().all(|v| (0..=3).contains(&v)));
        }
        assert!(p.corrector().values().all(|v| (-128..=127).contains(&v)));
    }

    #[test]
    fn default_config_is_valid() {
        let p = EnsembleConfig::default().build().unwrap();
        assert_eq!(p.gshare().size(), 32768);
        assert!(p.tage().iter().all(|t| t.size() == 32768));
        assert_eq!(p.corrector().size(), 64);
        assert_eq!(p.history().len(), 15);
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let cfg = EnsembleConfig { history_bits: 8, table_bits: 6, ..small_config() };
        assert!(matches!(cfg.build(), Err(ConfigError::HistoryWiderThanTable { .. })));

        let cfg = EnsembleConfig { sc_bits: 0, ..small_config() };
        assert!(matches!(cfg.build(), Err(ConfigError::Zero { .. })));

        let cfg = EnsembleConfig { table_bits: 64, ..small_config() };
        assert!(matches!(cfg.build(), Err(ConfigError::TooWide { .. })));

        let bad_ctr = SaturatingCounterConfig { min: 3, max: 0, init: 0, taken_at: 2 };
        let cfg = EnsembleConfig { tage_ctr: bad_ctr, ..small_config() };
        assert!(matches!(cfg.build(), Err(ConfigError::CounterRange { .. })));
    }

    #[test]
    fn fresh_predictor_predicts_not_taken() {
        let mut p = EnsemblePredictor::new();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..32 {
            let pc = rng.gen::<u32>() as usize;
            let pred = p.predict(BranchInfo::conditional(pc));
            let meta = *pred.meta().unwrap();
            assert_eq!(meta.gshare, Outcome::N);
            assert_eq!(meta.tage, Outcome::N);
            assert_eq!(meta.sc, Outcome::T);
            assert_eq!(pred.outcome(), Outcome::N);
            assert_eq!(pred.target(), 0);

            // Put the predictor back the way it was
            p.inflight.clear();
        }
    }

    #[test]
    fn unconditional_branches_leave_state_unchanged() {
        let mut p = small_config().build().unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            resolve(&mut p, rng.gen_range(0..1024), rng.gen::<bool>().into());
        }
        let snapshot = |p: &EnsemblePredictor| {
            let tage: Vec<Vec<i16>> = p.tage().iter()
                .map(|t| t.values().collect())
                .collect();
            (
                p.gshare().values().collect::<Vec<_>>(),
                tage,
                p.corrector().values().collect::<Vec<_>>(),
                p.history().clone(),
                p.stats().clone(),
            )
        };
        let before = snapshot(&p);

        for kind in [BranchKind::DirectJump, BranchKind::DirectCall, BranchKind::Return] {
            let pred = p.predict(BranchInfo::new(0x88, kind));
            assert_eq!(pred.outcome(), Outcome::T);
            p.update(&pred, Outcome::N, 0x99).unwrap();
        }
        assert!(before == snapshot(&p));
    }

    #[test]
    fn table_zero_aliases_gshare_by_default() {
        let mut p = EnsemblePredictor::new();
        for (i, pc) in [0x1234usize, 0xdead_beef, 0x40_0000].into_iter().enumerate() {
            let pred = resolve(&mut p, pc, Outcome::from(i % 2 == 0));
            let meta = pred.meta().unwrap();
            assert_eq!(meta.tage_idx[0], meta.gshare_idx);
        }
    }

    #[test]
    fn every_tage_table_is_trained() {
        let mut p = EnsemblePredictor::new();
        let pc = 0x10;

        // Table 0 predicts taken, which ends the scan
        p.tage[0].update(0x10, Outcome::T);
        p.tage[0].update(0x10, Outcome::T);

        let pred = p.predict(BranchInfo::conditional(pc));
        let meta = *pred.meta().unwrap();
        assert_eq!(meta.tage, Outcome::T);
        assert_eq!(meta.tage_idx, [0x10, 0x8, 0x4, 0x2]);
        p.update(&pred, Outcome::T, 0).unwrap();

        assert_eq!(p.tage()[0].get_entry(0x10).value(), 3);
        assert_eq!(p.tage()[1].get_entry(0x8).value(), 1);
        assert_eq!(p.tage()[2].get_entry(0x4).value(), 1);
        assert_eq!(p.tage()[3].get_entry(0x2).value(), 1);
        assert_eq!(p.gshare().get_entry(0x10).value(), 1);
        assert_eq!(p.corrector().get_entry(0x10).value(), 1);
    }

    #[test]
    fn any_taken_tage_table_votes_taken() {
        let mut p = EnsemblePredictor::new();
        p.tage[3].update(0x2, Outcome::T);
        p.tage[3].update(0x2, Outcome::T);
        let pred = p.predict(BranchInfo::conditional(0x10));
        assert_eq!(pred.meta().unwrap().tage, Outcome::T);

        // TAGE and the corrector outvote gshare
        assert_eq!(pred.outcome(), Outcome::T);
    }

    #[test]
    fn majority_vote() {
        let mut p = EnsemblePredictor::new();
        let pc = 0x300;

        // gshare taken, TAGE not taken, corrector taken (non-negative)
        p.gshare.update(pc, Outcome::T);
        p.gshare.update(pc, Outcome::T);
        let pred = p.predict(BranchInfo::conditional(pc));
        let meta = *pred.meta().unwrap();
        assert_eq!((meta.gshare, meta.tage, meta.sc), (Outcome::T, Outcome::N, Outcome::T));
        assert_eq!(pred.outcome(), Outcome::T);
        p.update(&pred, Outcome::N, 0).unwrap();

        assert_eq!(p.stats().misses, 1);
        assert_eq!(p.stats().gshare_miss, 1);
        assert_eq!(p.stats().tage_miss, 0);
        assert_eq!(p.stats().sc_miss, 1);
    }

    #[test]
    fn corrector_is_indexed_with_unshifted_history() {
        let mut p = EnsemblePredictor::new();
        let pc = 0x7b;
        let pred = resolve(&mut p, pc, Outcome::N);
        assert!(pred.meta().is_some());
        assert_eq!(p.corrector().get_entry(pc & 0x3f).value(), -1);
        assert_eq!(p.history().low_bits(), 0);
    }

    #[test]
    fn history_is_masked() {
        let mut p = EnsemblePredictor::new();
        for _ in 0..20 {
            resolve(&mut p, 0x40, Outcome::T);
        }
        assert_eq!(p.history().low_bits(), 0x7fff);
        resolve(&mut p, 0x40, Outcome::N);
        assert_eq!(p.history().low_bits(), 0x7ffe);
    }

    #[test]
    fn learns_a_biased_branch() {
        let mut p = EnsemblePredictor::new();
        for _ in 0..64 {
            resolve(&mut p, 0x1000, Outcome::T);
        }
        let pred = p.predict(BranchInfo::conditional(0x1000));
        assert_eq!(pred.outcome(), Outcome::T);
        p.update(&pred, Outcome::T, 0).unwrap();

        // Misses are limited to warming up the history
        assert!(p.stats().misses < 24);
        assert!(p.stats().hit_rate() > 0.6);
    }

    #[test]
    fn out_of_order_updates_are_rejected() {
        let mut p = small_config().build().unwrap();
        let first = resolve(&mut p, 0x40, Outcome::T);
        assert_eq!(p.update(&first, Outcome::T, 0),
            Err(PredictorError::NoPendingPrediction)
        );
        let second = p.predict(BranchInfo::conditional(0x44));
        assert!(p.update(&first, Outcome::N, 0).is_err());
        assert_eq!(p.stats().updates, 1);
        p.update(&second, Outcome::N, 0).unwrap();
        assert_eq!(p.stats().updates, 2);
    }

    #[test]
    fn predictions_belong_to_one_instance() {
        let mut a = EnsemblePredictor::new();
        let mut b = EnsemblePredictor::new();
        let pa = a.predict(BranchInfo::conditional(0x1234));
        let pb = b.predict(BranchInfo::conditional(0x40));
        assert_eq!(pa.ticket().seq, pb.ticket().seq);

        assert_eq!(b.update(&pa, Outcome::T, 0),
            Err(PredictorError::MismatchedPrediction {
                expected: pb.ticket(), found: pa.ticket(),
            })
        );
        assert!(b.gshare().values().all(|v| v == 0));
        assert!(b.corrector().values().all(|v| v == 0));
        assert_eq!(b.stats().updates, 0);

        b.update(&pb, Outcome::T, 0).unwrap();
        a.update(&pa, Outcome::T, 0).unwrap();
    }

    #[test]
    fn reset_restores_fresh_state() {
        let mut p = small_config().build().unwrap();
        for i in 0..200 {
            resolve(&mut p, i * 4, Outcome::from(i % 3 != 0));
        }
        p.reset();
        assert!(p.gshare().values().all(|v| v == 0));
        assert!(p.tage().iter().all(|t| t.values().all(|v| v == 0)));
        assert!(p.corrector().values().all(|v| v == 0));
        assert_eq!(p.history().low_bits(), 0);
        assert_eq!(p.stats(), &EnsembleStats::default());
    }

    proptest! {
        #[test]
        fn counters_stay_bounded(
            steps in prop::collection::vec((0usize..4096, any::<bool>()), 1..600)
        ) {
            let mut p = small_config().build().unwrap();
            for (pc, taken) in steps {
                resolve(&mut p, pc, Outcome::from(taken));
            }
            assert_bounded(&p);
        }

        #[test]
        fn corrector_saturates(n in 130usize..400, taken in any::<bool>()) {
            // History stays constant when every outcome is not-taken, so the
            // same corrector entry keeps being trained.
            let mut p = small_config().build().unwrap();
            for _ in 0..n {
                resolve(&mut p, 0x5, Outcome::N);
            }
            prop_assert_eq!(p.corrector().get_entry(0x5).value(), -128);
            resolve(&mut p, 0x5, Outcome::from(taken));
            assert_bounded(&p);
        }
    }
}
