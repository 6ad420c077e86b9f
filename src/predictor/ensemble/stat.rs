/// Container for [`crate::EnsemblePredictor`] runtime stats.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnsembleStats {
    /// Conditional branches resolved
    pub updates: usize,

    /// Final (majority) mispredictions
    pub misses: usize,

    /// Mispredicted votes from the gshare table
    pub gshare_miss: usize,

    /// Mispredicted votes from the TAGE-lite tables
    pub tage_miss: usize,

    /// Mispredicted votes from the statistical corrector
    pub sc_miss: usize,
}
impl EnsembleStats {
    /// Return the hit rate of the final prediction.
    pub fn hit_rate(&self) -> f64 {
        if self.updates == 0 {
            return 0.0;
        }
        (self.updates - self.misses) as f64 / self.updates as f64
    }
}
