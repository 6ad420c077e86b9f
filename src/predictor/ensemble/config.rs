use crate::error::ConfigError;
use crate::predictor::*;

/// Number of TAGE-lite tables in an [`EnsemblePredictor`].
pub const TAGE_TABLES: usize = 4;

/// Configuration for an [`EnsemblePredictor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnsembleConfig {
    /// Number of global history bits
    pub history_bits: usize,

    /// log2(entries) of the gshare table and each TAGE-lite table
    pub table_bits: usize,

    /// log2(entries) of the statistical corrector
    pub sc_bits: usize,

    /// Parameters for the gshare counters
    pub gshare_ctr: SaturatingCounterConfig,

    /// Parameters for the TAGE-lite counters
    pub tage_ctr: SaturatingCounterConfig,

    /// Parameters for the statistical corrector counters
    pub sc_ctr: SaturatingCounterConfig,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            history_bits: 15,
            table_bits: 15,
            sc_bits: 6,
            gshare_ctr: SaturatingCounterConfig::TWO_BIT,
            tage_ctr: SaturatingCounterConfig::TWO_BIT,
            sc_ctr: SaturatingCounterConfig::SIGNED_8BIT,
        }
    }
}

impl EnsembleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limit = usize::BITS as usize;
        let widths = [
            ("history length", self.history_bits),
            ("table index", self.table_bits),
            ("corrector index", self.sc_bits),
        ];
        for (what, bits) in widths {
            if bits == 0 {
                return Err(ConfigError::Zero { what });
            }
            if bits >= limit {
                return Err(ConfigError::TooWide { what, bits, limit });
            }
        }

        // History is shifted up to line up with the top of the gshare index
        if self.history_bits > self.table_bits {
            return Err(ConfigError::HistoryWiderThanTable {
                history_bits: self.history_bits,
                table_bits: self.table_bits,
            });
        }

        self.gshare_ctr.validate()?;
        self.tage_ctr.validate()?;
        self.sc_ctr.validate()?;
        Ok(())
    }

    pub fn table_size(&self) -> usize { 1 << self.table_bits }
    pub fn sc_size(&self) -> usize { 1 << self.sc_bits }

    /// Get the [approximate] number of storage bits.
    pub fn storage_bits(&self) -> usize {
        let gshare = self.gshare_ctr.storage_bits() * self.table_size();
        let tage = self.tage_ctr.storage_bits() * self.table_size() * TAGE_TABLES;
        let sc = self.sc_ctr.storage_bits() * self.sc_size();
        gshare + tage + sc + self.history_bits
    }

    /// Use this configuration to create a new [`EnsemblePredictor`].
    pub fn build(self) -> Result<EnsemblePredictor, ConfigError> {
        self.validate()?;
        Ok(EnsemblePredictor::from_config(self))
    }
}
