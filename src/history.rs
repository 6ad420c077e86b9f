//! Global history registers.

use bitvec::prelude::*;

use crate::branch::Outcome;

/// A shift register recording the most recent branch outcomes.
///
/// Bit 0 is always the most recent outcome. Shifting moves every bit toward
/// the end of the register, and the oldest bit falls off the end.
#[derive(Clone, PartialEq, Eq)]
pub struct HistoryRegister {
    data: BitVec<usize, Lsb0>,
    len: usize,
}

// NOTE: This *reverses* the all of the bits and presents them in a format
// where the leftmost bit is the oldest (index n) and the rightmost bit is
// the most recent (index 0).
impl std::fmt::Display for HistoryRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let x: String = self.data.as_bitslice().iter().by_vals()
            .map(|b| if b { '1' } else { '0' })
            .rev()
            .collect();
        write!(f, "{}", x)
    }
}

impl std::fmt::Debug for HistoryRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HistoryRegister({}; {})", self.len, self)
    }
}

impl HistoryRegister {
    /// Create a register with the specified length in bits.
    /// All bits in the register are initialized to zero.
    pub fn new(len: usize) -> Self {
        assert!(len > 0, "history register must have at least one bit");
        Self {
            data: bitvec![usize, Lsb0; 0; len],
            len,
        }
    }

    pub fn len(&self) -> usize { self.len }
    pub fn is_empty(&self) -> bool { self.len == 0 }
    pub fn data(&self) -> &BitSlice<usize, Lsb0> { self.data.as_bitslice() }

    /// Returns the outcome recorded 'n' branches ago.
    pub fn get(&self, n: usize) -> Outcome {
        Outcome::from(self.data[n])
    }

    /// Shift the register by 'n' bits.
    /// The bottom 'n' bits become zero, and the top 'n' bits are discarded.
    pub fn shift_by(&mut self, n: usize) {
        self.data.shift_right(n);
    }

    /// Shift in a new outcome at bit 0.
    pub fn push(&mut self, outcome: Outcome) {
        self.shift_by(1);
        self.data.set(0, outcome.into());
    }

    /// Read the low bits of the register as an integer (at most the width
    /// of a [usize]). Bit 0 of the result is the most recent outcome.
    pub fn low_bits(&self) -> usize {
        let n = self.len.min(usize::BITS as usize);
        self.data[..n].load_le::<usize>()
    }

    /// Clear the register.
    pub fn reset(&mut self) {
        self.data.fill(false);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn push_shifts_toward_oldest() {
        let mut ghr = HistoryRegister::new(4);
        ghr.push(Outcome::T);
        ghr.push(Outcome::N);
        ghr.push(Outcome::T);
        assert_eq!(ghr.low_bits(), 0b101);
        assert_eq!(ghr.get(0), Outcome::T);
        assert_eq!(ghr.get(1), Outcome::N);
        assert_eq!(ghr.to_string(), "0101");

        // Oldest bits are discarded
        ghr.push(Outcome::T);
        ghr.push(Outcome::T);
        assert_eq!(ghr.low_bits(), 0b0111);
    }

    #[test]
    fn low_bits_truncates_long_registers() {
        let mut ghr = HistoryRegister::new(100);
        for _ in 0..100 {
            ghr.push(Outcome::T);
        }
        assert_eq!(ghr.low_bits(), usize::MAX);
        ghr.reset();
        assert_eq!(ghr.low_bits(), 0);
    }
}
