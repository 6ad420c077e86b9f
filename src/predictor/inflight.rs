//! Tracking the single prediction in flight.

use std::sync::atomic::{ AtomicU64, Ordering };

use crate::branch::BranchInfo;
use crate::error::PredictorError;

/// Source of owner ids; every [`InFlight`] takes a fresh one.
static NEXT_OWNER: AtomicU64 = AtomicU64::new(0);

/// Identifies one prediction made by one predictor instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Ticket {
    /// The [`InFlight`] that issued this ticket
    pub owner: u64,

    /// Position of the prediction in the owner's stream
    pub seq: u64,
}
impl std::fmt::Display for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}.{}", self.owner, self.seq)
    }
}

/// Holds the branch context captured by the most recent prediction until
/// the matching update arrives.
///
/// A clone shares the owner id of the original, so a prediction in flight
/// can be resolved by either copy.
#[derive(Clone, Debug)]
pub struct InFlight {
    owner: u64,

    /// Sequence number assigned to the next prediction
    next_seq: u64,

    /// The outstanding prediction (if any)
    pending: Option<(Ticket, BranchInfo)>,
}
impl InFlight {
    pub fn new() -> Self {
        Self {
            owner: NEXT_OWNER.fetch_add(1, Ordering::Relaxed),
            next_seq: 0,
            pending: None,
        }
    }

    pub fn owner(&self) -> u64 { self.owner }

    /// Returns 'true' if a prediction is waiting for its update.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Record a new prediction for 'branch' and return its ticket.
    pub fn issue(&mut self, branch: BranchInfo) -> Ticket {
        if let Some((stale, stale_branch)) = self.pending {
            if cfg!(debug_assertions) {
                panic!("predict() for {:#x} while prediction {} ({:#x}) is in flight",
                    branch.pc, stale, stale_branch.pc
                );
            }
            log::warn!("discarding unresolved prediction {} for pc {:#x}",
                stale, stale_branch.pc
            );
        }
        let ticket = Ticket { owner: self.owner, seq: self.next_seq };
        self.next_seq = self.next_seq.wrapping_add(1);
        self.pending = Some((ticket, branch));
        ticket
    }

    /// Retire the prediction in flight, returning the branch it was made for.
    /// The prediction stays in flight if 'ticket' doesn't match.
    pub fn resolve(&mut self, ticket: Ticket) -> Result<BranchInfo, PredictorError> {
        match self.pending {
            None => Err(PredictorError::NoPendingPrediction),
            Some((expected, _)) if expected != ticket => {
                Err(PredictorError::MismatchedPrediction { expected, found: ticket })
            },
            Some((_, branch)) => {
                self.pending = None;
                Ok(branch)
            },
        }
    }

    /// Forget any outstanding prediction.
    pub fn clear(&mut self) {
        self.pending = None;
    }
}
impl Default for InFlight {
    fn default() -> Self {
        Self::new()
    }
}
