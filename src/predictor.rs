//! Implementations of different branch predictors.

pub mod counter;
pub mod ensemble;
pub mod inflight;
pub mod perceptron;
pub mod recency;
pub mod table;

pub use counter::*;
pub use ensemble::*;
pub use inflight::*;
pub use perceptron::*;
pub use recency::*;
pub use table::*;

use crate::branch::{ BranchInfo, Outcome };
use crate::error::PredictorError;

/// The target address reported with every prediction.
/// Target prediction is not implemented by any predictor in this crate.
pub const PLACEHOLDER_TARGET: usize = 0;

/// Interface to a predictor with some internal state which is only subject to
/// change by the correct branch outcome.
pub trait StatefulPredictor {
    fn name(&self) -> &'static str;

    /// Reset the internal state of the predictor.
    fn reset(&mut self);

    /// Return the current predicted outcome.
    fn predict(&self) -> Outcome;

    /// Update the internal state of the predictor with the correct outcome.
    fn update(&mut self, outcome: Outcome);
}

/// A prediction made by some [`BranchPredictor`].
///
/// This is a token: it must be handed back to the same predictor with the
/// resolved outcome before the next call to [`BranchPredictor::predict`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Prediction<M> {
    /// Identifies the predictor and the prediction in flight
    pub(crate) ticket: Ticket,

    /// The predicted direction
    pub(crate) outcome: Outcome,

    /// Predictor-specific state captured for the matching update.
    /// [None] when the branch was not conditional.
    pub(crate) meta: Option<M>,
}
impl<M> Prediction<M> {
    /// The ticket matching this prediction to the predictor that made it.
    pub fn ticket(&self) -> Ticket { self.ticket }

    /// The predicted direction.
    pub fn outcome(&self) -> Outcome { self.outcome }

    /// Returns 'true' if the branch is predicted taken.
    pub fn taken(&self) -> bool { self.outcome.is_taken() }

    /// The predicted target; always [`PLACEHOLDER_TARGET`].
    pub fn target(&self) -> usize { PLACEHOLDER_TARGET }

    /// State captured at prediction time (only for conditional branches).
    pub fn meta(&self) -> Option<&M> { self.meta.as_ref() }
}

/// Interface to a conditional branch direction predictor.
///
/// Calls must alternate strictly: every [`BranchPredictor::predict`] is
/// followed by exactly one [`BranchPredictor::update`] with the returned
/// [`Prediction`]. Out-of-order updates are rejected without touching any
/// state. Calling `predict` twice in a row is a precondition violation and
/// panics in debug builds.
pub trait BranchPredictor {
    /// Predictor-specific state carried from `predict` to `update`.
    type Meta: Clone + std::fmt::Debug;

    fn name(&self) -> &'static str;

    /// Reset the predictor to its freshly built state.
    fn reset(&mut self);

    /// Predict the direction of some branch.
    /// Branches that aren't conditional are always predicted taken.
    fn predict(&mut self, branch: BranchInfo) -> Prediction<Self::Meta>;

    /// Train the predictor with the resolved outcome of the branch in
    /// flight. The resolved target is accepted but ignored.
    fn update(&mut self,
        prediction: &Prediction<Self::Meta>,
        outcome: Outcome,
        target: usize,
    ) -> Result<(), PredictorError>;
}
