//! Conditional branch direction predictors for trace-driven simulation.
//!
//! Two independent predictors implement [`BranchPredictor`]:
//!
//! - [`PerceptronPredictor`]: hashed perceptrons over global history, with
//!   path and recency inputs and an adaptive training threshold.
//! - [`EnsemblePredictor`]: a majority vote of gshare, four TAGE-lite
//!   tables, and a statistical corrector.
//!
//! A simulator picks one, then alternates strictly between
//! [`BranchPredictor::predict`] and [`BranchPredictor::update`] for every
//! branch it executes.

pub mod branch;
pub mod error;
pub mod history;
pub mod predictor;

pub use branch::*;
pub use error::*;
pub use history::*;
pub use predictor::*;
