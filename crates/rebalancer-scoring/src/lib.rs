//! Composite route scoring.
//!
//! Ranks candidate execution routes under a weighted multi-factor cost
//! model: slippage, gas, venue risk, latency, and failure probability, each
//! normalized to [0, 1] before combination. Risk, gas, and failure figures
//! come from injected collaborator providers.

pub mod math;
pub mod providers;
pub mod scorer;

pub use providers::{FailureModel, GasEstimate, GasEstimator, GasQuery, RiskProvider};
pub use scorer::{CandidateFailure, RouteScorer, ScoreBatch};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoreError {
	/// An external provider call failed; propagated, not swallowed.
	#[error("Dependency failure: {0}")]
	DependencyFailure(String),
}
