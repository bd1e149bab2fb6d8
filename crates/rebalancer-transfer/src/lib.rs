//! In-flight cross-chain transfer tracking and the fallback trigger policy.
//!
//! The tracker is an in-memory registry of burn/attestation/mint transfers
//! with rolling statistics and bounded history; the policy consumes a
//! transfer's status and the tracker's aggregate statistics to decide when
//! to abandon the primary path for a fallback strategy.

pub mod policy;
pub mod tracker;
pub mod types;

pub use policy::{FallbackContext, FallbackHandler, FallbackPolicy};
pub use tracker::TransferTracker;
pub use types::{
	CostTier, FallbackDecision, FallbackExecution, FallbackOption, FallbackReason, RouteStats,
	TransferError, TransferStatistics, TransferStatusView,
};
