//! Plan structures and errors.
//!
//! Field declaration order in the structs below is the canonical
//! serialization order; do not reorder fields without revisiting every
//! stored plan hash.

use rebalancer_scoring::CandidateFailure;
use rebalancer_types::{ExecutionMode, HopKind, ScoredRoute, Timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
	/// No route available to plan from.
	#[error("No route available for planning")]
	MissingRoute,

	#[error("Invalid input: {0}")]
	InvalidInput(String),
}

/// Options for building a plan.
#[derive(Debug, Clone)]
pub struct PlanOptions {
	/// Request identifier; a UUID v4 is generated when absent.
	pub request_id: Option<String>,
	/// Operator stamped into the plan; defaults to `"rebalancer"`.
	pub operator: Option<String>,
	pub user_address: String,
	/// Validity window in seconds.
	pub expiry_seconds: u64,
	/// Pins plan creation time; deterministic planning and replay use this,
	/// everything else takes the current clock.
	pub created_at: Option<Timestamp>,
}

impl PlanOptions {
	pub fn new(user_address: impl Into<String>) -> Self {
		Self {
			request_id: None,
			operator: None,
			user_address: user_address.into(),
			expiry_seconds: 60,
			created_at: None,
		}
	}
}

/// Plan metadata block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanMetadata {
	pub request_id: String,
	pub operator: String,
	pub created_at: Timestamp,
	pub expires_at: Timestamp,
	pub user_address: String,
}

/// Plan execution block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanExecution {
	pub mode: ExecutionMode,
	pub family: String,
	pub amount_in: f64,
	pub expected_amount_out: f64,
	pub chain: String,
	pub uses_bridge: bool,
	pub score: f64,
	#[serde(rename = "gasUSD")]
	pub gas_usd: f64,
	#[serde(rename = "slippageUSD")]
	pub slippage_usd: f64,
	#[serde(rename = "feeUSD")]
	pub fee_usd: f64,
}

/// One hop record within a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanHop {
	#[serde(rename = "type")]
	pub kind: HopKind,
	pub chain: String,
	pub pool: String,
	pub amount_in: f64,
	pub amount_out: f64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub metadata: Option<serde_json::Value>,
}

/// The deterministic, stably-ordered commitment document for one route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalPlan {
	pub metadata: PlanMetadata,
	pub execution: PlanExecution,
	pub hops: Vec<PlanHop>,
}

/// A built plan together with its content hash and serialized form.
///
/// The hash has no identity outside the plan it was computed from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanArtifact {
	pub plan: CanonicalPlan,
	pub hash: String,
	pub serialized: String,
}

/// Compact summary of an alternative route.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackSummary {
	/// Stable when supplied upstream; otherwise synthesized from mode/chain
	/// plus a random suffix and not reproducible across calls.
	pub id: String,
	pub mode: ExecutionMode,
	pub chain: String,
	pub family: String,
	pub score: f64,
	pub amount_in: f64,
	pub amount_out: f64,
}

/// Everything produced by one planning cycle.
#[derive(Debug)]
pub struct PlanningOutcome {
	pub chosen: ScoredRoute,
	pub artifact: PlanArtifact,
	pub fallbacks: Vec<FallbackSummary>,
	/// All successfully scored candidates, best first.
	pub ranked: Vec<ScoredRoute>,
	/// Candidates dropped because a provider call failed.
	pub failures: Vec<CandidateFailure>,
}
