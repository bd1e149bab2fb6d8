//! Canonical plan construction and content hashing.

use crate::types::{
	CanonicalPlan, PlanArtifact, PlanError, PlanExecution, PlanHop, PlanMetadata, PlanOptions,
};
use rebalancer_types::{now_seconds, ScoredRoute};
use sha3::{Digest, Keccak256};
use tracing::info;

/// Builds the canonical plan for a chosen route.
///
/// Construction is field-order-fixed: every block is written in the struct
/// declaration order regardless of how the route was ingested, and numeric
/// fields stay numeric, so hashing is a pure function of the plan's semantic
/// content. Metadata maps serialize with sorted keys for the same reason.
pub fn build_plan(chosen: &ScoredRoute, options: &PlanOptions) -> Result<PlanArtifact, PlanError> {
	let route = &chosen.route;
	if route.amount_in <= 0.0 {
		return Err(PlanError::InvalidInput(format!(
			"route amount_in must be positive, got {}",
			route.amount_in
		)));
	}

	let created_at = options.created_at.unwrap_or_else(now_seconds);
	let request_id = options
		.request_id
		.clone()
		.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
	let operator = options
		.operator
		.clone()
		.unwrap_or_else(|| "rebalancer".to_string());

	let plan = CanonicalPlan {
		metadata: PlanMetadata {
			request_id,
			operator,
			created_at,
			expires_at: created_at + options.expiry_seconds,
			user_address: options.user_address.clone(),
		},
		execution: PlanExecution {
			mode: route.mode,
			family: route.family.clone(),
			amount_in: route.amount_in,
			expected_amount_out: route.amount_out,
			chain: route.chain.clone(),
			uses_bridge: route.uses_bridge,
			score: chosen.score.total,
			gas_usd: chosen.score.gas_usd,
			slippage_usd: route.slippage_usd,
			fee_usd: route.fee_usd,
		},
		hops: route
			.hops
			.iter()
			.map(|hop| PlanHop {
				kind: hop.kind,
				chain: hop.chain.clone(),
				pool: hop.pool.clone(),
				amount_in: hop.amount_in,
				amount_out: hop.amount_out,
				metadata: hop.metadata.clone(),
			})
			.collect(),
	};

	let serialized = serde_json::to_string(&plan)
		.map_err(|e| PlanError::InvalidInput(format!("plan serialization failed: {}", e)))?;
	let hash = hex::encode(Keccak256::digest(serialized.as_bytes()));

	info!(
		request_id = %plan.metadata.request_id,
		hash = %hash,
		chain = %plan.execution.chain,
		"built canonical plan"
	);

	Ok(PlanArtifact {
		plan,
		hash,
		serialized,
	})
}
