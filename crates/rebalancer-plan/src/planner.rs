//! One-call planning: score, choose, commit, and precompute fallbacks.

use crate::{
	canonical::build_plan,
	fallbacks::build_fallbacks,
	types::{PlanError, PlanOptions, PlanningOutcome},
};
use rebalancer_scoring::RouteScorer;
use rebalancer_types::RouteCandidate;
use tracing::{info, warn};

/// Scores every candidate, builds the canonical plan for the best one, and
/// derives the fallback bundle from the rest of the ranking.
///
/// Fails with [`PlanError::MissingRoute`] when no candidate could be scored;
/// per-candidate provider failures are carried in the outcome, not fatal.
pub async fn plan_from_candidates(
	candidates: &[RouteCandidate],
	scorer: &RouteScorer,
	options: &PlanOptions,
	fallback_count: usize,
) -> Result<PlanningOutcome, PlanError> {
	if candidates.is_empty() {
		return Err(PlanError::MissingRoute);
	}

	let batch = scorer.score_many(candidates).await;
	for failure in &batch.failures {
		warn!(
			index = failure.index,
			error = %failure.error,
			"candidate dropped during planning"
		);
	}

	let chosen = batch.ranked.first().cloned().ok_or(PlanError::MissingRoute)?;
	let artifact = build_plan(&chosen, options)?;
	let fallbacks = build_fallbacks(&batch.ranked[1..], fallback_count);

	info!(
		candidates = candidates.len(),
		ranked = batch.ranked.len(),
		fallbacks = fallbacks.len(),
		hash = %artifact.hash,
		"planning cycle committed"
	);

	Ok(PlanningOutcome {
		chosen,
		artifact,
		fallbacks,
		ranked: batch.ranked,
		failures: batch.failures,
	})
}
