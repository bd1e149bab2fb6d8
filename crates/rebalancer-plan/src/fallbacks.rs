//! Fallback bundle generation from the scored candidate set.

use crate::types::FallbackSummary;
use rebalancer_scoring::RouteScorer;
use rebalancer_types::{RouteCandidate, ScoredRoute};
use tracing::warn;

/// Reduces the top `top_n` candidates by score to compact fallback
/// summaries.
///
/// `top_n` is clamped to at least 1. Candidates are ranked here regardless
/// of input order; the sort is stable, so equal scores keep their input
/// order just as in batch scoring.
pub fn build_fallbacks(scored: &[ScoredRoute], top_n: usize) -> Vec<FallbackSummary> {
	let mut ordered: Vec<&ScoredRoute> = scored.iter().collect();
	ordered.sort_by(|a, b| {
		b.score
			.total
			.partial_cmp(&a.score.total)
			.unwrap_or(std::cmp::Ordering::Equal)
	});
	ordered
		.into_iter()
		.take(top_n.max(1))
		.map(summarize)
		.collect()
}

/// Scores raw candidates first, then builds the bundle from the ranking.
///
/// Candidates whose providers fail are skipped, not fatal.
pub async fn build_fallbacks_from_raw(
	routes: &[RouteCandidate],
	scorer: &RouteScorer,
	top_n: usize,
) -> Vec<FallbackSummary> {
	let batch = scorer.score_many(routes).await;
	for failure in &batch.failures {
		warn!(
			index = failure.index,
			error = %failure.error,
			"candidate excluded from fallback bundle"
		);
	}
	build_fallbacks(&batch.ranked, top_n)
}

fn summarize(scored: &ScoredRoute) -> FallbackSummary {
	let route = &scored.route;
	FallbackSummary {
		id: route.id.clone().unwrap_or_else(|| synthesize_id(route)),
		mode: route.mode,
		chain: route.chain.clone(),
		family: route.family.clone(),
		score: scored.score.total,
		amount_in: route.amount_in,
		amount_out: route.amount_out,
	}
}

/// Last-resort identifier for routes that arrive without one. Not stable
/// across calls; never use as a long-lived key.
fn synthesize_id(route: &RouteCandidate) -> String {
	let suffix = uuid::Uuid::new_v4().simple().to_string();
	format!("{}-{}-{}", route.mode, route.chain, &suffix[..8])
}
