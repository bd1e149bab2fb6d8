//! The composite route scorer.

use crate::{
	math::{invert, normalize, safe_ratio},
	providers::{FailureModel, GasEstimator, GasQuery, RiskProvider},
	ScoreError,
};
use rebalancer_types::{RouteCandidate, RouteScore, ScoredRoute, ScoringConfig};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// A candidate that could not be scored because a provider call failed.
///
/// Batch scoring keeps going past these; the failure is surfaced only for
/// the affected candidate.
#[derive(Debug, Serialize, Deserialize)]
pub struct CandidateFailure {
	/// Position of the candidate in the input batch.
	pub index: usize,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	pub error: String,
}

/// Result of scoring a batch of candidates.
#[derive(Debug)]
pub struct ScoreBatch {
	/// Successfully scored candidates, stable-sorted descending by total.
	pub ranked: Vec<ScoredRoute>,
	pub failures: Vec<CandidateFailure>,
}

/// Scores candidate routes against injected risk, gas, and failure models.
pub struct RouteScorer {
	risk: Arc<dyn RiskProvider>,
	gas: Arc<dyn GasEstimator>,
	failure: Arc<dyn FailureModel>,
	config: ScoringConfig,
}

impl RouteScorer {
	pub fn new(
		risk: Arc<dyn RiskProvider>,
		gas: Arc<dyn GasEstimator>,
		failure: Arc<dyn FailureModel>,
		config: ScoringConfig,
	) -> Self {
		Self {
			risk,
			gas,
			failure,
			config,
		}
	}

	/// Computes the composite score for one candidate.
	///
	/// Fails only when a provider call fails; economically nonsensical input
	/// (zero amount) still produces a score, with cost ratios defined as 0.
	pub async fn score_route(&self, route: &RouteCandidate) -> Result<RouteScore, ScoreError> {
		let slippage_ratio = safe_ratio(route.slippage_usd, route.amount_in);
		let slippage = invert(normalize(slippage_ratio, self.config.slippage_cap));

		let gas_estimate = self.gas.estimate(&GasQuery::for_route(route)).await?;
		let gas_ratio = safe_ratio(gas_estimate.total_usd, route.amount_in);
		let gas = invert(normalize(gas_ratio, self.config.gas_cap));

		let venue_risk = self.risk.risk(&route.family, &route.chain).await?;
		let risk = 1.0 - venue_risk.clamp(0.0, 1.0);

		let latency = self.latency_score(route);

		let failure_probability = self.failure.failure_probability(route).await?;
		let failure = 1.0 - failure_probability.clamp(0.0, 1.0);

		let weights = &self.config.weights;
		let weighted = slippage * weights.slippage
			+ gas * weights.gas
			+ risk * weights.risk
			+ latency * weights.latency
			+ failure * weights.failure;
		let weight_sum = weights.sum();
		// Weights are relative, not absolute; divide by what was applied.
		let total = if weight_sum > 0.0 {
			weighted / weight_sum
		} else {
			0.0
		};

		debug!(
			route = route.id.as_deref().unwrap_or("<unnamed>"),
			total, "scored candidate route"
		);

		Ok(RouteScore {
			total,
			slippage,
			gas,
			risk,
			latency,
			failure,
			gas_usd: gas_estimate.total_usd,
			slippage_usd: route.slippage_usd,
		})
	}

	/// Scores every candidate independently and ranks the successes.
	///
	/// The sort is stable and descending by total score, so candidates with
	/// equal totals keep their input order.
	pub async fn score_many(&self, routes: &[RouteCandidate]) -> ScoreBatch {
		let mut ranked = Vec::with_capacity(routes.len());
		let mut failures = Vec::new();

		for (index, route) in routes.iter().enumerate() {
			match self.score_route(route).await {
				Ok(score) => ranked.push(ScoredRoute {
					route: route.clone(),
					score,
				}),
				Err(e) => {
					warn!(
						index,
						id = route.id.as_deref().unwrap_or("<unnamed>"),
						error = %e,
						"skipping unscorable candidate"
					);
					failures.push(CandidateFailure {
						index,
						id: route.id.clone(),
						error: e.to_string(),
					});
				}
			}
		}

		ranked.sort_by(|a, b| {
			b.score
				.total
				.partial_cmp(&a.score.total)
				.unwrap_or(std::cmp::Ordering::Equal)
		});

		ScoreBatch { ranked, failures }
	}

	/// Latency starts perfect and takes fixed additive deductions, floored
	/// at zero.
	fn latency_score(&self, route: &RouteCandidate) -> f64 {
		let mut score = 1.0;
		if route.uses_bridge {
			score -= self.config.bridge_latency_penalty;
		}
		if let Some(penalty) = self.config.chain_latency_penalties.get(&route.chain) {
			score -= penalty;
		}
		score.max(0.0)
	}
}
