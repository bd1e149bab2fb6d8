//! Collaborator interfaces consumed by the route scorer.
//!
//! These are in-process trait calls in the reference deployment but carry no
//! wire-format assumption; remote implementations only need to honor the
//! value ranges documented per method.

use crate::ScoreError;
use async_trait::async_trait;
use rebalancer_types::RouteCandidate;
use serde::{Deserialize, Serialize};

/// Asset/venue risk estimate.
#[async_trait]
pub trait RiskProvider: Send + Sync {
	/// Probability in [0, 1] that the family/venue on this chain fails.
	async fn risk(&self, family: &str, chain: &str) -> Result<f64, ScoreError>;
}

/// Key for a gas cost estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasQuery {
	pub chain: String,
	pub uses_bridge: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub bridge_source: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub bridge_destination: Option<String>,
}

/// Gas cost estimate for one route execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasEstimate {
	pub total_usd: f64,
}

/// External gas cost model.
#[async_trait]
pub trait GasEstimator: Send + Sync {
	async fn estimate(&self, query: &GasQuery) -> Result<GasEstimate, ScoreError>;
}

/// External failure-probability model keyed on the full route.
#[async_trait]
pub trait FailureModel: Send + Sync {
	/// Probability in [0, 1] that executing this route fails.
	async fn failure_probability(&self, route: &RouteCandidate) -> Result<f64, ScoreError>;
}

impl GasQuery {
	pub fn for_route(route: &RouteCandidate) -> Self {
		Self {
			chain: route.chain.clone(),
			uses_bridge: route.uses_bridge,
			bridge_source: route.bridge_source.clone(),
			bridge_destination: route.bridge_destination.clone(),
		}
	}
}
