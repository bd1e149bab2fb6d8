//! Candidate routes and route scores.
//!
//! A candidate route is one proposed way to convert an input amount of a
//! stable-asset family into an output, possibly across several hops. Routes
//! are produced by venue adapters outside this workspace and normalized into
//! the explicit structure below exactly once, at ingestion; field aliases
//! used by upstream adapters (`expectedAmountOut` for `amountOut`, and the
//! mixed-case USD suffixes) are resolved by the deserializer rather than by
//! fallback chains at read sites.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a route executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionMode {
	/// Pooled internal liquidity across all chains of a family, priced on
	/// the hub chain.
	LocalAggregate,
	/// Internal liquidity restricted to a single chain.
	LocalChain,
	/// An external venue (AMM pool or bridge path).
	External,
}

impl fmt::Display for ExecutionMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::LocalAggregate => write!(f, "local-aggregate"),
			Self::LocalChain => write!(f, "local-chain"),
			Self::External => write!(f, "external"),
		}
	}
}

/// One leg of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HopKind {
	Dex,
	Bridge,
	Internal,
}

/// A single hop within a candidate route.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteHop {
	#[serde(rename = "type")]
	pub kind: HopKind,
	pub chain: String,
	pub pool: String,
	pub amount_in: f64,
	#[serde(alias = "expectedAmountOut")]
	pub amount_out: f64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub metadata: Option<serde_json::Value>,
}

/// A proposed execution route for one planning cycle.
///
/// Immutable once scored; the scorer attaches its result in a separate
/// [`ScoredRoute`] rather than mutating the candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteCandidate {
	/// Stable identifier supplied by the venue adapter, when it has one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	pub mode: ExecutionMode,
	pub family: String,
	pub chain: String,
	pub amount_in: f64,
	#[serde(alias = "expectedAmountOut")]
	pub amount_out: f64,
	#[serde(default, rename = "slippageUSD", alias = "slippageUsd")]
	pub slippage_usd: f64,
	#[serde(default, rename = "feeUSD", alias = "feeUsd")]
	pub fee_usd: f64,
	#[serde(default, rename = "gasUSD", alias = "gasUsd")]
	pub gas_usd: f64,
	/// Whether execution crosses chains over the burn/attestation/mint
	/// bridge.
	#[serde(default)]
	pub uses_bridge: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub bridge_source: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub bridge_destination: Option<String>,
	#[serde(default)]
	pub hops: Vec<RouteHop>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub metadata: Option<serde_json::Value>,
}

impl RouteCandidate {
	/// Normalizes a raw adapter payload into an explicit candidate.
	///
	/// This is the single ingestion point for dynamically shaped route
	/// objects; downstream code never needs alias fallbacks.
	pub fn normalized(raw: serde_json::Value) -> Result<Self, serde_json::Error> {
		serde_json::from_value(raw)
	}
}

/// Composite score attached to a candidate route.
///
/// `total` is a weighted average of the five sub-scores divided by the sum
/// of the weights actually applied, so it stays in [0, 1] for any
/// non-negative weight set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteScore {
	pub total: f64,
	pub slippage: f64,
	pub gas: f64,
	pub risk: f64,
	pub latency: f64,
	pub failure: f64,
	/// Raw gas cost used for the gas sub-score, in USD.
	#[serde(rename = "gasUSD")]
	pub gas_usd: f64,
	/// Raw slippage used for the slippage sub-score, in USD.
	#[serde(rename = "slippageUSD")]
	pub slippage_usd: f64,
}

/// A candidate route together with its score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRoute {
	pub route: RouteCandidate,
	pub score: RouteScore,
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_normalized_resolves_aliases() {
		let raw = json!({
			"mode": "external",
			"family": "USDC",
			"chain": "base",
			"amountIn": 1000.0,
			"expectedAmountOut": 998.5,
			"slippageUsd": 1.0,
			"feeUSD": 0.5,
			"usesBridge": true,
			"hops": [{
				"type": "bridge",
				"chain": "base",
				"pool": "cctp",
				"amountIn": 1000.0,
				"expectedAmountOut": 998.5
			}]
		});

		let route = RouteCandidate::normalized(raw).unwrap();
		assert_eq!(route.mode, ExecutionMode::External);
		assert_eq!(route.amount_out, 998.5);
		assert_eq!(route.slippage_usd, 1.0);
		assert_eq!(route.fee_usd, 0.5);
		assert!(route.uses_bridge);
		assert_eq!(route.hops.len(), 1);
		assert_eq!(route.hops[0].kind, HopKind::Bridge);
		assert_eq!(route.hops[0].amount_out, 998.5);
	}

	#[test]
	fn test_normalized_defaults_optional_fields() {
		let raw = json!({
			"mode": "local-aggregate",
			"family": "USDC",
			"chain": "ethereum",
			"amountIn": 50.0,
			"amountOut": 49.9
		});

		let route = RouteCandidate::normalized(raw).unwrap();
		assert!(route.id.is_none());
		assert!(!route.uses_bridge);
		assert!(route.hops.is_empty());
		assert_eq!(route.gas_usd, 0.0);
	}
}
