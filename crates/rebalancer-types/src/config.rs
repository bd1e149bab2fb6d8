//! Configuration structs for the rebalancer core.
//!
//! Every section has defaults matching the reference deployment so a config
//! file only needs to override what it changes.

use crate::pools::InternalPool;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Relative weights for the five scoring factors.
///
/// Weights are relative, not absolute: the scorer always divides by the sum
/// of the weights it applied, so they are not required to sum to 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
	pub slippage: f64,
	pub gas: f64,
	pub risk: f64,
	pub latency: f64,
	pub failure: f64,
}

impl Default for ScoreWeights {
	fn default() -> Self {
		Self {
			slippage: 0.40,
			gas: 0.30,
			risk: 0.20,
			latency: 0.10,
			failure: 0.15,
		}
	}
}

impl ScoreWeights {
	pub fn sum(&self) -> f64 {
		self.slippage + self.gas + self.risk + self.latency + self.failure
	}
}

/// Route scorer tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
	pub weights: ScoreWeights,
	/// Slippage/trade-value ratio at which the slippage score saturates.
	pub slippage_cap: f64,
	/// Gas/trade-value ratio at which the gas score saturates.
	pub gas_cap: f64,
	/// Latency deduction applied when a route crosses the bridge.
	pub bridge_latency_penalty: f64,
	/// Additional latency deduction per chain, for known slower chains.
	pub chain_latency_penalties: HashMap<String, f64>,
}

impl Default for ScoringConfig {
	fn default() -> Self {
		let mut chain_latency_penalties = HashMap::new();
		chain_latency_penalties.insert("ethereum".to_string(), 0.10);
		chain_latency_penalties.insert("polygon".to_string(), 0.05);

		Self {
			weights: ScoreWeights::default(),
			slippage_cap: 0.02,
			gas_cap: 0.03,
			bridge_latency_penalty: 0.35,
			chain_latency_penalties,
		}
	}
}

/// Internal liquidity simulator tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
	/// Chain used to price gas for aggregate-mode execution.
	pub hub_chain: String,
	/// Flat per-chain gas estimates in USD.
	pub gas_table: HashMap<String, f64>,
	/// Gas estimate for chains missing from the table.
	pub default_gas_usd: f64,
}

impl Default for SimulatorConfig {
	fn default() -> Self {
		let mut gas_table = HashMap::new();
		gas_table.insert("ethereum".to_string(), 10.0);
		gas_table.insert("arbitrum".to_string(), 0.30);
		gas_table.insert("base".to_string(), 0.15);
		gas_table.insert("polygon".to_string(), 0.10);
		gas_table.insert("avalanche".to_string(), 0.25);

		Self {
			hub_chain: "ethereum".to_string(),
			gas_table,
			default_gas_usd: 1.0,
		}
	}
}

/// Canonical plan builder tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
	/// Operator name stamped into plan metadata.
	pub operator: String,
	/// Plan validity window in seconds.
	pub expiry_seconds: u64,
	/// Number of fallback summaries kept alongside a plan.
	pub fallback_count: usize,
}

impl Default for PlannerConfig {
	fn default() -> Self {
		Self {
			operator: "rebalancer".to_string(),
			expiry_seconds: 60,
			fallback_count: 3,
		}
	}
}

/// Transfer status tracker tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
	/// Maximum retained history entries; oldest evicted first.
	pub history_limit: usize,
	/// Delay before a terminal record is removed from the active map, so
	/// late status queries still resolve.
	pub retirement_grace_seconds: u64,
}

impl Default for TrackerConfig {
	fn default() -> Self {
		Self {
			history_limit: 1000,
			retirement_grace_seconds: 30,
		}
	}
}

/// Fallback trigger policy tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
	/// Seconds a transfer may sit in `initiated` before attestation is
	/// considered timed out.
	pub attestation_timeout_seconds: u64,
	/// Minimum historical success rate for a route pair, in [0, 1].
	pub min_success_rate: f64,
}

impl Default for PolicyConfig {
	fn default() -> Self {
		Self {
			attestation_timeout_seconds: 180,
			min_success_rate: 0.8,
		}
	}
}

/// Top-level configuration aggregating every section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RebalancerConfig {
	pub scoring: ScoringConfig,
	pub simulator: SimulatorConfig,
	pub planner: PlannerConfig,
	pub tracker: TrackerConfig,
	pub policy: PolicyConfig,
	pub pools: Vec<InternalPool>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_weights_are_relative() {
		let weights = ScoreWeights::default();
		// The default set intentionally sums past 1; the scorer divides by
		// the actual sum.
		assert!((weights.sum() - 1.15).abs() < 1e-9);
	}

	#[test]
	fn test_empty_config_parses_with_defaults() {
		let config: RebalancerConfig = toml::from_str("").unwrap();
		assert_eq!(config.policy.attestation_timeout_seconds, 180);
		assert_eq!(config.tracker.history_limit, 1000);
		assert!(config.pools.is_empty());
	}
}
