//! Simulation inputs, outputs, and errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LiquidityError {
	#[error("Invalid input: {0}")]
	InvalidInput(String),

	#[error("Local mode requires a chain")]
	ChainRequired,

	#[error("No liquidity: {0}")]
	NoLiquidity(String),

	#[error("Pool configuration source failed: {0}")]
	Source(#[from] anyhow::Error),
}

/// Which pools participate in a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationMode {
	/// Every pool of the family, across chains, priced on the hub chain.
	Aggregate,
	/// Only pools on one specific chain.
	Local,
}

/// Options for one simulation call.
#[derive(Debug, Clone)]
pub struct SimulationOptions {
	pub mode: SimulationMode,
	pub chain: Option<String>,
	/// Proportional split across matched pools when true (the default);
	/// greedy largest-first consumption with per-pool caps when false.
	pub split_pools: bool,
}

impl Default for SimulationOptions {
	fn default() -> Self {
		Self {
			mode: SimulationMode::Aggregate,
			chain: None,
			split_pools: true,
		}
	}
}

/// Per-pool portion of a simulated fill.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolFill {
	pub pool_id: String,
	pub chain: String,
	pub amount_in: f64,
	pub amount_out: f64,
	#[serde(rename = "feeUSD")]
	pub fee_usd: f64,
	#[serde(rename = "slippageUSD")]
	pub slippage_usd: f64,
}

/// Aggregate result of a simulated fill.
///
/// When greedy allocation cannot place the full order within its caps, the
/// unfilled remainder is simply absent: the result lists what was actually
/// used and produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
	pub expected_amount_out: f64,
	#[serde(rename = "slippageUSD")]
	pub slippage_usd: f64,
	#[serde(rename = "feeUSD")]
	pub fee_usd: f64,
	#[serde(rename = "gasUSD")]
	pub gas_usd: f64,
	pub fills: Vec<PoolFill>,
}

impl SimulationResult {
	/// Total input actually placed across pools.
	pub fn used_amount_in(&self) -> f64 {
		self.fills.iter().map(|f| f.amount_in).sum()
	}
}
