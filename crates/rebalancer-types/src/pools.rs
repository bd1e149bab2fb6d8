//! Internal and external liquidity pool records.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Owned same-asset-family liquidity on one chain.
///
/// Reserves are expressed in token units, not smallest units. All pools of a
/// family are treated as fungible liquidity by the aggregate simulator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalPool {
	pub id: String,
	pub family: String,
	pub chain: String,
	pub pool_type: String,
	pub token: String,
	pub decimals: u8,
	pub reserve: f64,
	/// Fee as a fraction of input (0.001 = 10 bps).
	pub fee: f64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub metadata: Option<serde_json::Value>,
}

/// Normalized record for a pool fetched from an external venue.
///
/// Produced by external DEX adapters and merged with internal liquidity by
/// an aggregator outside this workspace; declared here so adapters and the
/// core share one shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalPool {
	pub chain: String,
	pub protocol: String,
	pub address: String,
	pub token0: String,
	pub token1: String,
	pub reserve0: f64,
	pub reserve1: f64,
	pub fee: f64,
}

/// Source of internal pool configuration.
///
/// Injected into the pool registry so tests can supply fixtures without a
/// filesystem path.
#[async_trait]
pub trait PoolConfigSource: Send + Sync {
	async fn load_pools(&self) -> anyhow::Result<Vec<InternalPool>>;
}
