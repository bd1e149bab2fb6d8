//! Constant-product fill simulation over the internal pool set.

use crate::{
	registry::PoolRegistry,
	types::{LiquidityError, PoolFill, SimulationMode, SimulationOptions, SimulationResult},
};
use rebalancer_types::{
	ExecutionMode, HopKind, InternalPool, RouteCandidate, RouteHop, SimulatorConfig,
};
use std::sync::Arc;
use tracing::debug;

/// Fraction of a pool's reserve consumable in the first greedy pass.
const FIRST_PASS_CAP: f64 = 0.5;
/// Fraction of a pool's remaining reserve consumable in the second pass.
const SECOND_PASS_CAP: f64 = 0.25;

/// Constant-product output for an input against symmetric reserves.
///
/// Reserves are symmetric because all pools in a family hold the same asset;
/// the formula prices depth impact, not a two-asset exchange.
pub fn constant_product_out(amount_in: f64, reserve: f64, fee: f64) -> f64 {
	let effective_in = amount_in * (1.0 - fee);
	(effective_in * reserve) / (reserve + effective_in)
}

/// Simulates fills of an order against a family's internal pools.
pub struct Simulator {
	registry: Arc<PoolRegistry>,
	config: SimulatorConfig,
}

impl Simulator {
	pub fn new(registry: Arc<PoolRegistry>, config: SimulatorConfig) -> Self {
		Self { registry, config }
	}

	/// Pools liquidity across every chain of the family, priced on the hub
	/// chain.
	pub fn simulate_aggregate(
		&self,
		amount_in: f64,
		family: &str,
	) -> Result<SimulationResult, LiquidityError> {
		self.simulate(amount_in, family, &SimulationOptions::default())
	}

	/// Uses only the pools present on one chain.
	pub fn simulate_local(
		&self,
		amount_in: f64,
		family: &str,
		chain: &str,
	) -> Result<SimulationResult, LiquidityError> {
		self.simulate(
			amount_in,
			family,
			&SimulationOptions {
				mode: SimulationMode::Local,
				chain: Some(chain.to_string()),
				split_pools: true,
			},
		)
	}

	/// Computes expected output, fee, and slippage for an order split across
	/// the matched pools.
	pub fn simulate(
		&self,
		amount_in: f64,
		family: &str,
		options: &SimulationOptions,
	) -> Result<SimulationResult, LiquidityError> {
		if amount_in <= 0.0 {
			return Err(LiquidityError::InvalidInput(format!(
				"amount_in must be positive, got {}",
				amount_in
			)));
		}
		if family.is_empty() {
			return Err(LiquidityError::InvalidInput(
				"family must not be empty".to_string(),
			));
		}

		let chain = match options.mode {
			SimulationMode::Aggregate => None,
			SimulationMode::Local => {
				Some(options.chain.as_deref().ok_or(LiquidityError::ChainRequired)?)
			}
		};

		let snapshot = self.registry.snapshot();
		let matched: Vec<&InternalPool> = snapshot
			.iter()
			.filter(|p| p.family == family)
			.filter(|p| chain.map_or(true, |c| p.chain == c))
			.collect();

		if matched.is_empty() {
			return Err(LiquidityError::NoLiquidity(format!(
				"no pools for family {} (chain: {})",
				family,
				chain.unwrap_or("any")
			)));
		}

		let total_reserve: f64 = matched.iter().map(|p| p.reserve).sum();
		if total_reserve <= 0.0 {
			return Err(LiquidityError::NoLiquidity(format!(
				"total reserve for family {} is zero",
				family
			)));
		}

		let fills = if options.split_pools {
			proportional_fills(amount_in, &matched, total_reserve)
		} else {
			greedy_fills(amount_in, &matched)
		};

		let expected_amount_out = fills.iter().map(|f| f.amount_out).sum();
		let slippage_usd = fills.iter().map(|f| f.slippage_usd).sum();
		let fee_usd = fills.iter().map(|f| f.fee_usd).sum();

		let gas_chain = match options.mode {
			SimulationMode::Aggregate => self.config.hub_chain.as_str(),
			SimulationMode::Local => chain.unwrap_or(self.config.hub_chain.as_str()),
		};
		let gas_usd = self
			.config
			.gas_table
			.get(gas_chain)
			.copied()
			.unwrap_or(self.config.default_gas_usd);

		debug!(
			family,
			amount_in,
			expected_amount_out,
			pools = fills.len(),
			"simulated internal fill"
		);

		Ok(SimulationResult {
			expected_amount_out,
			slippage_usd,
			fee_usd,
			gas_usd,
			fills,
		})
	}

	/// Simulates and wraps the result as a candidate route, so internal
	/// liquidity competes with external venues in the same scoring batch.
	pub fn candidate(
		&self,
		amount_in: f64,
		family: &str,
		options: &SimulationOptions,
	) -> Result<RouteCandidate, LiquidityError> {
		let result = self.simulate(amount_in, family, options)?;

		let (mode, chain, id) = match options.mode {
			SimulationMode::Aggregate => (
				ExecutionMode::LocalAggregate,
				self.config.hub_chain.clone(),
				format!("internal-aggregate-{}", family),
			),
			SimulationMode::Local => {
				let chain = options
					.chain
					.clone()
					.unwrap_or_else(|| self.config.hub_chain.clone());
				let id = format!("internal-{}-{}", chain, family);
				(ExecutionMode::LocalChain, chain, id)
			}
		};

		Ok(RouteCandidate {
			id: Some(id),
			mode,
			family: family.to_string(),
			chain,
			amount_in: result.used_amount_in(),
			amount_out: result.expected_amount_out,
			slippage_usd: result.slippage_usd,
			fee_usd: result.fee_usd,
			gas_usd: result.gas_usd,
			uses_bridge: false,
			bridge_source: None,
			bridge_destination: None,
			hops: result
				.fills
				.iter()
				.map(|fill| RouteHop {
					kind: HopKind::Internal,
					chain: fill.chain.clone(),
					pool: fill.pool_id.clone(),
					amount_in: fill.amount_in,
					amount_out: fill.amount_out,
					metadata: None,
				})
				.collect(),
			metadata: None,
		})
	}
}

fn fill_for(pool: &InternalPool, amount_in: f64) -> PoolFill {
	let amount_out = constant_product_out(amount_in, pool.reserve, pool.fee);
	PoolFill {
		pool_id: pool.id.clone(),
		chain: pool.chain.clone(),
		amount_in,
		amount_out,
		fee_usd: amount_in * pool.fee,
		// The family is unit-priced, so input minus output is the USD cost.
		slippage_usd: amount_in - amount_out,
	}
}

/// Every matched pool takes a share of the order equal to its share of the
/// total matched reserve.
fn proportional_fills(
	amount_in: f64,
	pools: &[&InternalPool],
	total_reserve: f64,
) -> Vec<PoolFill> {
	pools
		.iter()
		.filter(|p| p.reserve > 0.0)
		.map(|pool| fill_for(pool, amount_in * (pool.reserve / total_reserve)))
		.collect()
}

/// Largest-reserve-first consumption with per-pool caps: half the reserve on
/// the first pass, a quarter of what remains on the second. Input still
/// unplaced after both passes is left out of the result.
fn greedy_fills(amount_in: f64, pools: &[&InternalPool]) -> Vec<PoolFill> {
	let mut ordered: Vec<&InternalPool> = pools.iter().filter(|p| p.reserve > 0.0).copied().collect();
	ordered.sort_by(|a, b| {
		b.reserve
			.partial_cmp(&a.reserve)
			.unwrap_or(std::cmp::Ordering::Equal)
	});

	let mut remaining = amount_in;
	let mut allocations: Vec<f64> = vec![0.0; ordered.len()];

	for (i, pool) in ordered.iter().enumerate() {
		if remaining <= 0.0 {
			break;
		}
		let take = (pool.reserve * FIRST_PASS_CAP).min(remaining);
		allocations[i] += take;
		remaining -= take;
	}

	if remaining > 0.0 {
		for (i, pool) in ordered.iter().enumerate() {
			if remaining <= 0.0 {
				break;
			}
			let reserve_left = pool.reserve - allocations[i];
			let take = (reserve_left * SECOND_PASS_CAP).min(remaining);
			if take > 0.0 {
				allocations[i] += take;
				remaining -= take;
			}
		}
	}

	ordered
		.iter()
		.zip(allocations)
		.filter(|(_, allocated)| *allocated > 0.0)
		.map(|(pool, allocated)| fill_for(pool, allocated))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::registry::StaticPoolSource;

	fn pool(id: &str, chain: &str, reserve: f64, fee: f64) -> InternalPool {
		InternalPool {
			id: id.to_string(),
			family: "USDC".to_string(),
			chain: chain.to_string(),
			pool_type: "constant-product".to_string(),
			token: "USDC".to_string(),
			decimals: 6,
			reserve,
			fee,
			metadata: None,
		}
	}

	async fn simulator(pools: Vec<InternalPool>) -> Simulator {
		let registry = Arc::new(PoolRegistry::new(Arc::new(StaticPoolSource::new(pools))));
		registry.initialize().await.unwrap();
		Simulator::new(registry, SimulatorConfig::default())
	}

	#[test]
	fn test_constant_product_monotonic_and_underfills() {
		let reserve = 500_000.0;
		let fee = 0.001;
		let mut last = 0.0;
		for amount in [100.0, 1_000.0, 10_000.0, 100_000.0] {
			let out = constant_product_out(amount, reserve, fee);
			assert!(out > last, "output must increase with input");
			assert!(out < amount, "output must stay below input");
			last = out;
		}
	}

	#[tokio::test]
	async fn test_proportional_split_sixty_thirty_ten() {
		let sim = simulator(vec![
			pool("a", "ethereum", 600_000.0, 0.001),
			pool("b", "base", 300_000.0, 0.001),
			pool("c", "arbitrum", 100_000.0, 0.001),
		])
		.await;

		let result = sim.simulate_aggregate(100_000.0, "USDC").unwrap();
		assert_eq!(result.fills.len(), 3);

		let shares: Vec<f64> = result.fills.iter().map(|f| f.amount_in).collect();
		assert!((shares[0] - 60_000.0).abs() < 1e-6);
		assert!((shares[1] - 30_000.0).abs() < 1e-6);
		assert!((shares[2] - 10_000.0).abs() < 1e-6);

		for fill in &result.fills {
			assert!(fill.amount_out < fill.amount_in);
		}
		assert!(result.expected_amount_out < 100_000.0);
		assert!((result.used_amount_in() - 100_000.0).abs() < 1e-6);
	}

	#[tokio::test]
	async fn test_proportional_split_conserves_input() {
		let sim = simulator(vec![
			pool("a", "ethereum", 450_000.0, 0.0005),
			pool("b", "base", 275_000.0, 0.001),
			pool("c", "arbitrum", 125_000.0, 0.003),
			pool("d", "polygon", 50_000.0, 0.001),
		])
		.await;

		let amount = 37_500.0;
		let result = sim.simulate_aggregate(amount, "USDC").unwrap();
		assert!((result.used_amount_in() - amount).abs() < 1e-6);
		for fill in &result.fills {
			assert!(fill.amount_in <= amount);
		}
	}

	#[tokio::test]
	async fn test_greedy_caps_consumption() {
		let sim = simulator(vec![
			pool("big", "ethereum", 100_000.0, 0.001),
			pool("small", "base", 10_000.0, 0.001),
		])
		.await;

		let options = SimulationOptions {
			split_pools: false,
			..SimulationOptions::default()
		};
		// First pass places 50k + 5k; second pass places 25% of the 50k and
		// 5k still sitting in each pool.
		let result = sim.simulate(80_000.0, "USDC", &options).unwrap();

		let big = result.fills.iter().find(|f| f.pool_id == "big").unwrap();
		let small = result.fills.iter().find(|f| f.pool_id == "small").unwrap();
		assert!((big.amount_in - 62_500.0).abs() < 1e-6);
		assert!((small.amount_in - 6_250.0).abs() < 1e-6);
		// The remainder stays unplaced rather than failing the call.
		assert!(result.used_amount_in() < 80_000.0);
	}

	#[tokio::test]
	async fn test_greedy_fills_fully_when_depth_allows() {
		let sim = simulator(vec![
			pool("big", "ethereum", 100_000.0, 0.001),
			pool("small", "base", 10_000.0, 0.001),
		])
		.await;

		let options = SimulationOptions {
			split_pools: false,
			..SimulationOptions::default()
		};
		let result = sim.simulate(20_000.0, "USDC", &options).unwrap();
		assert!((result.used_amount_in() - 20_000.0).abs() < 1e-6);
		// Largest pool absorbs everything within its first-pass cap.
		assert_eq!(result.fills.len(), 1);
		assert_eq!(result.fills[0].pool_id, "big");
	}

	#[tokio::test]
	async fn test_local_mode_filters_by_chain() {
		let sim = simulator(vec![
			pool("a", "ethereum", 600_000.0, 0.001),
			pool("b", "base", 300_000.0, 0.001),
		])
		.await;

		let result = sim.simulate_local(10_000.0, "USDC", "base").unwrap();
		assert_eq!(result.fills.len(), 1);
		assert_eq!(result.fills[0].chain, "base");
		// Local mode prices gas on the requested chain, not the hub.
		assert!((result.gas_usd - 0.15).abs() < 1e-9);
	}

	#[tokio::test]
	async fn test_aggregate_mode_prices_gas_on_hub() {
		let sim = simulator(vec![pool("b", "base", 300_000.0, 0.001)]).await;
		let result = sim.simulate_aggregate(10_000.0, "USDC").unwrap();
		assert!((result.gas_usd - 10.0).abs() < 1e-9);
	}

	#[tokio::test]
	async fn test_input_validation() {
		let sim = simulator(vec![pool("a", "base", 100.0, 0.001)]).await;

		assert!(matches!(
			sim.simulate_aggregate(0.0, "USDC"),
			Err(LiquidityError::InvalidInput(_))
		));
		assert!(matches!(
			sim.simulate_aggregate(-5.0, "USDC"),
			Err(LiquidityError::InvalidInput(_))
		));
		assert!(matches!(
			sim.simulate_aggregate(10.0, ""),
			Err(LiquidityError::InvalidInput(_))
		));
		assert!(matches!(
			sim.simulate(
				10.0,
				"USDC",
				&SimulationOptions {
					mode: SimulationMode::Local,
					chain: None,
					split_pools: true,
				}
			),
			Err(LiquidityError::ChainRequired)
		));
	}

	#[tokio::test]
	async fn test_candidate_wraps_simulation() {
		let sim = simulator(vec![
			pool("a", "ethereum", 600_000.0, 0.001),
			pool("b", "base", 300_000.0, 0.001),
		])
		.await;

		let candidate = sim
			.candidate(50_000.0, "USDC", &SimulationOptions::default())
			.unwrap();
		assert_eq!(candidate.id.as_deref(), Some("internal-aggregate-USDC"));
		assert_eq!(candidate.chain, "ethereum");
		assert!(!candidate.uses_bridge);
		assert_eq!(candidate.hops.len(), 2);
		assert!(candidate.amount_out < candidate.amount_in);
		let hop_total: f64 = candidate.hops.iter().map(|h| h.amount_in).sum();
		assert!((hop_total - candidate.amount_in).abs() < 1e-6);
	}

	#[tokio::test]
	async fn test_no_liquidity_errors() {
		let sim = simulator(vec![pool("a", "base", 0.0, 0.001)]).await;
		assert!(matches!(
			sim.simulate_aggregate(10.0, "USDT"),
			Err(LiquidityError::NoLiquidity(_))
		));
		assert!(matches!(
			sim.simulate_aggregate(10.0, "USDC"),
			Err(LiquidityError::NoLiquidity(_))
		));
	}
}
