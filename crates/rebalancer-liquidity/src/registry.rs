//! Pool configuration registry with atomic snapshot swap.

use crate::types::LiquidityError;
use arc_swap::ArcSwap;
use async_trait::async_trait;
use rebalancer_types::{InternalPool, PoolConfigSource};
use std::sync::Arc;
use tracing::info;

/// Caches the internal pool list loaded from an injected source.
///
/// `refresh` swaps the full list atomically, so concurrent readers never
/// observe a mixed old/new pool set.
pub struct PoolRegistry {
	source: Arc<dyn PoolConfigSource>,
	pools: ArcSwap<Vec<InternalPool>>,
}

impl PoolRegistry {
	pub fn new(source: Arc<dyn PoolConfigSource>) -> Self {
		Self {
			source,
			pools: ArcSwap::from_pointee(Vec::new()),
		}
	}

	/// Loads the pool list for the first time.
	pub async fn initialize(&self) -> Result<(), LiquidityError> {
		self.refresh().await
	}

	/// Reloads from the configuration source and atomically swaps the
	/// cached list.
	pub async fn refresh(&self) -> Result<(), LiquidityError> {
		let pools = self.source.load_pools().await?;
		info!(count = pools.len(), "refreshed internal pool set");
		self.pools.store(Arc::new(pools));
		Ok(())
	}

	/// Current pool snapshot.
	pub fn snapshot(&self) -> Arc<Vec<InternalPool>> {
		self.pools.load_full()
	}
}

/// In-memory pool source, for fixtures and embedders that manage their own
/// configuration.
pub struct StaticPoolSource {
	pools: Vec<InternalPool>,
}

impl StaticPoolSource {
	pub fn new(pools: Vec<InternalPool>) -> Self {
		Self { pools }
	}
}

#[async_trait]
impl PoolConfigSource for StaticPoolSource {
	async fn load_pools(&self) -> anyhow::Result<Vec<InternalPool>> {
		Ok(self.pools.clone())
	}
}
