//! Internal liquidity: the pool registry and the fill simulator.
//!
//! All pools of a family are treated as fungible same-asset liquidity, so a
//! "swap" models the price impact of a large order against finite depth
//! rather than a two-asset exchange.

pub mod registry;
pub mod simulator;
pub mod types;

pub use registry::{PoolRegistry, StaticPoolSource};
pub use simulator::Simulator;
pub use types::{
	LiquidityError, PoolFill, SimulationMode, SimulationOptions, SimulationResult,
};
