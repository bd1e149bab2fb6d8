//! The fallback trigger policy and strategy dispatch.

use crate::{
	tracker::TransferTracker,
	types::{
		CostTier, FallbackDecision, FallbackExecution, FallbackOption, FallbackReason,
		TransferError,
	},
};
use async_trait::async_trait;
use rebalancer_types::{PolicyConfig, TransferRecord, TransferStatus};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Execution context handed to a fallback handler.
#[derive(Debug, Clone)]
pub struct FallbackContext {
	pub tx_hash: String,
	pub source_chain: String,
	pub destination_chain: String,
	pub amount: f64,
}

impl FallbackContext {
	pub fn for_transfer(record: &TransferRecord) -> Self {
		Self {
			tx_hash: record.tx_hash.clone(),
			source_chain: record.source_chain.clone(),
			destination_chain: record.destination_chain.clone(),
			amount: record.amount,
		}
	}
}

/// Executes one fallback strategy when the policy triggers.
///
/// Handler errors surface to callers as [`TransferError::HandlerFailure`].
#[async_trait]
pub trait FallbackHandler: Send + Sync {
	async fn execute(&self, ctx: &FallbackContext) -> anyhow::Result<FallbackExecution>;
}

/// Decides whether an in-flight transfer should abandon its primary path.
///
/// Evaluated by the caller at each polling tick; rules run in order and the
/// first match wins.
pub struct FallbackPolicy {
	config: PolicyConfig,
	tracker: Arc<TransferTracker>,
	handlers: HashMap<String, Arc<dyn FallbackHandler>>,
}

impl FallbackPolicy {
	pub fn new(config: PolicyConfig, tracker: Arc<TransferTracker>) -> Self {
		Self {
			config,
			tracker,
			handlers: HashMap::new(),
		}
	}

	/// Registers the handler dispatched for a strategy tag.
	pub fn register_handler(&mut self, tag: impl Into<String>, handler: Arc<dyn FallbackHandler>) {
		self.handlers.insert(tag.into(), handler);
	}

	pub async fn should_fallback(
		&self,
		record: &TransferRecord,
		elapsed_seconds: u64,
	) -> FallbackDecision {
		if record.status == TransferStatus::Initiated
			&& elapsed_seconds > self.config.attestation_timeout_seconds
		{
			warn!(
				tx_hash = %record.tx_hash,
				elapsed_seconds,
				"attestation timed out, falling back"
			);
			return FallbackDecision::fall_back(FallbackReason::AttestationTimeout {
				elapsed_seconds,
				timeout_seconds: self.config.attestation_timeout_seconds,
			});
		}

		if record.status == TransferStatus::Failed {
			warn!(tx_hash = %record.tx_hash, "transfer failed, falling back");
			return FallbackDecision::fall_back(FallbackReason::TransferFailed {
				errors: record.errors.clone(),
			});
		}

		let stats = self.tracker.statistics().await;
		if let Some(pair) = stats.by_route.get(&record.route_pair()) {
			if let Some(rate) = pair.success_rate() {
				if rate < self.config.min_success_rate {
					warn!(
						route = %record.route_pair(),
						rate,
						"route pair success rate below threshold, falling back"
					);
					return FallbackDecision::fall_back(FallbackReason::LowSuccessRate {
						rate,
						minimum: self.config.min_success_rate,
					});
				}
			}
		}

		FallbackDecision::stay()
	}

	/// Alternative strategies, ranked descending by confidence.
	pub fn available_options(&self) -> Vec<FallbackOption> {
		let mut options = vec![
			FallbackOption {
				strategy: "slow_attestation".to_string(),
				description: "Retry over the standard attestation path and wait out finality"
					.to_string(),
				estimated_seconds: 1200,
				confidence: 0.95,
				cost_tier: CostTier::Low,
			},
			FallbackOption {
				strategy: "alternate_bridge".to_string(),
				description: "Re-route the transfer through a different bridge".to_string(),
				estimated_seconds: 420,
				confidence: 0.85,
				cost_tier: CostTier::Medium,
			},
			FallbackOption {
				strategy: "internal_liquidity".to_string(),
				description: "Serve the amount from internal pools on the destination chain"
					.to_string(),
				estimated_seconds: 60,
				confidence: 0.70,
				cost_tier: CostTier::High,
			},
		];
		options.sort_by(|a, b| {
			b.confidence
				.partial_cmp(&a.confidence)
				.unwrap_or(std::cmp::Ordering::Equal)
		});
		options
	}

	/// Dispatches a chosen strategy to its registered handler.
	pub async fn execute(
		&self,
		tag: &str,
		ctx: &FallbackContext,
	) -> Result<FallbackExecution, TransferError> {
		let handler = self
			.handlers
			.get(tag)
			.ok_or_else(|| TransferError::UnknownStrategy(tag.to_string()))?;
		handler.execute(ctx).await.map_err(|e| {
			warn!(strategy = tag, error = %e, "fallback handler failed");
			TransferError::HandlerFailure(e.to_string())
		})
	}
}
