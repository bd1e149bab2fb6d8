//! Tracker views, statistics, and policy decision types.

use rebalancer_types::{Timestamp, TransferErrorEvent, TransferRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransferError {
	#[error("Invalid input: {0}")]
	InvalidInput(String),

	#[error("Unknown fallback strategy: {0}")]
	UnknownStrategy(String),

	#[error("Fallback handler failed: {0}")]
	HandlerFailure(String),
}

/// A transfer record with derived progress fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferStatusView {
	pub record: TransferRecord,
	/// Seconds since initiation, or initiation to completion once terminal.
	pub elapsed_seconds: u64,
	/// Stage completion over the three stages, 0..=100.
	pub progress_pct: f64,
}

/// Per source->destination pair counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteStats {
	pub count: u64,
	pub completed: u64,
	pub failed: u64,
}

impl RouteStats {
	/// Success rate over terminal transfers for this pair, if any exist.
	pub fn success_rate(&self) -> Option<f64> {
		let terminal = self.completed + self.failed;
		if terminal == 0 {
			None
		} else {
			Some(self.completed as f64 / terminal as f64)
		}
	}
}

/// Aggregate statistics over active and historical transfers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferStatistics {
	pub total: u64,
	pub active: u64,
	pub completed: u64,
	pub failed: u64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub average_completion_seconds: Option<f64>,
	/// Completed over terminal, as a percentage; 100 when nothing has
	/// finished yet.
	pub success_rate_pct: f64,
	pub by_route: HashMap<String, RouteStats>,
}

/// Why the policy decided to fall back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FallbackReason {
	AttestationTimeout {
		elapsed_seconds: u64,
		timeout_seconds: u64,
	},
	TransferFailed {
		errors: Vec<TransferErrorEvent>,
	},
	LowSuccessRate {
		rate: f64,
		minimum: f64,
	},
}

/// Outcome of one policy evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackDecision {
	pub trigger: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub reason: Option<FallbackReason>,
}

impl FallbackDecision {
	pub fn stay() -> Self {
		Self {
			trigger: false,
			reason: None,
		}
	}

	pub fn fall_back(reason: FallbackReason) -> Self {
		Self {
			trigger: true,
			reason: Some(reason),
		}
	}
}

/// Coarse cost classification of a fallback strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostTier {
	Low,
	Medium,
	High,
}

/// One alternative strategy, ranked by confidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackOption {
	pub strategy: String,
	pub description: String,
	pub estimated_seconds: u64,
	pub confidence: f64,
	pub cost_tier: CostTier,
}

/// Result of dispatching a fallback strategy to its handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackExecution {
	pub strategy: String,
	#[serde(default)]
	pub detail: serde_json::Value,
	pub started_at: Timestamp,
}
