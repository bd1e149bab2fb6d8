//! Cross-chain transfer records and their three-stage state machine.
//!
//! A transfer moves through burn, attestation, and mint. A record is only
//! created once a burn transaction is known, so the burn stage is complete
//! from registration. Overall status follows
//! `initiated -> {attested | failed}` and `attested -> {complete | failed}`;
//! `complete` and `failed` are terminal.

use crate::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Overall status of a cross-chain transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
	Initiated,
	Attested,
	Complete,
	Failed,
}

impl TransferStatus {
	pub fn is_terminal(&self) -> bool {
		matches!(self, Self::Complete | Self::Failed)
	}
}

impl fmt::Display for TransferStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Initiated => write!(f, "initiated"),
			Self::Attested => write!(f, "attested"),
			Self::Complete => write!(f, "complete"),
			Self::Failed => write!(f, "failed"),
		}
	}
}

/// One of the three transfer stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
	Burn,
	Attestation,
	Mint,
}

impl fmt::Display for Stage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Burn => write!(f, "burn"),
			Self::Attestation => write!(f, "attestation"),
			Self::Mint => write!(f, "mint"),
		}
	}
}

/// Status of a single stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
	Pending,
	Complete,
	Failed,
}

/// State carried by each stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageState {
	pub status: StageStatus,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub timestamp: Option<Timestamp>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

impl StageState {
	pub fn pending() -> Self {
		Self {
			status: StageStatus::Pending,
			timestamp: None,
			error: None,
		}
	}

	pub fn complete(timestamp: Timestamp) -> Self {
		Self {
			status: StageStatus::Complete,
			timestamp: Some(timestamp),
			error: None,
		}
	}
}

/// Per-stage state map for one transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferStages {
	pub burn: StageState,
	pub attestation: StageState,
	pub mint: StageState,
}

impl TransferStages {
	pub fn get(&self, stage: Stage) -> &StageState {
		match stage {
			Stage::Burn => &self.burn,
			Stage::Attestation => &self.attestation,
			Stage::Mint => &self.mint,
		}
	}

	pub fn get_mut(&mut self, stage: Stage) -> &mut StageState {
		match stage {
			Stage::Burn => &mut self.burn,
			Stage::Attestation => &mut self.attestation,
			Stage::Mint => &mut self.mint,
		}
	}

	/// Number of stages that have completed, out of three.
	pub fn completed_count(&self) -> usize {
		[&self.burn, &self.attestation, &self.mint]
			.iter()
			.filter(|s| s.status == StageStatus::Complete)
			.count()
	}
}

/// An error observed during a transfer, appended and never removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferErrorEvent {
	pub stage: Stage,
	pub message: String,
	pub timestamp: Timestamp,
}

/// One cross-chain transfer instance, keyed by its burn transaction hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRecord {
	pub tx_hash: String,
	pub source_chain: String,
	pub destination_chain: String,
	pub amount: f64,
	pub recipient: String,
	pub status: TransferStatus,
	pub stages: TransferStages,
	pub initiated_at: Timestamp,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub attested_at: Option<Timestamp>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub completed_at: Option<Timestamp>,
	pub updated_at: Timestamp,
	#[serde(default)]
	pub errors: Vec<TransferErrorEvent>,
}

impl TransferRecord {
	/// Route pair key used for per-pair statistics.
	pub fn route_pair(&self) -> String {
		format!("{}->{}", self.source_chain, self.destination_chain)
	}
}

/// Parameters for registering a new transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransfer {
	pub tx_hash: String,
	pub source_chain: String,
	pub destination_chain: String,
	pub amount: f64,
	pub recipient: String,
}

/// A stage-completion (or failure) notification from the execution layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageUpdate {
	pub success: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
	/// Observation time; defaults to the tracker's clock when absent.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub timestamp: Option<Timestamp>,
}

impl StageUpdate {
	pub fn succeeded() -> Self {
		Self {
			success: true,
			error: None,
			timestamp: None,
		}
	}

	pub fn failed(error: impl Into<String>) -> Self {
		Self {
			success: false,
			error: Some(error.into()),
			timestamp: None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_terminal_statuses() {
		assert!(!TransferStatus::Initiated.is_terminal());
		assert!(!TransferStatus::Attested.is_terminal());
		assert!(TransferStatus::Complete.is_terminal());
		assert!(TransferStatus::Failed.is_terminal());
	}

	#[test]
	fn test_completed_count() {
		let mut stages = TransferStages {
			burn: StageState::complete(1),
			attestation: StageState::pending(),
			mint: StageState::pending(),
		};
		assert_eq!(stages.completed_count(), 1);

		stages.get_mut(Stage::Attestation).status = StageStatus::Complete;
		assert_eq!(stages.completed_count(), 2);

		stages.get_mut(Stage::Mint).status = StageStatus::Failed;
		assert_eq!(stages.completed_count(), 2);
	}
}
