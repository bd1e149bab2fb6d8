//! The in-memory transfer status registry.

use crate::types::{RouteStats, TransferError, TransferStatistics, TransferStatusView};
use dashmap::DashMap;
use rebalancer_types::{
	now_seconds, NewTransfer, Stage, StageState, StageStatus, StageUpdate, TrackerConfig,
	TransferErrorEvent, TransferRecord, TransferStages, TransferStatus,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Tracks in-flight cross-chain transfers and keeps bounded history.
///
/// Updates for one transaction hash are serialized by the map's entry lock;
/// updates for different hashes proceed in parallel. Readers always see a
/// consistent snapshot of a whole record.
pub struct TransferTracker {
	active: Arc<DashMap<String, TransferRecord>>,
	history: Arc<RwLock<VecDeque<TransferRecord>>>,
	config: TrackerConfig,
}

impl TransferTracker {
	pub fn new(config: TrackerConfig) -> Self {
		Self {
			active: Arc::new(DashMap::new()),
			history: Arc::new(RwLock::new(VecDeque::new())),
			config,
		}
	}

	/// Registers a transfer once its burn transaction is known.
	///
	/// The burn stage is complete from the start; registering an already
	/// known hash returns the existing record untouched.
	pub async fn register_transfer(
		&self,
		new: NewTransfer,
	) -> Result<TransferRecord, TransferError> {
		if new.tx_hash.is_empty() {
			return Err(TransferError::InvalidInput(
				"transaction hash must not be empty".to_string(),
			));
		}
		if new.amount <= 0.0 {
			return Err(TransferError::InvalidInput(format!(
				"amount must be positive, got {}",
				new.amount
			)));
		}

		if let Some(existing) = self.find_record(&new.tx_hash).await {
			debug!(tx_hash = %new.tx_hash, "duplicate registration ignored");
			return Ok(existing);
		}

		let now = now_seconds();
		let record = TransferRecord {
			tx_hash: new.tx_hash.clone(),
			source_chain: new.source_chain,
			destination_chain: new.destination_chain,
			amount: new.amount,
			recipient: new.recipient,
			status: TransferStatus::Initiated,
			stages: TransferStages {
				burn: StageState::complete(now),
				attestation: StageState::pending(),
				mint: StageState::pending(),
			},
			initiated_at: now,
			attested_at: None,
			completed_at: None,
			updated_at: now,
			errors: Vec::new(),
		};

		info!(
			tx_hash = %record.tx_hash,
			route = %record.route_pair(),
			amount = record.amount,
			"registered cross-chain transfer"
		);
		self.active.insert(new.tx_hash, record.clone());
		Ok(record)
	}

	/// Applies a stage notification to a transfer.
	///
	/// Unknown hashes are a silent no-op returning `None`: late and
	/// duplicate notifications are expected under at-least-once delivery.
	/// Terminal records are returned unchanged.
	pub async fn update_stage(
		&self,
		tx_hash: &str,
		stage: Stage,
		update: StageUpdate,
	) -> Option<TransferRecord> {
		let (snapshot, newly_terminal) = {
			let mut entry = match self.active.get_mut(tx_hash) {
				Some(entry) => entry,
				None => {
					debug!(tx_hash, %stage, "ignoring update for unknown transfer");
					return None;
				}
			};
			let record = entry.value_mut();
			if record.status.is_terminal() {
				debug!(
					tx_hash,
					status = %record.status,
					"ignoring update for terminal transfer"
				);
				return Some(record.clone());
			}

			apply_update(record, stage, update);
			(record.clone(), record.status.is_terminal())
		};

		if newly_terminal {
			info!(
				tx_hash,
				status = %snapshot.status,
				"transfer reached terminal status"
			);
			self.archive(snapshot.clone()).await;
			self.retire_after_grace(tx_hash.to_string());
		}

		Some(snapshot)
	}

	/// Resolves a live or historical record with derived progress fields.
	pub async fn get_status(&self, tx_hash: &str) -> Option<TransferStatusView> {
		self.find_record(tx_hash).await.map(view)
	}

	/// All non-terminal transfers.
	pub async fn active_transfers(&self) -> Vec<TransferStatusView> {
		self.active
			.iter()
			.filter(|entry| !entry.value().status.is_terminal())
			.map(|entry| view(entry.value().clone()))
			.collect()
	}

	/// Aggregates over active and historical transfers, deduplicated by
	/// hash during the retirement grace window.
	pub async fn statistics(&self) -> TransferStatistics {
		let mut records: Vec<TransferRecord> = Vec::new();
		let mut seen: HashSet<String> = HashSet::new();

		for entry in self.active.iter() {
			seen.insert(entry.key().clone());
			records.push(entry.value().clone());
		}
		for record in self.history.read().await.iter() {
			if !seen.contains(&record.tx_hash) {
				records.push(record.clone());
			}
		}

		let mut by_route: HashMap<String, RouteStats> = HashMap::new();
		let mut completed = 0u64;
		let mut failed = 0u64;
		let mut active = 0u64;
		let mut completion_total = 0u64;

		for record in &records {
			let stats = by_route.entry(record.route_pair()).or_default();
			stats.count += 1;
			match record.status {
				TransferStatus::Complete => {
					completed += 1;
					stats.completed += 1;
					if let Some(done) = record.completed_at {
						completion_total += done.saturating_sub(record.initiated_at);
					}
				}
				TransferStatus::Failed => {
					failed += 1;
					stats.failed += 1;
				}
				_ => active += 1,
			}
		}

		let terminal = completed + failed;
		TransferStatistics {
			total: records.len() as u64,
			active,
			completed,
			failed,
			average_completion_seconds: if completed > 0 {
				Some(completion_total as f64 / completed as f64)
			} else {
				None
			},
			success_rate_pct: if terminal > 0 {
				completed as f64 / terminal as f64 * 100.0
			} else {
				100.0
			},
			by_route,
		}
	}

	async fn find_record(&self, tx_hash: &str) -> Option<TransferRecord> {
		if let Some(entry) = self.active.get(tx_hash) {
			return Some(entry.value().clone());
		}
		self.history
			.read()
			.await
			.iter()
			.find(|r| r.tx_hash == tx_hash)
			.cloned()
	}

	/// Copies a terminal record into the most-recent-first history buffer,
	/// evicting the oldest entries past the cap.
	async fn archive(&self, record: TransferRecord) {
		let mut history = self.history.write().await;
		history.push_front(record);
		if history.len() > self.config.history_limit {
			let evicted = history.len() - self.config.history_limit;
			history.truncate(self.config.history_limit);
			warn!(evicted, "transfer history over capacity, evicted oldest");
		}
	}

	/// Removes a terminal record from the active map after the grace delay,
	/// so callers holding the hash can still resolve late queries.
	fn retire_after_grace(&self, tx_hash: String) {
		if self.config.retirement_grace_seconds == 0 {
			self.active.remove(&tx_hash);
			return;
		}
		let active = Arc::clone(&self.active);
		let grace = self.config.retirement_grace_seconds;
		tokio::spawn(async move {
			tokio::time::sleep(Duration::from_secs(grace)).await;
			active.remove(&tx_hash);
		});
	}
}

fn apply_update(record: &mut TransferRecord, stage: Stage, update: StageUpdate) {
	let timestamp = update.timestamp.unwrap_or_else(now_seconds);
	let stage_state = record.stages.get_mut(stage);

	if update.success {
		stage_state.status = StageStatus::Complete;
		stage_state.timestamp = Some(timestamp);
		stage_state.error = None;
		match stage {
			Stage::Attestation => {
				record.status = TransferStatus::Attested;
				record.attested_at = Some(timestamp);
			}
			Stage::Mint => {
				record.status = TransferStatus::Complete;
				record.completed_at = Some(timestamp);
			}
			// Burn completed at registration; a duplicate confirmation only
			// refreshes the stage timestamp.
			Stage::Burn => {}
		}
	} else {
		let message = update
			.error
			.unwrap_or_else(|| "unknown error".to_string());
		stage_state.status = StageStatus::Failed;
		stage_state.timestamp = Some(timestamp);
		stage_state.error = Some(message.clone());
		record.errors.push(TransferErrorEvent {
			stage,
			message,
			timestamp,
		});
		record.status = TransferStatus::Failed;
	}

	record.updated_at = timestamp;
}

fn view(record: TransferRecord) -> TransferStatusView {
	let end = if record.status.is_terminal() {
		record.updated_at
	} else {
		now_seconds()
	};
	let elapsed_seconds = end.saturating_sub(record.initiated_at);
	let progress_pct = record.stages.completed_count() as f64 / 3.0 * 100.0;
	TransferStatusView {
		record,
		elapsed_seconds,
		progress_pct,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn tracker() -> TransferTracker {
		TransferTracker::new(TrackerConfig {
			history_limit: 1000,
			retirement_grace_seconds: 0,
		})
	}

	fn transfer(hash: &str) -> NewTransfer {
		NewTransfer {
			tx_hash: hash.to_string(),
			source_chain: "ethereum".to_string(),
			destination_chain: "base".to_string(),
			amount: 25_000.0,
			recipient: "0xrecipient".to_string(),
		}
	}

	#[tokio::test]
	async fn test_registration_marks_burn_complete() {
		let tracker = tracker();
		let record = tracker.register_transfer(transfer("0x1")).await.unwrap();

		assert_eq!(record.status, TransferStatus::Initiated);
		assert_eq!(record.stages.burn.status, StageStatus::Complete);
		assert_eq!(record.stages.attestation.status, StageStatus::Pending);

		let view = tracker.get_status("0x1").await.unwrap();
		assert!((view.progress_pct - 100.0 / 3.0).abs() < 1e-9);
	}

	#[tokio::test]
	async fn test_registration_validates_input() {
		let tracker = tracker();
		let mut missing_hash = transfer("");
		missing_hash.tx_hash = String::new();
		assert!(matches!(
			tracker.register_transfer(missing_hash).await,
			Err(TransferError::InvalidInput(_))
		));

		let mut zero_amount = transfer("0x1");
		zero_amount.amount = 0.0;
		assert!(matches!(
			tracker.register_transfer(zero_amount).await,
			Err(TransferError::InvalidInput(_))
		));
	}

	#[tokio::test]
	async fn test_duplicate_registration_returns_existing() {
		let tracker = tracker();
		let first = tracker.register_transfer(transfer("0x1")).await.unwrap();
		tracker
			.update_stage("0x1", Stage::Attestation, StageUpdate::succeeded())
			.await;
		let second = tracker.register_transfer(transfer("0x1")).await.unwrap();
		assert_eq!(second.status, TransferStatus::Attested);
		assert_eq!(first.initiated_at, second.initiated_at);
	}

	#[tokio::test]
	async fn test_attestation_failure_marks_failed() {
		let tracker = tracker();
		tracker.register_transfer(transfer("0xabc")).await.unwrap();

		let record = tracker
			.update_stage(
				"0xabc",
				Stage::Attestation,
				StageUpdate::failed("timeout"),
			)
			.await
			.unwrap();

		assert_eq!(record.status, TransferStatus::Failed);
		assert_eq!(record.errors.len(), 1);
		assert_eq!(record.errors[0].stage, Stage::Attestation);
		assert_eq!(record.errors[0].message, "timeout");
	}

	#[tokio::test]
	async fn test_full_lifecycle_to_complete() {
		let tracker = tracker();
		tracker.register_transfer(transfer("0x1")).await.unwrap();

		let record = tracker
			.update_stage("0x1", Stage::Attestation, StageUpdate::succeeded())
			.await
			.unwrap();
		assert_eq!(record.status, TransferStatus::Attested);
		assert!(record.attested_at.is_some());

		let record = tracker
			.update_stage("0x1", Stage::Mint, StageUpdate::succeeded())
			.await
			.unwrap();
		assert_eq!(record.status, TransferStatus::Complete);
		assert!(record.completed_at.is_some());

		// Retired from the active map (zero grace) but still resolvable.
		let view = tracker.get_status("0x1").await.unwrap();
		assert_eq!(view.record.status, TransferStatus::Complete);
		assert_eq!(view.progress_pct, 100.0);
		assert!(tracker.active_transfers().await.is_empty());
	}

	#[tokio::test]
	async fn test_terminal_records_never_transition() {
		let tracker = TransferTracker::new(TrackerConfig {
			history_limit: 10,
			// Keep the record in the active map so the guard is what
			// rejects the update, not retirement.
			retirement_grace_seconds: 3600,
		});
		tracker.register_transfer(transfer("0x1")).await.unwrap();
		tracker
			.update_stage("0x1", Stage::Attestation, StageUpdate::failed("timeout"))
			.await
			.unwrap();

		let record = tracker
			.update_stage("0x1", Stage::Mint, StageUpdate::succeeded())
			.await
			.unwrap();
		assert_eq!(record.status, TransferStatus::Failed);
		assert_eq!(record.errors.len(), 1);
	}

	#[tokio::test]
	async fn test_unknown_hash_is_silent_noop() {
		let tracker = tracker();
		let result = tracker
			.update_stage("0xmissing", Stage::Mint, StageUpdate::succeeded())
			.await;
		assert!(result.is_none());
	}

	#[tokio::test]
	async fn test_statistics_counts_and_rates() {
		let tracker = tracker();

		tracker.register_transfer(transfer("0x1")).await.unwrap();
		tracker.register_transfer(transfer("0x2")).await.unwrap();
		tracker.register_transfer(transfer("0x3")).await.unwrap();

		tracker
			.update_stage("0x1", Stage::Attestation, StageUpdate::succeeded())
			.await;
		tracker
			.update_stage("0x1", Stage::Mint, StageUpdate::succeeded())
			.await;
		tracker
			.update_stage("0x2", Stage::Attestation, StageUpdate::failed("timeout"))
			.await;

		let stats = tracker.statistics().await;
		assert_eq!(stats.total, 3);
		assert_eq!(stats.active, 1);
		assert_eq!(stats.completed, 1);
		assert_eq!(stats.failed, 1);
		assert!((stats.success_rate_pct - 50.0).abs() < 1e-9);

		let pair = stats.by_route.get("ethereum->base").unwrap();
		assert_eq!(pair.count, 3);
		assert_eq!(pair.completed, 1);
		assert_eq!(pair.failed, 1);
		assert_eq!(pair.success_rate(), Some(0.5));
	}

	#[tokio::test]
	async fn test_history_evicts_oldest_past_cap() {
		let tracker = TransferTracker::new(TrackerConfig {
			history_limit: 2,
			retirement_grace_seconds: 0,
		});

		for hash in ["0x1", "0x2", "0x3"] {
			tracker.register_transfer(transfer(hash)).await.unwrap();
			tracker
				.update_stage(hash, Stage::Attestation, StageUpdate::succeeded())
				.await;
			tracker
				.update_stage(hash, Stage::Mint, StageUpdate::succeeded())
				.await;
		}

		// Most recent first; the first completion fell off.
		assert!(tracker.get_status("0x1").await.is_none());
		assert!(tracker.get_status("0x2").await.is_some());
		assert!(tracker.get_status("0x3").await.is_some());
	}

	#[tokio::test]
	async fn test_elapsed_uses_completion_time_when_terminal() {
		let tracker = tracker();
		let record = tracker.register_transfer(transfer("0x1")).await.unwrap();

		let completion = record.initiated_at + 42;
		tracker
			.update_stage(
				"0x1",
				Stage::Attestation,
				StageUpdate {
					success: true,
					error: None,
					timestamp: Some(record.initiated_at + 30),
				},
			)
			.await;
		tracker
			.update_stage(
				"0x1",
				Stage::Mint,
				StageUpdate {
					success: true,
					error: None,
					timestamp: Some(completion),
				},
			)
			.await;

		let view = tracker.get_status("0x1").await.unwrap();
		assert_eq!(view.elapsed_seconds, 42);
	}
}
