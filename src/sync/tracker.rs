//! Transaction lifecycle tracking.
//!
//! A submitted write moves from `Submitted` to exactly one of `Confirmed` or
//! `Failed`. The tracker never retries a failed submission; resubmission is a
//! brand new append decided by the caller. Confirmation waiting is unbounded by
//! default, with an optional configurable deadline whose expiry is treated as a
//! terminal failure.

use crate::ledger::{ContractError, GuestbookContract, PendingTransaction, TxState};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Tracker configuration.
#[derive(Debug, Clone, Default)]
pub struct TrackerConfig {
	/// Optional deadline for confirmation waiting. `None` (the default) waits
	/// indefinitely; expiry of a set deadline resolves the transaction as
	/// failed without the remote submission being cancelled.
	pub confirmation_timeout: Option<Duration>,
}

/// Terminal transaction failures, distinct from a successful-but-slow pending
/// transaction.
#[derive(Debug, thiserror::Error)]
pub enum TxError {
	#[error("transaction reverted: {0}")]
	Reverted(String),

	#[error("transaction dropped before inclusion")]
	Dropped,

	#[error("no confirmation within {after:?}")]
	ConfirmationTimeout { after: Duration },

	#[error("confirmation watch failed: {0}")]
	Watch(String),

	/// The transaction already reached a terminal state; it resolves exactly
	/// once.
	#[error("transaction already resolved")]
	AlreadyResolved,
}

/// Tracks submitted writes through finality or failure.
#[derive(Clone)]
pub struct TransactionTracker {
	contract: Arc<dyn GuestbookContract>,
	config: TrackerConfig,
}

impl TransactionTracker {
	pub fn new(contract: Arc<dyn GuestbookContract>, config: TrackerConfig) -> Self {
		Self { contract, config }
	}

	/// Suspend until the transaction reaches finality or fails, then resolve
	/// its state exactly once. The caller decides whether to resubmit after a
	/// failure.
	pub async fn await_outcome(&self, tx: &mut PendingTransaction) -> Result<(), TxError> {
		if tx.is_terminal() {
			return Err(TxError::AlreadyResolved);
		}

		debug!(handle = %tx.handle, "waiting for confirmation");
		let wait = self.contract.confirmation(&tx.handle);
		let outcome = match self.config.confirmation_timeout {
			Some(limit) => match timeout(limit, wait).await {
				Ok(outcome) => outcome,
				Err(_) => {
					warn!(handle = %tx.handle, ?limit, "confirmation deadline expired");
					tx.state = TxState::Failed;
					return Err(TxError::ConfirmationTimeout { after: limit });
				}
			},
			None => wait.await,
		};

		match outcome {
			Ok(()) => {
				tx.state = TxState::Confirmed;
				info!(handle = %tx.handle, "transaction confirmed");
				Ok(())
			}
			Err(e) => {
				tx.state = TxState::Failed;
				warn!(handle = %tx.handle, "transaction failed: {}", e);
				Err(Self::map_failure(e))
			}
		}
	}

	fn map_failure(e: ContractError) -> TxError {
		match e {
			ContractError::Reverted(reason) => TxError::Reverted(reason),
			ContractError::Dropped => TxError::Dropped,
			other => TxError::Watch(other.to_string()),
		}
	}
}
