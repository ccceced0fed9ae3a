//! Message schema and transaction lifecycle types.

use crate::connection::Identity;
use crate::ledger::contract::{AppendedEvent, TxHandle};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// One immutable guestbook entry.
///
/// `index` is assigned by the ledger at append time, monotonically increasing,
/// unique and immutable; it is the message's stable identity and the sole
/// deduplication key across the reload and notification paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
	pub author: Identity,
	pub content: String,
	/// Unix seconds, as recorded by the ledger.
	pub timestamp: u64,
	pub index: u64,
}

impl From<AppendedEvent> for Message {
	fn from(event: AppendedEvent) -> Self {
		Self {
			author: event.author,
			content: event.content,
			timestamp: event.timestamp,
			index: event.index,
		}
	}
}

/// Lifecycle state of a submitted write. Transitions exactly once from
/// `Submitted` to `Confirmed` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
	Submitted,
	Confirmed,
	Failed,
}

/// A write in flight: created on submit, resolved exactly once by the
/// transaction tracker, then discarded. A resubmission after failure is a brand
/// new append with a new handle; there is no notion of resuming a failed one.
#[derive(Debug)]
pub struct PendingTransaction {
	pub handle: TxHandle,
	pub content: String,
	pub submitted_at: SystemTime,
	pub state: TxState,
}

impl PendingTransaction {
	pub fn new(handle: TxHandle, content: String) -> Self {
		Self {
			handle,
			content,
			submitted_at: SystemTime::now(),
			state: TxState::Submitted,
		}
	}

	pub fn is_terminal(&self) -> bool {
		self.state != TxState::Submitted
	}
}
