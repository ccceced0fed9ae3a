//! Contract seam for the on-chain guestbook.
//!
//! The guestbook contract itself is an external collaborator; this trait is the
//! bit-exact surface the crate consumes: `count`, `get(index)` returning a
//! loosely-shaped `(author, content, timestamp)` tuple, `append(content)`
//! returning a transaction handle without waiting for finality, and the
//! `MessageAdded` append notification.

use crate::connection::Identity;
use futures::stream::BoxStream;
use std::fmt;

/// Raw `(author, content, unix-seconds timestamp)` tuple as returned by the
/// remote `get(index)` call. Converted to the strict [`Message`] schema at the
/// ledger client boundary.
///
/// [`Message`]: crate::ledger::Message
pub type RawEntry = (String, String, u64);

/// Opaque handle to a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TxHandle(String);

impl TxHandle {
	pub fn new(handle: impl Into<String>) -> Self {
		Self(handle.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for TxHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Payload of the contract's append notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendedEvent {
	pub author: Identity,
	pub index: u64,
	pub content: String,
	pub timestamp: u64,
}

/// Errors surfaced by the contract boundary.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
	#[error("index {index} out of range (message count is {count})")]
	IndexOutOfRange { index: u64, count: u64 },

	/// The submission was rejected before inclusion (for example by a
	/// server-side content bound that differs from the client-side one).
	#[error("submission rejected: {0}")]
	Rejected(String),

	/// The transaction was included but reverted.
	#[error("transaction reverted: {0}")]
	Reverted(String),

	/// The transaction was dropped before inclusion.
	#[error("transaction dropped from the pool")]
	Dropped,

	#[error("rpc error: {0}")]
	Rpc(String),
}

/// The append-only guestbook store.
///
/// All methods are remote calls and therefore suspension points. Reads are not
/// snapshot-consistent across calls; `message_count` followed by `message_at`
/// may race with concurrent appends, which the sync coordinator reconciles.
#[async_trait::async_trait]
pub trait GuestbookContract: Send + Sync {
	/// Total number of messages ever appended.
	async fn message_count(&self) -> Result<u64, ContractError>;

	/// Read one entry; fails with `IndexOutOfRange` when `index >= count`.
	async fn message_at(&self, index: u64) -> Result<RawEntry, ContractError>;

	/// Submit an append and return its handle immediately, without waiting for
	/// finality.
	async fn submit_message(&self, content: &str) -> Result<TxHandle, ContractError>;

	/// Suspend until the submission behind `handle` reaches finality (`Ok`) or
	/// fails terminally (`Reverted`/`Dropped`). May remain pending indefinitely.
	async fn confirmation(&self, handle: &TxHandle) -> Result<(), ContractError>;

	/// Subscribe to `MessageAdded` notifications. Delivery is at-least-once
	/// while subscribed; events before subscription began are not replayed.
	async fn appended_events(&self) -> Result<BoxStream<'static, AppendedEvent>, ContractError>;
}
