//! Validated read/write client for the guestbook contract.
//!
//! Every operation is gated on an active validated connection and converts the
//! contract's loosely-shaped data into the strict [`Message`] schema at this
//! boundary. Content validation happens locally before any remote round trip.

use crate::connection::ConnectionState;
use crate::ledger::contract::{ContractError, GuestbookContract, RawEntry};
use crate::ledger::types::{Message, PendingTransaction};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// Client-side content length bound, in characters. The server-side bound may
/// differ and then surfaces as a rejected submission.
pub const MAX_CONTENT_CHARS: usize = 280;

/// Errors from remote reads.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
	#[error("no active validated connection")]
	NotConnected,

	#[error("index {index} out of range (message count is {count})")]
	IndexOutOfRange { index: u64, count: u64 },

	/// The remote returned an entry that does not fit the message schema.
	#[error("malformed entry at index {index}: {reason}")]
	MalformedEntry { index: u64, reason: String },

	#[error("remote read failed: {0}")]
	Remote(ContractError),
}

/// Errors from submitting a write.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
	#[error("no active validated connection")]
	NotConnected,

	/// Local validation failure; never sent to the remote.
	#[error("content must be 1..={MAX_CONTENT_CHARS} characters, got {length}")]
	InvalidContent { length: usize },

	#[error("submission failed: {0}")]
	Submission(#[from] ContractError),
}

/// Typed read/write access to the remote append-only store.
#[derive(Clone)]
pub struct LedgerClient {
	contract: Arc<dyn GuestbookContract>,
	connection: watch::Receiver<ConnectionState>,
}

impl LedgerClient {
	pub fn new(
		contract: Arc<dyn GuestbookContract>,
		connection: watch::Receiver<ConnectionState>,
	) -> Self {
		Self {
			contract,
			connection,
		}
	}

	fn is_connected(&self) -> bool {
		self.connection.borrow().is_connected()
	}

	/// Current number of messages.
	pub async fn count(&self) -> Result<u64, ReadError> {
		if !self.is_connected() {
			return Err(ReadError::NotConnected);
		}
		self.contract
			.message_count()
			.await
			.map_err(Self::map_read_error)
	}

	/// Read one entry, converting it into the strict message schema.
	pub async fn fetch(&self, index: u64) -> Result<Message, ReadError> {
		if !self.is_connected() {
			return Err(ReadError::NotConnected);
		}
		let entry = self
			.contract
			.message_at(index)
			.await
			.map_err(Self::map_read_error)?;
		Self::message_from_entry(index, entry)
	}

	/// Validate and submit an append, returning the pending transaction
	/// immediately without waiting for finality.
	pub async fn append(&self, content: &str) -> Result<PendingTransaction, WriteError> {
		if !self.is_connected() {
			return Err(WriteError::NotConnected);
		}

		let length = content.chars().count();
		if length == 0 || length > MAX_CONTENT_CHARS {
			debug!(length, "rejecting content locally");
			return Err(WriteError::InvalidContent { length });
		}

		let handle = self.contract.submit_message(content).await?;
		info!(handle = %handle, "append submitted");
		Ok(PendingTransaction::new(handle, content.to_string()))
	}

	fn map_read_error(e: ContractError) -> ReadError {
		match e {
			ContractError::IndexOutOfRange { index, count } => {
				ReadError::IndexOutOfRange { index, count }
			}
			other => ReadError::Remote(other),
		}
	}

	/// Reject or convert the remote tuple at the boundary rather than trusting
	/// its ambient shape.
	fn message_from_entry(index: u64, entry: RawEntry) -> Result<Message, ReadError> {
		let (author, content, timestamp) = entry;
		if author.is_empty() {
			return Err(ReadError::MalformedEntry {
				index,
				reason: "empty author".to_string(),
			});
		}
		Ok(Message {
			author: crate::connection::Identity::new(author),
			content,
			timestamp,
			index,
		})
	}
}
