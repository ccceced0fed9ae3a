//! Typed access to the on-chain guestbook.
//!
//! The contract is an append-only indexed store (`count`, `get(index)`,
//! `append(content)`, `MessageAdded` event). [`contract`] defines the seam the
//! remote store is reached through, [`types`] the strict message schema, and
//! [`client`] the validated read/write client the sync layer uses.

/// Read/write client with local validation and connection gating
mod client;
/// Contract seam and raw wire types
mod contract;
/// Message schema and transaction lifecycle types
mod types;

pub use client::{LedgerClient, MAX_CONTENT_CHARS, ReadError, WriteError};
pub use contract::{AppendedEvent, ContractError, GuestbookContract, RawEntry, TxHandle};
pub use types::{Message, PendingTransaction, TxState};
