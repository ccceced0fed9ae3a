//! Client-side synchronization for an append-only on-chain guestbook.
//!
//! The guestbook lives in a smart contract on a fixed network and is written to
//! through a user's wallet. This crate keeps a local, read-optimized view of the
//! ledger consistent with on-chain truth despite confirmation latency, concurrent
//! writers and unreliable connectivity. It is organized around five components:
//!
//! - `connection`: wallet connection and network validation, the single owner of
//!   [`ConnectionState`].
//! - `ledger`: typed read/write access to the contract (`count`, `fetch`, `append`)
//!   behind the [`GuestbookContract`] seam.
//! - `sync`: the transaction tracker, the append-notification listener and the
//!   [`SyncCoordinator`], the single owner of the local message cache.
//! - `service`: the [`GuestbookService`] facade a presentation layer talks to.
//!
//! The wallet provider and the contract itself are external collaborators and are
//! only reachable through the [`WalletProvider`] and [`GuestbookContract`] traits.

pub mod connection;
pub mod ledger;
pub mod service;
pub mod subscription;
pub mod sync;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use connection::{
	ConnectError, ConnectionManager, ConnectionState, Identity, NetworkIdentity, ProviderError,
	SwitchChainError, WalletProvider,
};
pub use ledger::{
	AppendedEvent, ContractError, GuestbookContract, LedgerClient, Message, PendingTransaction,
	ReadError, TxHandle, TxState, WriteError,
};
pub use service::{GuestbookService, ServiceError};
pub use subscription::Subscription;
pub use sync::{
	NotificationListener, SyncCoordinator, SyncError, TrackerConfig, TransactionTracker, TxError,
};
