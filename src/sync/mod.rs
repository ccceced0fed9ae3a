//! Ledger synchronization.
//!
//! This module keeps the local message cache consistent with on-chain truth.
//! It is composed of:
//!
//! - `cache`: the index-keyed local cache with union merge semantics.
//! - `tracker`: the submitted-write state machine (`Submitted` to `Confirmed`
//!   or `Failed`, exactly once).
//! - `listener`: the append-notification subscription with idempotent cancel.
//! - `coordinator`: the single writer of the cache, merging authoritative full
//!   reloads with incremental notifications and driving the write path.

/// Index-keyed local cache
mod cache;
/// Sync coordinator, the single cache writer
mod coordinator;
/// Append-notification listener
mod listener;
/// Transaction lifecycle tracking
mod tracker;

pub use coordinator::{SyncCoordinator, SyncError};
pub use listener::NotificationListener;
pub use tracker::{TrackerConfig, TransactionTracker, TxError};
