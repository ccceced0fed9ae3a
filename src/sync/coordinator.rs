//! Sync coordinator, the single writer of the local message cache.
//!
//! The coordinator merges authoritative full reloads with incremental append
//! notifications and drives the write path. Consistency rules:
//!
//! - A reload replaces the cache atomically from the consumer's perspective:
//!   either the whole snapshot is merged or, on any read error, the previous
//!   cache is kept untouched.
//! - `count` followed by per-index fetches is not snapshot-consistent, so a
//!   reload's result is merged as a union by index with whatever notifications
//!   arrived during the reload window; the cache never shrinks.
//! - The message index is the sole deduplication key across both paths.
//! - At most one reload is in flight; a request made while one is running is
//!   satisfied by the soonest reload that started no earlier than the request.

use crate::ledger::{
	AppendedEvent, ContractError, LedgerClient, Message, ReadError, WriteError,
};
use crate::subscription::Subscription;
use crate::sync::cache::MessageCache;
use crate::sync::listener::NotificationListener;
use crate::sync::tracker::{TransactionTracker, TxError};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{debug, info};

/// Errors from synchronization operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
	#[error("reload failed: {0}")]
	Read(#[from] ReadError),

	#[error("write failed: {0}")]
	Write(#[from] WriteError),

	#[error("transaction failed: {0}")]
	Tx(#[from] TxError),

	#[error("notification subscription failed: {0}")]
	Subscribe(#[from] ContractError),
}

/// Reload bookkeeping. `started` counts reloads that began; `completed` holds
/// the start epoch of the last reload that finished successfully. A caller
/// whose request predates a completed reload's start is satisfied by it.
#[derive(Debug, Default)]
struct ReloadEpochs {
	started: u64,
	completed: u64,
}

/// Owner of the local cache; merges reloads and notifications, drives writes.
pub struct SyncCoordinator {
	ledger: LedgerClient,
	tracker: TransactionTracker,
	listener: NotificationListener,
	// Never held across an await.
	cache: Mutex<MessageCache>,
	view_tx: watch::Sender<Vec<Message>>,
	reload_slot: tokio::sync::Mutex<()>,
	epochs: Mutex<ReloadEpochs>,
}

impl SyncCoordinator {
	pub fn new(
		ledger: LedgerClient,
		tracker: TransactionTracker,
		listener: NotificationListener,
	) -> Self {
		let (view_tx, _) = watch::channel(Vec::new());
		Self {
			ledger,
			tracker,
			listener,
			cache: Mutex::new(MessageCache::new()),
			view_tx,
			reload_slot: tokio::sync::Mutex::new(()),
			epochs: Mutex::new(ReloadEpochs::default()),
		}
	}

	/// Read-only live view of the cache, sorted by timestamp descending with
	/// ties broken by index descending.
	pub fn view(&self) -> watch::Receiver<Vec<Message>> {
		self.view_tx.subscribe()
	}

	/// Snapshot of the current sorted view.
	pub fn messages(&self) -> Vec<Message> {
		self.view_tx.borrow().clone()
	}

	/// Reload the full ledger and merge it into the cache.
	///
	/// Coalescing: overlapping requests share reloads. If a reload that
	/// started after this request has already completed by the time the reload
	/// slot frees up, its result satisfies this caller and no further remote
	/// reads are made.
	pub async fn reload(&self) -> Result<(), SyncError> {
		let requested = self.epochs.lock().unwrap().started;
		let _slot = self.reload_slot.lock().await;

		let my_epoch = {
			let mut epochs = self.epochs.lock().unwrap();
			if epochs.completed > requested {
				debug!("reload request coalesced into a completed reload");
				return Ok(());
			}
			epochs.started += 1;
			epochs.started
		};

		// Any read error aborts the reload here, leaving the previous cache
		// (and the completion epoch) untouched.
		let snapshot = self.load_snapshot().await?;

		{
			let mut cache = self.cache.lock().unwrap();
			cache.merge_snapshot(snapshot);
			self.publish(&cache);
			info!(
				messages = cache.len(),
				max_index = ?cache.max_index(),
				"reload merged"
			);
		}
		self.epochs.lock().unwrap().completed = my_epoch;
		Ok(())
	}

	async fn load_snapshot(&self) -> Result<Vec<Message>, ReadError> {
		let count = self.ledger.count().await?;
		debug!(count, "loading ledger snapshot");
		let mut snapshot = Vec::with_capacity(count as usize);
		for index in 0..count {
			snapshot.push(self.ledger.fetch(index).await?);
		}
		Ok(snapshot)
	}

	/// Merge one notified append. Duplicate delivery of an index already held
	/// (from redelivery or a racing reload) is ignored; this path never removes
	/// entries and never reorders beyond the standard sort.
	fn handle_append(&self, event: AppendedEvent) {
		let index = event.index;
		let mut cache = self.cache.lock().unwrap();
		if cache.contains(index) {
			debug!(index, "ignoring duplicate append notification");
			return;
		}
		cache.insert(Message::from(event));
		debug!(index, "merged notified append");
		self.publish(&cache);
	}

	/// Subscribe the coordinator to append notifications. The returned handle
	/// owns the forwarding task; cancelling it stops the merge path.
	pub async fn start_notifications(self: &Arc<Self>) -> Result<Subscription, SyncError> {
		let coordinator = Arc::downgrade(self);
		let subscription = self
			.listener
			.subscribe(move |event| {
				if let Some(coordinator) = coordinator.upgrade() {
					coordinator.handle_append(event);
				}
			})
			.await?;
		Ok(subscription)
	}

	/// Submit a message: append, await finality, then reload so the cache
	/// reflects the confirmed write. A failed transaction surfaces its error
	/// without mutating the cache.
	pub async fn submit(&self, content: &str) -> Result<(), SyncError> {
		let mut pending = self.ledger.append(content).await?;
		self.tracker.await_outcome(&mut pending).await?;
		self.reload().await?;
		Ok(())
	}

	fn publish(&self, cache: &MessageCache) {
		self.view_tx.send_replace(cache.sorted_view());
	}
}
