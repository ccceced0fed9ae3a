//! Guestbook service facade.
//!
//! Wires the connection manager, ledger client, transaction tracker,
//! notification listener and sync coordinator together behind the surface a
//! presentation layer consumes: `connect`, `disconnect`, `submit`, `reload`,
//! the sorted live message view and the connection state.

use crate::connection::{
	ConnectError, ConnectionManager, ConnectionState, Identity, NetworkIdentity, WalletProvider,
};
use crate::ledger::{GuestbookContract, LedgerClient, Message};
use crate::subscription::Subscription;
use crate::sync::{
	NotificationListener, SyncCoordinator, SyncError, TrackerConfig, TransactionTracker,
};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
	#[error(transparent)]
	Connect(#[from] ConnectError),

	#[error(transparent)]
	Sync(#[from] SyncError),
}

/// The application-facing guestbook client.
///
/// No state is persisted locally; the cache is memory-resident and rebuilt
/// from the ledger on every (re)connection.
pub struct GuestbookService {
	connection: ConnectionManager,
	coordinator: Arc<SyncCoordinator>,
	notifications: Mutex<Option<Subscription>>,
}

impl GuestbookService {
	pub fn new(
		provider: Option<Arc<dyn WalletProvider>>,
		contract: Arc<dyn GuestbookContract>,
		required_network: NetworkIdentity,
		tracker_config: TrackerConfig,
	) -> Self {
		let connection = ConnectionManager::new(provider, required_network);
		let ledger = LedgerClient::new(contract.clone(), connection.state());
		let tracker = TransactionTracker::new(contract.clone(), tracker_config);
		let listener = NotificationListener::new(contract);
		let coordinator = Arc::new(SyncCoordinator::new(ledger, tracker, listener));

		Self {
			connection,
			coordinator,
			notifications: Mutex::new(None),
		}
	}

	/// Connect the wallet, rebuild the cache from the ledger and subscribe to
	/// append notifications. Reconnecting replaces the previous notification
	/// subscription instead of stacking a second one.
	pub async fn connect(&self) -> Result<(Identity, NetworkIdentity), ServiceError> {
		let (account, network) = self.connection.connect().await?;

		// Subscribe before the initial reload: an append landing between the
		// snapshot's count and its per-index fetches is then merged by the
		// union instead of falling into a window no one observes.
		let subscription = self.coordinator.start_notifications().await?;
		if let Some(previous) = self.notifications.lock().unwrap().replace(subscription) {
			previous.cancel();
		}
		self.coordinator.reload().await?;

		info!(account = %account, "guestbook service connected");
		Ok((account, network))
	}

	/// Cancel the notification subscription and drop the wallet connection.
	/// Cached messages stay readable; write capability is revoked.
	pub fn disconnect(&self) {
		if let Some(subscription) = self.notifications.lock().unwrap().take() {
			subscription.cancel();
		}
		self.connection.disconnect();
	}

	/// Append a message and wait for it to be confirmed and visible locally.
	pub async fn submit(&self, content: &str) -> Result<(), SyncError> {
		self.coordinator.submit(content).await
	}

	/// Rebuild the local cache from the ledger on demand.
	pub async fn reload(&self) -> Result<(), SyncError> {
		self.coordinator.reload().await
	}

	/// Snapshot of the messages, sorted newest first.
	pub fn messages(&self) -> Vec<Message> {
		self.coordinator.messages()
	}

	/// Live view of the sorted messages.
	pub fn view(&self) -> watch::Receiver<Vec<Message>> {
		self.coordinator.view()
	}

	/// Live view of the connection state.
	pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
		self.connection.state()
	}

	/// Snapshot of the current connection state.
	pub fn current_connection_state(&self) -> ConnectionState {
		self.connection.current_state()
	}
}
