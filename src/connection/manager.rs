//! Connection state machine and network validation.
//!
//! `connect` requests account access, validates that the provider's active
//! network matches the guestbook's deployment network (switching, and if needed
//! registering, the network once) and then watches for external account
//! changes. The manager is the single mutator of [`ConnectionState`]; observers
//! hold a watch receiver.

use crate::connection::provider::{
	Identity, NetworkIdentity, ProviderError, SwitchChainError, WalletProvider,
};
use crate::subscription::Subscription;
use futures_util::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// State of the link to the wallet provider.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionState {
	Disconnected,
	Connecting,
	Connected {
		account: Identity,
		network: NetworkIdentity,
	},
	Error(String),
}

impl ConnectionState {
	/// Whether ledger operations are currently permitted.
	pub fn is_connected(&self) -> bool {
		matches!(self, ConnectionState::Connected { .. })
	}
}

/// Errors from establishing a validated connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
	#[error("no wallet provider is available")]
	ProviderMissing,

	#[error("provider returned no accounts")]
	NoAccounts,

	#[error("active chain {active} does not match required chain {required}")]
	NetworkMismatch { active: u64, required: u64 },

	#[error("provider error: {0}")]
	Provider(#[from] ProviderError),
}

/// Owner of the wallet connection and of [`ConnectionState`].
pub struct ConnectionManager {
	provider: Option<Arc<dyn WalletProvider>>,
	required_network: NetworkIdentity,
	state_tx: Arc<watch::Sender<ConnectionState>>,
	account_watch: Mutex<Option<Subscription>>,
}

impl ConnectionManager {
	/// Create a manager for the given provider. `None` models an environment
	/// with no wallet installed; `connect` then fails with `ProviderMissing`.
	pub fn new(provider: Option<Arc<dyn WalletProvider>>, required_network: NetworkIdentity) -> Self {
		let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
		Self {
			provider,
			required_network,
			state_tx: Arc::new(state_tx),
			account_watch: Mutex::new(None),
		}
	}

	/// Watch channel over the connection state.
	pub fn state(&self) -> watch::Receiver<ConnectionState> {
		self.state_tx.subscribe()
	}

	/// Snapshot of the current connection state.
	pub fn current_state(&self) -> ConnectionState {
		self.state_tx.borrow().clone()
	}

	/// Establish a validated connection: request accounts, ensure the active
	/// network is the required one (switching and registering it if necessary),
	/// and start watching for account changes.
	///
	/// Never proceeds on the wrong network; a switch that still leaves the
	/// provider elsewhere fails with `NetworkMismatch`. No automatic retries
	/// beyond the single switch retry after registering an unknown network.
	pub async fn connect(&self) -> Result<(Identity, NetworkIdentity), ConnectError> {
		let provider = self
			.provider
			.clone()
			.ok_or(ConnectError::ProviderMissing)?;

		self.state_tx.send_replace(ConnectionState::Connecting);

		let result: Result<(Identity, NetworkIdentity), ConnectError> = async {
			let (account, network) = self.connect_inner(&provider).await?;
			self.watch_accounts(&provider).await?;
			Ok((account, network))
		}
		.await;

		match result {
			Ok((account, network)) => {
				self.state_tx.send_replace(ConnectionState::Connected {
					account: account.clone(),
					network: network.clone(),
				});
				info!(account = %account, chain_id = network.chain_id, "wallet connected");
				Ok((account, network))
			}
			Err(e) => {
				self.state_tx
					.send_replace(ConnectionState::Error(e.to_string()));
				Err(e)
			}
		}
	}

	async fn connect_inner(
		&self,
		provider: &Arc<dyn WalletProvider>,
	) -> Result<(Identity, NetworkIdentity), ConnectError> {
		let accounts = provider.request_accounts().await.map_err(|e| match e {
			ProviderError::Unavailable => ConnectError::ProviderMissing,
			other => ConnectError::Provider(other),
		})?;
		let account = accounts
			.first()
			.cloned()
			.map(Identity::new)
			.ok_or(ConnectError::NoAccounts)?;

		let active = provider.chain_id().await?;
		if active != self.required_network.chain_id {
			debug!(
				active,
				required = self.required_network.chain_id,
				"active chain differs from required chain, requesting switch"
			);
			self.ensure_network(provider, active).await?;
		}

		Ok((account, self.required_network.clone()))
	}

	/// Switch the provider to the required network, registering it first when
	/// the provider does not know it. The switch is retried exactly once after
	/// registration; any remaining mismatch is a hard failure.
	async fn ensure_network(
		&self,
		provider: &Arc<dyn WalletProvider>,
		active: u64,
	) -> Result<(), ConnectError> {
		let required = self.required_network.chain_id;
		let mismatch = ConnectError::NetworkMismatch { active, required };

		match provider.switch_chain(required).await {
			Ok(()) => {}
			Err(SwitchChainError::UnknownChain(chain_id)) => {
				info!(chain_id, "network unknown to provider, registering it");
				provider.add_chain(&self.required_network).await?;
				if provider.switch_chain(required).await.is_err() {
					return Err(mismatch);
				}
			}
			Err(SwitchChainError::Provider(e)) => {
				warn!("network switch failed: {}", e);
				return Err(mismatch);
			}
		}

		// The switch request can succeed while the provider stays put; trust
		// only the re-queried chain id.
		let now_active = provider.chain_id().await?;
		if now_active != required {
			return Err(ConnectError::NetworkMismatch {
				active: now_active,
				required,
			});
		}
		Ok(())
	}

	/// Register the account-change subscription, replacing (and cancelling) any
	/// previous one so reconnects never accumulate duplicate listeners.
	async fn watch_accounts(&self, provider: &Arc<dyn WalletProvider>) -> Result<(), ConnectError> {
		let mut stream = provider.account_changes().await?;
		let cancelled = Arc::new(AtomicBool::new(false));
		let flag = cancelled.clone();
		let state_tx = self.state_tx.clone();

		let task = tokio::spawn(async move {
			while let Some(accounts) = stream.next().await {
				if flag.load(Ordering::SeqCst) {
					break;
				}
				match accounts.first() {
					None => {
						// The user revoked access; write capability is gone but
						// cached reads stay with the sync coordinator.
						info!("account list became empty, disconnecting");
						state_tx.send_replace(ConnectionState::Disconnected);
					}
					Some(first) => {
						let identity = Identity::new(first.clone());
						debug!(account = %identity, "active account changed");
						state_tx.send_modify(|state| {
							if let ConnectionState::Connected { account, .. } = state {
								*account = identity;
							}
						});
					}
				}
			}
		});

		let subscription = Subscription::new(cancelled, task);
		let previous = self
			.account_watch
			.lock()
			.unwrap()
			.replace(subscription);
		if let Some(previous) = previous {
			debug!("replacing existing account-change subscription");
			previous.cancel();
		}
		Ok(())
	}

	/// Tear down the account watch and mark the connection as closed.
	pub fn disconnect(&self) {
		if let Some(subscription) = self.account_watch.lock().unwrap().take() {
			subscription.cancel();
		}
		self.state_tx.send_replace(ConnectionState::Disconnected);
		info!("wallet disconnected");
	}
}
