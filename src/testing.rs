//! Shared test doubles for the wallet provider and the guestbook contract.
//!
//! The mocks are deliberately small state machines with injection points for
//! the failure modes the components have to handle: unknown chains, refused
//! switches, read failures, reverted submissions and confirmations that never
//! arrive. Event streams use unbounded channels so tests can emit appends and
//! account changes synchronously.

use crate::connection::{
	Identity, NetworkIdentity, ProviderError, SwitchChainError, WalletProvider,
};
use crate::ledger::{AppendedEvent, ContractError, GuestbookContract, RawEntry, TxHandle};
use futures::stream::BoxStream;
use futures_util::StreamExt;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::watch;

/// Initialize test logging; safe to call from multiple tests.
pub(crate) fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_test_writer()
		.try_init();
}

/// A watch receiver pinned to a connected state, for components that only need
/// the connection gate open.
pub(crate) fn connected_state() -> watch::Receiver<crate::connection::ConnectionState> {
	let (tx, rx) = watch::channel(crate::connection::ConnectionState::Connected {
		account: Identity::new("0xa11ce"),
		network: NetworkIdentity::conflux_espace_testnet(),
	});
	// The state never changes in these tests; keep only the receiver.
	drop(tx);
	rx
}

fn channel_stream<T: Send + 'static>(rx: mpsc::UnboundedReceiver<T>) -> BoxStream<'static, T> {
	futures::stream::unfold(rx, |mut rx| async move {
		rx.recv().await.map(|item| (item, rx))
	})
	.boxed()
}

/// Scriptable wallet provider.
pub(crate) struct MockWalletProvider {
	accounts: Mutex<Vec<String>>,
	active_chain: AtomicU64,
	known_chains: Mutex<HashSet<u64>>,
	account_streams: Mutex<Vec<mpsc::UnboundedSender<Vec<String>>>>,
	switch_calls: AtomicUsize,
	add_chain_calls: AtomicUsize,
	refuse_switches: AtomicBool,
}

impl MockWalletProvider {
	pub fn new(accounts: Vec<String>, active_chain: u64) -> Self {
		let known_chains = Mutex::new(HashSet::from([active_chain]));
		Self {
			accounts: Mutex::new(accounts),
			active_chain: AtomicU64::new(active_chain),
			known_chains,
			account_streams: Mutex::new(Vec::new()),
			switch_calls: AtomicUsize::new(0),
			add_chain_calls: AtomicUsize::new(0),
			refuse_switches: AtomicBool::new(false),
		}
	}

	/// Make a chain switchable without a registration call.
	pub fn register_chain(&self, chain_id: u64) {
		self.known_chains.lock().unwrap().insert(chain_id);
	}

	/// Refuse every switch request, registered or not.
	pub fn fail_switches(&self) {
		self.refuse_switches.store(true, Ordering::SeqCst);
	}

	/// Emit an account-change notification to all open streams.
	pub fn emit_accounts(&self, accounts: Vec<String>) {
		*self.accounts.lock().unwrap() = accounts.clone();
		for sender in self.account_streams.lock().unwrap().iter() {
			let _ = sender.send(accounts.clone());
		}
	}

	pub fn switch_calls(&self) -> usize {
		self.switch_calls.load(Ordering::SeqCst)
	}

	pub fn add_chain_calls(&self) -> usize {
		self.add_chain_calls.load(Ordering::SeqCst)
	}

	pub fn active_chain(&self) -> u64 {
		self.active_chain.load(Ordering::SeqCst)
	}

	pub fn account_streams_opened(&self) -> usize {
		self.account_streams.lock().unwrap().len()
	}

	/// Whether the `i`th opened account stream has lost its consumer.
	pub fn account_stream_closed(&self, i: usize) -> bool {
		self.account_streams.lock().unwrap()[i].is_closed()
	}
}

#[async_trait::async_trait]
impl WalletProvider for MockWalletProvider {
	async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
		Ok(self.accounts.lock().unwrap().clone())
	}

	async fn chain_id(&self) -> Result<u64, ProviderError> {
		Ok(self.active_chain.load(Ordering::SeqCst))
	}

	async fn switch_chain(&self, chain_id: u64) -> Result<(), SwitchChainError> {
		self.switch_calls.fetch_add(1, Ordering::SeqCst);
		if self.refuse_switches.load(Ordering::SeqCst) {
			return Err(SwitchChainError::Provider(ProviderError::Rpc(
				"switch refused".to_string(),
			)));
		}
		if !self.known_chains.lock().unwrap().contains(&chain_id) {
			return Err(SwitchChainError::UnknownChain(chain_id));
		}
		self.active_chain.store(chain_id, Ordering::SeqCst);
		Ok(())
	}

	async fn add_chain(&self, network: &NetworkIdentity) -> Result<(), ProviderError> {
		self.add_chain_calls.fetch_add(1, Ordering::SeqCst);
		self.known_chains.lock().unwrap().insert(network.chain_id);
		Ok(())
	}

	async fn account_changes(&self) -> Result<BoxStream<'static, Vec<String>>, ProviderError> {
		let (tx, rx) = mpsc::unbounded_channel();
		self.account_streams.lock().unwrap().push(tx);
		Ok(channel_stream(rx))
	}
}

enum SubmissionOutcome {
	Confirm,
	Revert(String),
}

/// In-memory guestbook contract with scriptable failures.
pub(crate) struct MockGuestbookContract {
	entries: Mutex<Vec<RawEntry>>,
	event_streams: Mutex<Vec<mpsc::UnboundedSender<AppendedEvent>>>,
	outcomes: Mutex<HashMap<TxHandle, SubmissionOutcome>>,
	next_handle: AtomicU64,
	clock: AtomicU64,
	count_calls: AtomicUsize,
	submit_calls: AtomicUsize,
	fail_reads: AtomicBool,
	hold_confirmations: AtomicBool,
	fail_next_submission: Mutex<Option<String>>,
	read_delay: Mutex<Option<Duration>>,
}

impl MockGuestbookContract {
	pub fn new() -> Self {
		Self {
			entries: Mutex::new(Vec::new()),
			event_streams: Mutex::new(Vec::new()),
			outcomes: Mutex::new(HashMap::new()),
			next_handle: AtomicU64::new(0),
			clock: AtomicU64::new(1_000),
			count_calls: AtomicUsize::new(0),
			submit_calls: AtomicUsize::new(0),
			fail_reads: AtomicBool::new(false),
			hold_confirmations: AtomicBool::new(false),
			fail_next_submission: Mutex::new(None),
			read_delay: Mutex::new(None),
		}
	}

	/// Append an entry as a concurrent external writer would, emitting the
	/// `MessageAdded` event to every open stream.
	pub fn push_external(&self, author: &str, content: &str, timestamp: u64) {
		let index = {
			let mut entries = self.entries.lock().unwrap();
			entries.push((author.to_string(), content.to_string(), timestamp));
			(entries.len() - 1) as u64
		};
		self.emit(index);
	}

	/// Re-emit the event for an existing index, modelling at-least-once
	/// redelivery.
	pub fn redeliver_event(&self, index: u64) {
		self.emit(index);
	}

	fn emit(&self, index: u64) {
		let (author, content, timestamp) = self.entries.lock().unwrap()[index as usize].clone();
		let event = AppendedEvent {
			author: Identity::new(author),
			index,
			content,
			timestamp,
		};
		self.event_streams
			.lock()
			.unwrap()
			.retain(|sender| sender.send(event.clone()).is_ok());
	}

	/// Make the next submission revert with the given reason instead of
	/// landing on chain.
	pub fn fail_next_submission(&self, reason: &str) {
		*self.fail_next_submission.lock().unwrap() = Some(reason.to_string());
	}

	/// Never resolve confirmations; pending transactions stay pending.
	pub fn hold_confirmations(&self) {
		self.hold_confirmations.store(true, Ordering::SeqCst);
	}

	/// Fail every read with an rpc error.
	pub fn fail_reads(&self) {
		self.fail_reads.store(true, Ordering::SeqCst);
	}

	/// Delay every read, so tests can interleave work with a slow reload.
	pub fn set_read_delay(&self, delay: Duration) {
		*self.read_delay.lock().unwrap() = Some(delay);
	}

	pub fn count_calls(&self) -> usize {
		self.count_calls.load(Ordering::SeqCst)
	}

	pub fn submit_calls(&self) -> usize {
		self.submit_calls.load(Ordering::SeqCst)
	}

	async fn read_gate(&self) -> Result<(), ContractError> {
		let delay = *self.read_delay.lock().unwrap();
		if let Some(delay) = delay {
			tokio::time::sleep(delay).await;
		}
		if self.fail_reads.load(Ordering::SeqCst) {
			return Err(ContractError::Rpc("read failure injected".to_string()));
		}
		Ok(())
	}
}

#[async_trait::async_trait]
impl GuestbookContract for MockGuestbookContract {
	async fn message_count(&self) -> Result<u64, ContractError> {
		self.count_calls.fetch_add(1, Ordering::SeqCst);
		self.read_gate().await?;
		Ok(self.entries.lock().unwrap().len() as u64)
	}

	async fn message_at(&self, index: u64) -> Result<RawEntry, ContractError> {
		self.read_gate().await?;
		let entries = self.entries.lock().unwrap();
		let count = entries.len() as u64;
		entries
			.get(index as usize)
			.cloned()
			.ok_or(ContractError::IndexOutOfRange { index, count })
	}

	async fn submit_message(&self, content: &str) -> Result<TxHandle, ContractError> {
		self.submit_calls.fetch_add(1, Ordering::SeqCst);
		let handle = TxHandle::new(format!(
			"0xtx{:04x}",
			self.next_handle.fetch_add(1, Ordering::SeqCst)
		));

		if let Some(reason) = self.fail_next_submission.lock().unwrap().take() {
			self.outcomes
				.lock()
				.unwrap()
				.insert(handle.clone(), SubmissionOutcome::Revert(reason));
			return Ok(handle);
		}

		let timestamp = self.clock.fetch_add(10, Ordering::SeqCst);
		let index = {
			let mut entries = self.entries.lock().unwrap();
			entries.push(("0xa11ce".to_string(), content.to_string(), timestamp));
			(entries.len() - 1) as u64
		};
		self.emit(index);
		self.outcomes
			.lock()
			.unwrap()
			.insert(handle.clone(), SubmissionOutcome::Confirm);
		Ok(handle)
	}

	async fn confirmation(&self, handle: &TxHandle) -> Result<(), ContractError> {
		if self.hold_confirmations.load(Ordering::SeqCst) {
			futures::future::pending::<()>().await;
		}
		let outcomes = self.outcomes.lock().unwrap();
		match outcomes.get(handle) {
			Some(SubmissionOutcome::Confirm) => Ok(()),
			Some(SubmissionOutcome::Revert(reason)) => Err(ContractError::Reverted(reason.clone())),
			None => Err(ContractError::Rpc(format!("unknown handle {}", handle))),
		}
	}

	async fn appended_events(&self) -> Result<BoxStream<'static, AppendedEvent>, ContractError> {
		let (tx, rx) = mpsc::unbounded_channel();
		self.event_streams.lock().unwrap().push(tx);
		Ok(channel_stream(rx))
	}
}
