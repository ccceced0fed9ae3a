//! Append-notification listener.
//!
//! Subscribes to the contract's `MessageAdded` stream and forwards fresh
//! events to a callback. The underlying channel may redeliver, so the listener
//! tracks the highest index it has forwarded within a subscription and skips
//! anything at or below it; indices are assigned monotonically on chain, so a
//! single high-water mark suffices. The sync coordinator still de-duplicates
//! by index, since a reload can race a notification. Appends from before the
//! subscription began are only visible through a full reload.

use crate::ledger::{AppendedEvent, ContractError, GuestbookContract};
use crate::subscription::Subscription;
use futures_util::StreamExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

pub struct NotificationListener {
	contract: Arc<dyn GuestbookContract>,
}

impl NotificationListener {
	pub fn new(contract: Arc<dyn GuestbookContract>) -> Self {
		Self { contract }
	}

	/// Subscribe to append notifications. The callback runs on a forwarding
	/// task until the returned [`Subscription`] is cancelled; cancellation is
	/// idempotent and no callback fires afterwards.
	pub async fn subscribe<F>(&self, on_append: F) -> Result<Subscription, ContractError>
	where
		F: FnMut(AppendedEvent) + Send + 'static,
	{
		let mut stream = self.contract.appended_events().await?;
		let cancelled = Arc::new(AtomicBool::new(false));
		let flag = cancelled.clone();
		let mut on_append = on_append;

		let task = tokio::spawn(async move {
			let mut forwarded: Option<u64> = None;
			while let Some(event) = stream.next().await {
				if flag.load(Ordering::SeqCst) {
					break;
				}
				if forwarded.is_some_and(|high| event.index <= high) {
					debug!(index = event.index, "skipping redelivered append event");
					continue;
				}
				forwarded = Some(event.index);
				debug!(index = event.index, "forwarding append event");
				on_append(event);
			}
		});

		Ok(Subscription::new(cancelled, task))
	}
}
