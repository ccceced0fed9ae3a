//! Cancellable handle for background event-forwarding tasks.
//!
//! Both the connection manager (account-change watching) and the notification
//! listener (append events) hand out a [`Subscription`] instead of registering
//! callbacks in any ambient global registry. Cancellation is idempotent and no
//! callback runs after `cancel` returns.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;
use tracing::debug;

/// Handle to a background subscription task.
///
/// Dropping the handle does not cancel the task; teardown is explicit via
/// [`Subscription::cancel`], which the owning component calls before replacing
/// a subscription so re-registration never accumulates duplicate listeners.
#[derive(Debug)]
pub struct Subscription {
	cancelled: Arc<AtomicBool>,
	task: JoinHandle<()>,
}

impl Subscription {
	pub(crate) fn new(cancelled: Arc<AtomicBool>, task: JoinHandle<()>) -> Self {
		Self { cancelled, task }
	}

	/// Cancel the subscription. Idempotent; after the first call returns, the
	/// forwarding task is aborted and will never invoke its callback again.
	pub fn cancel(&self) {
		if !self.cancelled.swap(true, Ordering::SeqCst) {
			debug!("cancelling subscription");
			self.task.abort();
		}
	}

	/// Whether `cancel` has been called at least once.
	pub fn is_cancelled(&self) -> bool {
		self.cancelled.load(Ordering::SeqCst)
	}
}
