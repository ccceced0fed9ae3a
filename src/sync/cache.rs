//! Index-keyed local cache of guestbook messages.
//!
//! The cache never holds two entries for one index, and merging an
//! authoritative snapshot is a union by index so entries learned through
//! notifications during a reload window are never regressed away.

use crate::ledger::Message;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub(crate) struct MessageCache {
	entries: BTreeMap<u64, Message>,
}

impl MessageCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert a message if its index is not yet present. Returns whether the
	/// cache changed; a duplicate delivery of an index already held is a no-op.
	pub fn insert(&mut self, message: Message) -> bool {
		match self.entries.entry(message.index) {
			std::collections::btree_map::Entry::Occupied(_) => false,
			std::collections::btree_map::Entry::Vacant(slot) => {
				slot.insert(message);
				true
			}
		}
	}

	/// Merge an authoritative reload snapshot: the snapshot wins for every
	/// index it covers, and entries outside it (notifications that arrived
	/// mid-reload) are retained. The cache never shrinks below the union.
	pub fn merge_snapshot(&mut self, snapshot: Vec<Message>) {
		for message in snapshot {
			self.entries.insert(message.index, message);
		}
	}

	pub fn contains(&self, index: u64) -> bool {
		self.entries.contains_key(&index)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn max_index(&self) -> Option<u64> {
		self.entries.keys().next_back().copied()
	}

	/// Snapshot of the cache in presentation order: timestamp descending, ties
	/// broken by index descending (later indices are never earlier in time
	/// under a single honest ledger).
	pub fn sorted_view(&self) -> Vec<Message> {
		let mut view: Vec<Message> = self.entries.values().cloned().collect();
		view.sort_by(|a, b| {
			b.timestamp
				.cmp(&a.timestamp)
				.then(b.index.cmp(&a.index))
		});
		view
	}
}
