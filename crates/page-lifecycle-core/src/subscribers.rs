//! Subscriber arenas.
//!
//! Callbacks are stored under stable [`SubscriptionId`]s. Delivery iterates a
//! snapshot, so adding or removing subscribers from inside a callback never
//! shifts the iteration.

use indexmap::IndexMap;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Handle returned by a subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(usize);

impl SubscriptionId {
	/// Only [`SubscriberSet::insert`] mints ids.
	pub(crate) fn new() -> Self {
		static COUNTER: AtomicUsize = AtomicUsize::new(0);
		Self(COUNTER.fetch_add(1, Ordering::Relaxed))
	}
}

/// Shared callback receiving a reference to the notification.
pub type Callback<T> = Rc<dyn Fn(&T)>;

/// Ordered set of callbacks keyed by subscription id.
pub struct SubscriberSet<T> {
	slots: IndexMap<SubscriptionId, Callback<T>>,
}

impl<T> SubscriberSet<T> {
	/// Creates an empty set.
	pub fn new() -> Self {
		Self {
			slots: IndexMap::new(),
		}
	}

	/// Adds a callback and returns its id.
	pub fn insert(&mut self, callback: Callback<T>) -> SubscriptionId {
		let id = SubscriptionId::new();
		self.slots.insert(id, callback);
		id
	}

	/// Removes a callback. Unknown ids are ignored.
	pub fn remove(&mut self, id: SubscriptionId) -> bool {
		self.slots.shift_remove(&id).is_some()
	}

	/// Whether the id is still subscribed.
	pub fn contains(&self, id: SubscriptionId) -> bool {
		self.slots.contains_key(&id)
	}

	/// Copies the current callbacks in subscription order.
	pub fn snapshot(&self) -> Vec<(SubscriptionId, Callback<T>)> {
		self.slots
			.iter()
			.map(|(id, callback)| (*id, Rc::clone(callback)))
			.collect()
	}

	/// Number of subscribers.
	pub fn len(&self) -> usize {
		self.slots.len()
	}

	/// Whether nobody is subscribed.
	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}
}

impl<T> Default for SubscriberSet<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> fmt::Debug for SubscriberSet<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SubscriberSet")
			.field("ids", &self.slots.keys().collect::<Vec<_>>())
			.finish()
	}
}
