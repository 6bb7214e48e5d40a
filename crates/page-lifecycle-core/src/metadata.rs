//! Metadata aggregation.
//!
//! Each mounted contributor owns one slot, identified by a [`MetadataKey`].
//! The registry keeps slots in first-registration order and merges their
//! current contents on demand; the merge is never cached.

use crate::error::{LifecycleError, LifecycleResult};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Opaque key-value bag contributed by a component.
pub type Properties = serde_json::Map<String, Value>;

/// Identity of one metadata slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MetadataKey(usize);

impl MetadataKey {
	/// Create a new unique MetadataKey
	pub fn new() -> Self {
		static COUNTER: AtomicUsize = AtomicUsize::new(0);
		Self(COUNTER.fetch_add(1, Ordering::Relaxed))
	}
}

impl Default for MetadataKey {
	fn default() -> Self {
		Self::new()
	}
}

/// Converts any serialisable value into [`Properties`].
///
/// `null` becomes an empty bag. Anything other than an object is rejected.
pub fn to_properties<T: Serialize + ?Sized>(value: &T) -> LifecycleResult<Properties> {
	match serde_json::to_value(value)? {
		Value::Object(map) => Ok(map),
		Value::Null => Ok(Properties::new()),
		other => Err(LifecycleError::InvalidMetadata(value_kind(&other).to_string())),
	}
}

fn value_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}

/// Currently mounted metadata slots.
#[derive(Debug, Clone, Default)]
pub struct MetadataRegistry {
	slots: IndexMap<MetadataKey, Properties>,
}

impl MetadataRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a slot.
	///
	/// Registering a key that is already present keeps its position and only
	/// replaces its contents. Returns `true` when the slot was newly added.
	pub fn register(&mut self, key: MetadataKey, props: Properties) -> bool {
		self.slots.insert(key, props).is_none()
	}

	/// Replaces the contents of a registered slot. Unknown keys are ignored.
	pub fn update(&mut self, key: MetadataKey, props: Properties) -> bool {
		match self.slots.get_mut(&key) {
			Some(slot) => {
				*slot = props;
				true
			}
			None => false,
		}
	}

	/// Removes a slot, preserving the order of the others.
	pub fn unregister(&mut self, key: MetadataKey) -> bool {
		self.slots.shift_remove(&key).is_some()
	}

	/// Folds every slot in registration order; later slots win on collisions.
	pub fn merge(&self) -> Properties {
		let mut merged = Properties::new();
		for props in self.slots.values() {
			for (name, value) in props {
				merged.insert(name.clone(), value.clone());
			}
		}
		merged
	}

	/// Whether the key is currently registered.
	pub fn contains(&self, key: MetadataKey) -> bool {
		self.slots.contains_key(&key)
	}

	/// Number of registered slots.
	pub fn len(&self) -> usize {
		self.slots.len()
	}

	/// Whether no slot is registered.
	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}
}
