//! Mounted metadata slots.

use crate::error::LifecycleResult;
use crate::lifecycle::PageLifecycle;
use crate::metadata::{MetadataKey, Properties};
use serde::Serialize;
use std::fmt;

/// A metadata slot owned by one contributor.
///
/// The slot is registered on creation and unregistered on drop. Dropping it
/// after the provider is gone is not an error.
#[must_use = "dropping PageProps unregisters the slot"]
pub struct PageProps {
	lifecycle: PageLifecycle,
	key: MetadataKey,
}

impl PageProps {
	pub(crate) fn mount(lifecycle: PageLifecycle, props: Properties) -> LifecycleResult<Self> {
		let key = MetadataKey::new();
		lifecycle.register_metadata(key, &props)?;
		Ok(Self { lifecycle, key })
	}

	/// Key of the underlying slot.
	pub fn key(&self) -> MetadataKey {
		self.key
	}

	/// Replaces the slot contents.
	pub fn set<T>(&self, props: &T) -> LifecycleResult<()>
	where
		T: Serialize + ?Sized,
	{
		self.lifecycle.update_metadata(self.key, props)?;
		Ok(())
	}
}

impl Drop for PageProps {
	fn drop(&mut self) {
		let _ = self.lifecycle.unregister_metadata(self.key);
	}
}

impl fmt::Debug for PageProps {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PageProps").field("key", &self.key).finish()
	}
}

#[cfg(test)]
mod tests {
	use crate::provider::PageLifecycleProvider;
	use crate::testing::RecordingSink;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_props_live_until_dropped() {
		let sink = RecordingSink::new();
		let provider = PageLifecycleProvider::new(sink.clone());
		let lifecycle = provider.handle();

		let props = lifecycle.page_props(&json!({ "section": "news" })).unwrap();
		provider.location_changed("/news");
		drop(props);
		provider.location_changed("/sport");

		let events = sink.events();
		assert_eq!(events[0].payload.get("section"), Some(&json!("news")));
		assert_eq!(events[2].payload.get("section"), None);
		assert_eq!(provider.snapshot().metadata_slots, 0);
	}

	#[rstest]
	fn test_set_replaces_contents() {
		let sink = RecordingSink::new();
		let provider = PageLifecycleProvider::new(sink.clone());
		let props = provider
			.handle()
			.page_props(&json!({ "title": "Loading…" }))
			.unwrap();

		props.set(&json!({ "title": "Ready" })).unwrap();
		provider.location_changed("/");

		assert_eq!(sink.events()[0].payload.get("title"), Some(&json!("Ready")));
	}

	#[rstest]
	fn test_drop_after_provider() {
		let provider = PageLifecycleProvider::new(crate::sink::NullSink);
		let props = provider.handle().page_props(&json!({})).unwrap();

		drop(provider);
		drop(props);
	}
}
