//! Contributor handle.

use crate::error::{LifecycleError, LifecycleResult};
use crate::event::{LifecycleState, PageState};
use crate::guard::LoadGuard;
use crate::location::Location;
use crate::metadata::{MetadataKey, to_properties};
use crate::props::PageProps;
use crate::provider::Shared;
use crate::subscribers::SubscriptionId;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::rc::{Rc, Weak};

/// Handle through which contributors report loads and metadata.
///
/// Handles are cheap to clone and do not keep the provider alive. Once the
/// provider is dropped every operation fails with
/// [`LifecycleError::ProviderDropped`].
#[derive(Clone)]
pub struct PageLifecycle {
	shared: Weak<Shared>,
}

impl PageLifecycle {
	pub(crate) fn new(shared: Weak<Shared>) -> Self {
		Self { shared }
	}

	fn shared(&self) -> LifecycleResult<Rc<Shared>> {
		self.shared.upgrade().ok_or(LifecycleError::ProviderDropped)
	}

	/// Whether the provider is still alive.
	pub fn is_attached(&self) -> bool {
		self.shared.strong_count() > 0
	}

	/// Whether both handles point at the same provider.
	pub fn same_provider(&self, other: &Self) -> bool {
		Weak::ptr_eq(&self.shared, &other.shared)
	}

	/// Reports the start of a load.
	pub fn begin_load(&self) -> LifecycleResult<()> {
		self.shared()?.begin_load();
		Ok(())
	}

	/// Reports the successful end of a load.
	///
	/// Returns [`LifecycleError::UnbalancedEndLoad`] when no load is
	/// outstanding; the counter stays at zero.
	pub fn end_load(&self) -> LifecycleResult<()> {
		self.shared()?.end_load()
	}

	/// Reports a failed load. The current navigation, if still settling, ends
	/// with a failed event carrying `error`.
	pub fn fail_load(&self, error: impl fmt::Display) -> LifecycleResult<()> {
		self.shared()?.fail_load(error.to_string())
	}

	/// Begins a load that ends when the returned guard is dropped.
	pub fn load_guard(&self) -> LifecycleResult<LoadGuard> {
		self.begin_load()?;
		Ok(LoadGuard::new(self.clone()))
	}

	/// Counts `future` as a load.
	///
	/// The load ends when the future resolves to `Ok`, fails with the error's
	/// message on `Err`, and ends normally if the returned future is dropped
	/// before completion.
	pub async fn track<F, T, E>(&self, future: F) -> LifecycleResult<Result<T, E>>
	where
		F: Future<Output = Result<T, E>>,
		E: fmt::Display,
	{
		let guard = self.load_guard()?;
		let result = future.await;
		match &result {
			Ok(_) => guard.finish()?,
			Err(error) => guard.fail(error)?,
		}
		Ok(result)
	}

	/// Registers a metadata slot. Returns `false` if `key` was already
	/// registered, in which case only its contents are replaced.
	pub fn register_metadata<T>(&self, key: MetadataKey, props: &T) -> LifecycleResult<bool>
	where
		T: Serialize + ?Sized,
	{
		let props = to_properties(props)?;
		Ok(self.shared()?.register_metadata(key, props))
	}

	/// Replaces the contents of a slot. Unknown keys are ignored.
	///
	/// Updating metadata never completes a navigation on its own.
	pub fn update_metadata<T>(&self, key: MetadataKey, props: &T) -> LifecycleResult<bool>
	where
		T: Serialize + ?Sized,
	{
		let props = to_properties(props)?;
		Ok(self.shared()?.update_metadata(key, props))
	}

	/// Removes a slot. Unknown keys are ignored.
	pub fn unregister_metadata(&self, key: MetadataKey) -> LifecycleResult<bool> {
		Ok(self.shared()?.unregister_metadata(key))
	}

	/// Mounts a metadata slot that unregisters itself on drop.
	pub fn page_props<T>(&self, props: &T) -> LifecycleResult<PageProps>
	where
		T: Serialize + ?Sized,
	{
		PageProps::mount(self.clone(), to_properties(props)?)
	}

	/// Current page status and location.
	pub fn state(&self) -> LifecycleResult<LifecycleState> {
		Ok(self.shared()?.state())
	}

	/// Current page status.
	pub fn page_state(&self) -> LifecycleResult<PageState> {
		Ok(self.shared()?.state().page_state)
	}

	/// Location active right now, if the host reported one.
	pub fn location(&self) -> LifecycleResult<Option<Location>> {
		Ok(self.shared()?.state().location)
	}

	/// Subscribes to loading/loaded transitions.
	pub fn on_page_state_changed<F>(&self, callback: F) -> LifecycleResult<SubscriptionId>
	where
		F: Fn(&PageState) + 'static,
	{
		Ok(self.shared()?.on_page_state_changed(Rc::new(callback)))
	}

	/// Removes a page state subscription.
	pub fn off_page_state_changed(&self, id: SubscriptionId) -> LifecycleResult<bool> {
		Ok(self.shared()?.off_page_state_changed(id))
	}

	/// Subscribes to navigations, including the initial one.
	pub fn on_route_changed<F>(&self, callback: F) -> LifecycleResult<SubscriptionId>
	where
		F: Fn(&Location) + 'static,
	{
		Ok(self.shared()?.on_route_changed(Rc::new(callback)))
	}

	/// Removes a route subscription.
	pub fn off_route_changed(&self, id: SubscriptionId) -> LifecycleResult<bool> {
		Ok(self.shared()?.off_route_changed(id))
	}
}

impl fmt::Debug for PageLifecycle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PageLifecycle")
			.field("attached", &self.is_attached())
			.finish()
	}
}
