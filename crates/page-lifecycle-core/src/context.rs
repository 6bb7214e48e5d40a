//! Context registry.
//!
//! Contributors deep in a page tree look the lifecycle up instead of having it
//! threaded through every call. Providers are pushed on a thread-local stack
//! for the duration of a scope; the innermost one wins.

use crate::error::{LifecycleError, LifecycleResult};
use crate::lifecycle::PageLifecycle;
use crate::provider::PageLifecycleProvider;
use std::cell::RefCell;
use std::marker::PhantomData;

thread_local! {
	static LIFECYCLE_STACK: RefCell<Vec<PageLifecycle>> = const { RefCell::new(Vec::new()) };
}

/// Keeps a provider in scope. Dropping it removes the provider again.
#[must_use = "the provider is only in scope while the guard is alive"]
#[derive(Debug)]
pub struct ContextGuard {
	depth: usize,
	// Tied to the thread whose stack it pushed onto.
	_not_send: PhantomData<*const ()>,
}

impl Drop for ContextGuard {
	fn drop(&mut self) {
		LIFECYCLE_STACK.with(|stack| {
			stack.borrow_mut().truncate(self.depth);
		});
	}
}

/// Makes `provider` the lifecycle returned by [`use_page_lifecycle`] until the
/// guard is dropped.
pub fn provide_lifecycle(provider: &PageLifecycleProvider) -> ContextGuard {
	let depth = LIFECYCLE_STACK.with(|stack| {
		let mut stack = stack.borrow_mut();
		let depth = stack.len();
		stack.push(provider.handle());
		depth
	});
	ContextGuard {
		depth,
		_not_send: PhantomData,
	}
}

/// Returns the innermost provided lifecycle.
///
/// # Errors
///
/// [`LifecycleError::MissingContext`] when called outside every
/// [`provide_lifecycle`] scope.
pub fn use_page_lifecycle() -> LifecycleResult<PageLifecycle> {
	ensure_context(try_use_page_lifecycle())
}

/// Returns the innermost provided lifecycle, if any.
pub fn try_use_page_lifecycle() -> Option<PageLifecycle> {
	LIFECYCLE_STACK.with(|stack| stack.borrow().last().cloned())
}

/// Turns an optional handle into a [`LifecycleError::MissingContext`] error.
pub fn ensure_context(lifecycle: Option<PageLifecycle>) -> LifecycleResult<PageLifecycle> {
	lifecycle.ok_or(LifecycleError::MissingContext)
}

/// Runs `f` with the innermost provided lifecycle.
pub fn with_page_lifecycle<R>(f: impl FnOnce(&PageLifecycle) -> R) -> LifecycleResult<R> {
	let lifecycle = use_page_lifecycle()?;
	Ok(f(&lifecycle))
}
