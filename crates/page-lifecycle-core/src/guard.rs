//! Scoped loads.

use crate::error::LifecycleResult;
use crate::lifecycle::PageLifecycle;
use std::fmt;

/// A load that ends when the guard goes out of scope.
///
/// Use [`finish`](Self::finish) or [`fail`](Self::fail) to observe the
/// outcome; a plain drop ends the load and discards any error.
#[must_use = "dropping the guard ends the load immediately"]
pub struct LoadGuard {
	lifecycle: PageLifecycle,
	armed: bool,
}

impl LoadGuard {
	pub(crate) fn new(lifecycle: PageLifecycle) -> Self {
		Self {
			lifecycle,
			armed: true,
		}
	}

	/// Ends the load successfully.
	pub fn finish(mut self) -> LifecycleResult<()> {
		self.armed = false;
		self.lifecycle.end_load()
	}

	/// Ends the load with a failure.
	pub fn fail(mut self, error: impl fmt::Display) -> LifecycleResult<()> {
		self.armed = false;
		self.lifecycle.fail_load(error)
	}
}

impl Drop for LoadGuard {
	fn drop(&mut self) {
		if self.armed {
			let _ = self.lifecycle.end_load();
		}
	}
}

impl fmt::Debug for LoadGuard {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LoadGuard")
			.field("armed", &self.armed)
			.finish()
	}
}
