//! # Page Lifecycle
//!
//! Exactly-once page load events for client applications that render one page
//! at a time.
//!
//! Analytics and performance pipelines need to know when a page started
//! loading and when it finished, where "finished" means every data fetch
//! started by any component of the page has settled. This crate aggregates
//! navigations, per-component load signals and per-component metadata into a
//! stream of `page-load-started`, `page-load-complete` and `page-load-failed`
//! events, one start and one terminal event per navigation.
//!
//! ## Feature Flags
//!
//! - `conf` (default) - Settings types, TOML and environment loaders
//! - `testing` - Recording sink and manual clock for downstream tests
//!
//! ## Quick Example
//!
//! ```rust
//! use page_lifecycle::prelude::*;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let recorder = Rc::clone(&seen);
//! let provider = PageLifecycleProvider::new(move |event: PageEvent| {
//!     recorder.borrow_mut().push(event.kind);
//! });
//! let _scope = provide_lifecycle(&provider);
//!
//! // A component somewhere in the page tree.
//! let lifecycle = use_page_lifecycle().unwrap();
//! lifecycle.begin_load().unwrap();
//!
//! // The router reports the navigation.
//! provider.location_changed(Location::new("/dashboard"));
//! assert_eq!(*seen.borrow(), vec![PageEventKind::Started]);
//!
//! // The component's fetch settles.
//! lifecycle.end_load().unwrap();
//! assert_eq!(
//!     *seen.borrow(),
//!     vec![PageEventKind::Started, PageEventKind::Complete]
//! );
//! ```

#[cfg(feature = "conf")]
pub mod conf;

pub use page_lifecycle_core::{
	Clock, ContextGuard, EventPayload, EventSink, LifecycleError, LifecycleResult,
	LifecycleSnapshot, LifecycleState, LoadGuard, Location, MetadataKey, NullSink, PageEvent,
	PageEventKind, PageLifecycle, PageLifecycleProvider, PageLifecycleProviderBuilder, PageProps,
	PageState, Properties, SubscriptionId, SystemClock, ensure_context, provide_lifecycle,
	try_use_page_lifecycle, use_page_lifecycle, with_page_lifecycle,
};

// Building blocks for hosts that drive the engine themselves
pub use page_lifecycle_core::{
	ArmOutcome, EndOutcome, FailOutcome, LoadCoordinator, MetadataRegistry, RouteChange,
	RouteTracker,
};

// Re-export settings from dedicated crate
#[cfg(feature = "conf")]
pub use page_lifecycle_conf::{
	LifecycleSettings, LocationMatch, SettingsError, SettingsResult, SupersededPolicy,
};

/// Test helpers.
#[cfg(feature = "testing")]
pub mod testing {
	pub use page_lifecycle_core::testing::*;
}

/// Prelude module for convenient imports
pub mod prelude {
	pub use crate::{
		EventSink, LifecycleError, LifecycleResult, LoadGuard, Location, MetadataKey, PageEvent,
		PageEventKind, PageLifecycle, PageLifecycleProvider, PageProps, PageState,
		provide_lifecycle, use_page_lifecycle,
	};

	#[cfg(feature = "conf")]
	pub use crate::{LifecycleSettings, LocationMatch, SupersededPolicy};
}
