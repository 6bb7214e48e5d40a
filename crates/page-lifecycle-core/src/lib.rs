//! # Page Lifecycle Core
//!
//! Turns three independent input streams into one page load event stream:
//!
//! - navigations reported by the host router ([`PageLifecycleProvider::location_changed`])
//! - begin/end load signals from any number of contributors ([`PageLifecycle::begin_load`],
//!   [`PageLifecycle::end_load`], [`PageLifecycle::fail_load`])
//! - metadata fragments registered by mounted contributors ([`PageLifecycle::page_props`])
//!
//! Every navigation yields exactly one `page-load-started` event followed by
//! exactly one terminal event, `page-load-complete` or `page-load-failed`.
//! Completion fires when the outstanding load count reaches zero; a navigation
//! with nothing loading completes immediately.
//!
//! ## Architecture
//!
//! - [`route`]: detects navigations by comparing locations
//! - [`coordinator`]: counts in-flight loads and owns the settling flag
//! - [`metadata`]: ordered registry of contributor metadata
//! - [`provider`]: the emitter tying the three together
//! - [`lifecycle`], [`guard`], [`props`]: contributor-side handles
//! - [`context`]: thread-local lookup of the innermost provider
//!
//! ## Example
//!
//! ```
//! use page_lifecycle_core::{PageEventKind, PageLifecycleProvider, provide_lifecycle, use_page_lifecycle};
//! use page_lifecycle_core::testing::RecordingSink;
//! use serde_json::json;
//!
//! let sink = RecordingSink::new();
//! let provider = PageLifecycleProvider::new(sink.clone());
//! let _scope = provide_lifecycle(&provider);
//!
//! // Somewhere inside the page tree.
//! let lifecycle = use_page_lifecycle().unwrap();
//! let _props = lifecycle.page_props(&json!({ "page": "article" })).unwrap();
//! let load = lifecycle.load_guard().unwrap();
//!
//! provider.location_changed("/articles/42");
//! load.finish().unwrap();
//!
//! let events = sink.events();
//! assert_eq!(events[1].kind, PageEventKind::Complete);
//! assert_eq!(events[1].payload.get("page"), Some(&json!("article")));
//! ```

#![warn(missing_docs)]

pub mod clock;
pub mod context;
pub mod coordinator;
pub mod error;
pub mod event;
pub mod guard;
pub mod lifecycle;
pub mod location;
pub mod metadata;
pub mod props;
pub mod provider;
pub mod route;
pub mod sink;
pub mod subscribers;
pub mod testing;

pub use clock::{Clock, SystemClock};
pub use context::{
	ContextGuard, ensure_context, provide_lifecycle, try_use_page_lifecycle, use_page_lifecycle,
	with_page_lifecycle,
};
pub use coordinator::{ArmOutcome, EndOutcome, FailOutcome, LoadCoordinator};
pub use error::{LifecycleError, LifecycleResult};
pub use event::{EventPayload, LifecycleState, PageEvent, PageEventKind, PageState};
pub use guard::LoadGuard;
pub use lifecycle::PageLifecycle;
pub use location::Location;
pub use metadata::{MetadataKey, MetadataRegistry, Properties, to_properties};
pub use props::PageProps;
pub use provider::{LifecycleSnapshot, PageLifecycleProvider, PageLifecycleProviderBuilder};
pub use route::{RouteChange, RouteTracker};
pub use sink::{EventSink, NullSink};
pub use subscribers::{SubscriberSet, SubscriptionId};

pub use page_lifecycle_conf::{LifecycleSettings, LocationMatch, SupersededPolicy};
