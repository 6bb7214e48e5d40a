//! Lifecycle emitter.
//!
//! [`PageLifecycleProvider`] owns the route tracker, the load coordinator and
//! the metadata registry of one page tree, and is the only producer of the
//! public event stream.
//!
//! # Delivery
//!
//! Every decision is taken while the engine state is borrowed, but nothing is
//! delivered from inside that borrow. Events and listener notifications are
//! pushed onto a FIFO outbox which the outermost call drains once the borrow is
//! released. A sink or listener that calls back into the lifecycle therefore
//! sees consistent state, and whatever it triggers is delivered after the
//! notification currently in flight.

use crate::clock::{Clock, SystemClock};
use crate::coordinator::{ArmOutcome, EndOutcome, FailOutcome, LoadCoordinator};
use crate::error::{LifecycleError, LifecycleResult};
use crate::event::{EventPayload, LifecycleState, PageEvent, PageEventKind, PageState};
use crate::lifecycle::PageLifecycle;
use crate::location::Location;
use crate::metadata::{MetadataKey, MetadataRegistry, Properties};
use crate::route::{RouteChange, RouteTracker};
use crate::sink::{EventSink, NullSink};
use crate::subscribers::{Callback, SubscriberSet, SubscriptionId};
use page_lifecycle_conf::{LifecycleSettings, SupersededPolicy};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// Point-in-time view of the engine, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleSnapshot {
	/// Loads currently in flight.
	pub outstanding: usize,
	/// Whether a navigation is waiting for its terminal event.
	pub settling: bool,
	/// Unmatched `end_load`/`fail_load` calls absorbed so far.
	pub imbalance_count: usize,
	/// Registered metadata slots.
	pub metadata_slots: usize,
	/// Current page status.
	pub page_state: PageState,
	/// Location active right now.
	pub location: Option<Location>,
}

#[derive(Debug)]
struct EngineState {
	tracker: RouteTracker,
	coordinator: LoadCoordinator,
	registry: MetadataRegistry,
	page_state: PageState,
	active: Option<Location>,
}

enum Delivery {
	Event(PageEvent),
	RouteChanged(Location),
	StateChanged(PageState),
}

/// Resets the delivering flag when a drain ends.
///
/// If a sink or listener panics, whatever is still queued belongs to the
/// interrupted call and is discarded instead of leaking into the next one.
struct DeliveryGuard<'a> {
	delivering: &'a Cell<bool>,
	outbox: &'a RefCell<VecDeque<Delivery>>,
}

impl Drop for DeliveryGuard<'_> {
	fn drop(&mut self) {
		if std::thread::panicking() {
			if let Ok(mut outbox) = self.outbox.try_borrow_mut() {
				outbox.clear();
			}
		}
		self.delivering.set(false);
	}
}

pub(crate) struct Shared {
	state: RefCell<EngineState>,
	outbox: RefCell<VecDeque<Delivery>>,
	delivering: Cell<bool>,
	sink: Rc<dyn EventSink>,
	clock: Rc<dyn Clock>,
	settings: LifecycleSettings,
	state_listeners: RefCell<SubscriberSet<PageState>>,
	route_listeners: RefCell<SubscriberSet<Location>>,
}

impl Shared {
	fn new(sink: Rc<dyn EventSink>, clock: Rc<dyn Clock>, settings: LifecycleSettings) -> Self {
		Self {
			state: RefCell::new(EngineState {
				tracker: RouteTracker::new(settings.location_match),
				coordinator: LoadCoordinator::new(),
				registry: MetadataRegistry::new(),
				page_state: PageState::Loading,
				active: None,
			}),
			outbox: RefCell::new(VecDeque::new()),
			delivering: Cell::new(false),
			sink,
			clock,
			settings,
			state_listeners: RefCell::new(SubscriberSet::new()),
			route_listeners: RefCell::new(SubscriberSet::new()),
		}
	}

	pub(crate) fn location_changed(&self, location: Location) {
		{
			let mut state = self.state.borrow_mut();
			state.active = Some(location.clone());

			match state.tracker.observe(location.clone()) {
				RouteChange::Unchanged => {
					tracing::trace!(path = %location.pathname, "Location unchanged");
					return;
				}
				RouteChange::Initial => {}
				RouteChange::Navigated { from } => {
					if state.coordinator.supersede() {
						self.close_superseded(&state, from, &location);
					}
				}
			}

			self.raise(&state, PageEventKind::Started, location.clone(), None);
			self.enqueue(Delivery::RouteChanged(location.clone()));
			self.set_page_state(&mut state, PageState::Loading);

			match state.coordinator.arm() {
				ArmOutcome::SettledImmediately => {
					self.settle(&mut state, PageEventKind::Complete, None);
				}
				ArmOutcome::Waiting { outstanding } => {
					tracing::debug!(
						path = %location.pathname,
						loading_data_count = outstanding,
						"Waiting for data loads"
					);
				}
			}
		}
		self.flush();
	}

	pub(crate) fn begin_load(&self) -> usize {
		let count = self.state.borrow_mut().coordinator.begin();
		tracing::debug!(loading_data_count = count, "Begin loading data");
		count
	}

	pub(crate) fn end_load(&self) -> LifecycleResult<()> {
		let result = {
			let mut state = self.state.borrow_mut();
			let outcome = state.coordinator.end();
			tracing::debug!(
				loading_data_count = state.coordinator.outstanding(),
				"End loading data"
			);

			match outcome {
				EndOutcome::Settled => {
					self.settle(&mut state, PageEventKind::Complete, None);
					Ok(())
				}
				EndOutcome::Pending { .. } => Ok(()),
				EndOutcome::Late => {
					tracing::debug!("Load ended after page settled, ignoring");
					Ok(())
				}
				EndOutcome::Unbalanced => {
					tracing::warn!(
						imbalance_count = state.coordinator.imbalance_count(),
						"end_load called without a matching begin_load"
					);
					Err(LifecycleError::UnbalancedEndLoad)
				}
			}
		};
		self.flush();
		result
	}

	pub(crate) fn fail_load(&self, error: String) -> LifecycleResult<()> {
		let result = {
			let mut state = self.state.borrow_mut();
			match state.coordinator.fail() {
				FailOutcome::Failed { outstanding } => {
					tracing::debug!(
						loading_data_count = outstanding,
						error = %error,
						"Load failed"
					);
					self.settle(&mut state, PageEventKind::Failed, Some(error));
					Ok(())
				}
				FailOutcome::Late => {
					tracing::warn!(error = %error, "Load failed after page settled, ignoring");
					Ok(())
				}
				FailOutcome::Unbalanced => {
					tracing::warn!(
						imbalance_count = state.coordinator.imbalance_count(),
						"fail_load called without a matching begin_load"
					);
					Err(LifecycleError::UnbalancedEndLoad)
				}
			}
		};
		self.flush();
		result
	}

	pub(crate) fn register_metadata(&self, key: MetadataKey, props: Properties) -> bool {
		self.state.borrow_mut().registry.register(key, props)
	}

	pub(crate) fn update_metadata(&self, key: MetadataKey, props: Properties) -> bool {
		self.state.borrow_mut().registry.update(key, props)
	}

	pub(crate) fn unregister_metadata(&self, key: MetadataKey) -> bool {
		self.state.borrow_mut().registry.unregister(key)
	}

	pub(crate) fn state(&self) -> LifecycleState {
		let state = self.state.borrow();
		LifecycleState {
			page_state: state.page_state,
			location: state.active.clone(),
		}
	}

	pub(crate) fn snapshot(&self) -> LifecycleSnapshot {
		let state = self.state.borrow();
		LifecycleSnapshot {
			outstanding: state.coordinator.outstanding(),
			settling: state.coordinator.is_settling(),
			imbalance_count: state.coordinator.imbalance_count(),
			metadata_slots: state.registry.len(),
			page_state: state.page_state,
			location: state.active.clone(),
		}
	}

	pub(crate) fn on_page_state_changed(&self, callback: Callback<PageState>) -> SubscriptionId {
		self.state_listeners.borrow_mut().insert(callback)
	}

	pub(crate) fn off_page_state_changed(&self, id: SubscriptionId) -> bool {
		self.state_listeners.borrow_mut().remove(id)
	}

	pub(crate) fn on_route_changed(&self, callback: Callback<Location>) -> SubscriptionId {
		self.route_listeners.borrow_mut().insert(callback)
	}

	pub(crate) fn off_route_changed(&self, id: SubscriptionId) -> bool {
		self.route_listeners.borrow_mut().remove(id)
	}

	fn close_superseded(&self, state: &EngineState, previous: Location, next: &Location) {
		match self.settings.superseded {
			SupersededPolicy::Fail => {
				let error = format!("navigation superseded by {}", next.pathname);
				tracing::warn!(
					old_path = %previous.pathname,
					new_path = %next.pathname,
					"Navigation superseded before it settled"
				);
				self.raise(state, PageEventKind::Failed, previous, Some(error));
			}
			SupersededPolicy::Silent => {
				tracing::warn!(
					old_path = %previous.pathname,
					new_path = %next.pathname,
					"Navigation superseded before it settled, dropping it"
				);
			}
		}
	}

	/// Emits the terminal event of the current navigation and marks it loaded.
	fn settle(&self, state: &mut EngineState, kind: PageEventKind, error: Option<String>) {
		let location = state.active.clone().unwrap_or_default();
		self.raise(state, kind, location, error);
		self.set_page_state(state, PageState::Loaded);
	}

	fn raise(
		&self,
		state: &EngineState,
		kind: PageEventKind,
		location: Location,
		error: Option<String>,
	) {
		let event = PageEvent {
			kind,
			time_stamp: self.clock.now_millis(),
			originator: self.settings.originator.clone(),
			payload: EventPayload::new(state.registry.merge(), location, error),
		};
		self.enqueue(Delivery::Event(event));
	}

	fn set_page_state(&self, state: &mut EngineState, page_state: PageState) {
		if state.page_state != page_state {
			state.page_state = page_state;
			self.enqueue(Delivery::StateChanged(page_state));
		}
	}

	fn enqueue(&self, delivery: Delivery) {
		self.outbox.borrow_mut().push_back(delivery);
	}

	/// Drains the outbox unless an outer call is already doing so.
	fn flush(&self) {
		if self.delivering.replace(true) {
			return;
		}
		let _guard = DeliveryGuard {
			delivering: &self.delivering,
			outbox: &self.outbox,
		};

		loop {
			let next = self.outbox.borrow_mut().pop_front();
			let Some(delivery) = next else {
				break;
			};

			match delivery {
				Delivery::Event(event) => {
					tracing::debug!(
						event_type = %event.kind,
						path = %event.pathname(),
						"Raising page event"
					);
					self.sink.on_event(event);
				}
				Delivery::RouteChanged(location) => {
					self.notify(&self.route_listeners, &location, "route");
				}
				Delivery::StateChanged(page_state) => {
					self.notify(&self.state_listeners, &page_state, "page_state");
				}
			}
		}
	}

	fn notify<T>(&self, listeners: &RefCell<SubscriberSet<T>>, value: &T, topic: &'static str) {
		let snapshot = listeners.borrow().snapshot();
		for (id, callback) in snapshot {
			// Removed by an earlier callback of this round.
			if !listeners.borrow().contains(id) {
				continue;
			}
			if self.settings.trace_listeners {
				tracing::trace!(topic, subscription = ?id, "Notifying listener");
			}
			callback(value);
		}
	}
}

/// Owner of one page tree's lifecycle.
///
/// The provider is single-threaded and not `Send`; contributors talk to it
/// through [`PageLifecycle`] handles obtained from [`handle`](Self::handle) or
/// from the context registry.
///
/// # Example
///
/// ```
/// use page_lifecycle_core::{Location, PageEventKind, PageLifecycleProvider};
/// use page_lifecycle_core::testing::RecordingSink;
///
/// let sink = RecordingSink::new();
/// let provider = PageLifecycleProvider::new(sink.clone());
/// let lifecycle = provider.handle();
///
/// lifecycle.begin_load().unwrap();
/// provider.location_changed(Location::new("/"));
/// assert_eq!(sink.kinds(), vec![PageEventKind::Started]);
///
/// lifecycle.end_load().unwrap();
/// assert_eq!(sink.kinds(), vec![PageEventKind::Started, PageEventKind::Complete]);
/// ```
pub struct PageLifecycleProvider {
	shared: Rc<Shared>,
}

impl PageLifecycleProvider {
	/// Creates a provider with default settings and the system clock.
	pub fn new(sink: impl EventSink + 'static) -> Self {
		Self::builder().sink(sink).build()
	}

	/// Creates a provider with explicit settings.
	pub fn with_settings(sink: impl EventSink + 'static, settings: LifecycleSettings) -> Self {
		Self::builder().sink(sink).settings(settings).build()
	}

	/// Starts a builder.
	pub fn builder() -> PageLifecycleProviderBuilder {
		PageLifecycleProviderBuilder::new()
	}

	/// Tells the engine where the user is now.
	///
	/// Must be called by the host on every navigation. The first call raises
	/// the initial page load; later calls raise a new navigation only when the
	/// location differs from the last acted-upon one.
	pub fn location_changed(&self, location: impl Into<Location>) {
		self.shared.location_changed(location.into());
	}

	/// Returns a contributor handle bound to this provider.
	pub fn handle(&self) -> PageLifecycle {
		PageLifecycle::new(Rc::downgrade(&self.shared))
	}

	/// Current page status and location.
	pub fn state(&self) -> LifecycleState {
		self.shared.state()
	}

	/// Diagnostic snapshot of counters and flags.
	pub fn snapshot(&self) -> LifecycleSnapshot {
		self.shared.snapshot()
	}

	/// Settings this provider was built with.
	pub fn settings(&self) -> &LifecycleSettings {
		&self.shared.settings
	}
}

impl fmt::Debug for PageLifecycleProvider {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PageLifecycleProvider")
			.field("settings", &self.shared.settings)
			.field("snapshot", &self.shared.snapshot())
			.finish()
	}
}

/// Builder for [`PageLifecycleProvider`].
pub struct PageLifecycleProviderBuilder {
	sink: Option<Rc<dyn EventSink>>,
	clock: Option<Rc<dyn Clock>>,
	settings: LifecycleSettings,
}

impl PageLifecycleProviderBuilder {
	/// Creates a builder with default settings, no sink and the system clock.
	pub fn new() -> Self {
		Self {
			sink: None,
			clock: None,
			settings: LifecycleSettings::default(),
		}
	}

	/// Sets the event sink. Without one, events are discarded.
	pub fn sink(mut self, sink: impl EventSink + 'static) -> Self {
		let sink: Rc<dyn EventSink> = Rc::new(sink);
		self.sink = Some(sink);
		self
	}

	/// Sets the timestamp source.
	pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
		let clock: Rc<dyn Clock> = Rc::new(clock);
		self.clock = Some(clock);
		self
	}

	/// Replaces the settings.
	pub fn settings(mut self, settings: LifecycleSettings) -> Self {
		self.settings = settings;
		self
	}

	/// Sets the originator tag.
	pub fn originator(mut self, originator: impl Into<String>) -> Self {
		self.settings.originator = originator.into();
		self
	}

	/// Builds the provider.
	pub fn build(self) -> PageLifecycleProvider {
		let sink: Rc<dyn EventSink> = match self.sink {
			Some(sink) => sink,
			None => Rc::new(NullSink),
		};
		let clock: Rc<dyn Clock> = match self.clock {
			Some(clock) => clock,
			None => Rc::new(SystemClock),
		};
		PageLifecycleProvider {
			shared: Rc::new(Shared::new(sink, clock, self.settings)),
		}
	}
}

impl Default for PageLifecycleProviderBuilder {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{ManualClock, RecordingSink};
	use rstest::{fixture, rstest};
	use serde_json::json;
	use tracing_test::traced_test;

	#[fixture]
	fn sink() -> RecordingSink {
		RecordingSink::new()
	}

	#[rstest]
	fn test_immediate_completion_on_first_location(sink: RecordingSink) {
		let provider = PageLifecycleProvider::new(sink.clone());

		provider.location_changed(Location::new("/"));

		let events = sink.events();
		assert_eq!(events.len(), 2);
		assert_eq!(events[0].kind, PageEventKind::Started);
		assert_eq!(events[1].kind, PageEventKind::Complete);
		assert!(events[1].payload.properties.is_empty());
		assert_eq!(events[1].pathname(), "/");
		assert_eq!(provider.state().page_state, PageState::Loaded);
	}

	#[rstest]
	fn test_events_carry_clock_and_originator(sink: RecordingSink) {
		let clock = ManualClock::new(1_000);
		let provider = PageLifecycleProvider::builder()
			.sink(sink.clone())
			.clock(clock.clone())
			.originator("Storefront")
			.build();
		let lifecycle = provider.handle();

		lifecycle.begin_load().unwrap();
		provider.location_changed("/products");
		clock.advance(250);
		lifecycle.end_load().unwrap();

		let events = sink.events();
		assert_eq!(events[0].time_stamp, 1_000);
		assert_eq!(events[1].time_stamp, 1_250);
		assert!(events.iter().all(|event| event.originator == "Storefront"));
	}

	#[rstest]
	fn test_superseded_navigation_fails_before_next_start(sink: RecordingSink) {
		let provider = PageLifecycleProvider::new(sink.clone());
		let lifecycle = provider.handle();
		lifecycle.begin_load().unwrap();
		provider.location_changed("/a");

		provider.location_changed("/b");

		let events = sink.take();
		assert_eq!(
			events.iter().map(|e| e.kind).collect::<Vec<_>>(),
			vec![
				PageEventKind::Started,
				PageEventKind::Failed,
				PageEventKind::Started
			]
		);
		assert_eq!(events[1].pathname(), "/a");
		assert_eq!(events[1].error(), Some("navigation superseded by /b"));
		assert_eq!(events[2].pathname(), "/b");

		lifecycle.end_load().unwrap();
		assert_eq!(sink.kinds(), vec![PageEventKind::Complete]);
		assert_eq!(sink.events()[0].pathname(), "/b");
	}

	#[rstest]
	fn test_silent_superseded_policy(sink: RecordingSink) {
		let settings = LifecycleSettings::default().with_superseded(SupersededPolicy::Silent);
		let provider = PageLifecycleProvider::with_settings(sink.clone(), settings);
		provider.handle().begin_load().unwrap();
		provider.location_changed("/a");

		provider.location_changed("/b");

		assert_eq!(
			sink.kinds(),
			vec![PageEventKind::Started, PageEventKind::Started]
		);
	}

	#[rstest]
	fn test_unchanged_location_emits_nothing(sink: RecordingSink) {
		let provider = PageLifecycleProvider::new(sink.clone());
		provider.location_changed("/");
		sink.clear();

		provider.location_changed("/");
		provider.location_changed("/");

		assert!(sink.is_empty());
	}

	#[rstest]
	fn test_pathname_policy_reports_latest_location(sink: RecordingSink) {
		let settings = LifecycleSettings::default()
			.with_location_match(page_lifecycle_conf::LocationMatch::Pathname);
		let provider = PageLifecycleProvider::with_settings(sink.clone(), settings);
		let lifecycle = provider.handle();
		lifecycle.begin_load().unwrap();
		provider.location_changed("/list?page=1");

		provider.location_changed("/list?page=2");
		lifecycle.end_load().unwrap();

		assert_eq!(
			sink.kinds(),
			vec![PageEventKind::Started, PageEventKind::Complete]
		);
		assert_eq!(sink.events()[1].payload.location.search, "?page=2");
	}

	#[rstest]
	fn test_metadata_merged_at_emission(sink: RecordingSink) {
		let provider = PageLifecycleProvider::new(sink.clone());
		let lifecycle = provider.handle();
		let key = MetadataKey::new();
		lifecycle
			.register_metadata(key, &json!({ "title": "Draft" }))
			.unwrap();
		lifecycle.begin_load().unwrap();
		provider.location_changed("/post");

		lifecycle
			.update_metadata(key, &json!({ "title": "Final" }))
			.unwrap();
		lifecycle.end_load().unwrap();

		let events = sink.events();
		assert_eq!(events[0].payload.get("title"), Some(&json!("Draft")));
		assert_eq!(events[1].payload.get("title"), Some(&json!("Final")));
	}

	#[rstest]
	fn test_panicking_sink_drops_rest_of_its_batch(sink: RecordingSink) {
		let recorder = sink.clone();
		let provider = PageLifecycleProvider::new(move |event: PageEvent| {
			if event.kind == PageEventKind::Started && event.pathname() == "/a" {
				panic!("sink failure");
			}
			recorder.on_event(event);
		});
		let lifecycle = provider.handle();

		let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
			provider.location_changed("/a");
		}));
		assert!(result.is_err());

		lifecycle.begin_load().unwrap();
		provider.location_changed("/b");
		assert_eq!(sink.kinds(), vec![PageEventKind::Started]);
		assert_eq!(sink.events()[0].pathname(), "/b");

		lifecycle.end_load().unwrap();
		assert_eq!(
			sink.kinds(),
			vec![PageEventKind::Started, PageEventKind::Complete]
		);
		assert_eq!(sink.events()[1].pathname(), "/b");
	}

	#[rstest]
	fn test_state_reports_latest_location_even_when_unchanged(sink: RecordingSink) {
		let settings = LifecycleSettings::default()
			.with_location_match(page_lifecycle_conf::LocationMatch::Pathname);
		let provider = PageLifecycleProvider::with_settings(sink.clone(), settings);
		provider.location_changed("/list?page=1");

		provider.location_changed("/list?page=2");

		assert_eq!(sink.count(PageEventKind::Started), 1);
		let location = provider.state().location.unwrap();
		assert_eq!(location.search, "?page=2");
	}

	#[rstest]
	fn test_snapshot_tracks_counters(sink: RecordingSink) {
		let provider = PageLifecycleProvider::new(sink);
		let lifecycle = provider.handle();
		lifecycle.begin_load().unwrap();
		lifecycle.begin_load().unwrap();
		provider.location_changed("/");
		let _ = lifecycle.end_load();

		let snapshot = provider.snapshot();

		assert_eq!(snapshot.outstanding, 1);
		assert!(snapshot.settling);
		assert_eq!(snapshot.imbalance_count, 0);
		assert_eq!(snapshot.page_state, PageState::Loading);
		assert_eq!(snapshot.location, Some(Location::new("/")));
	}

	#[test]
	#[traced_test]
	fn test_logs_load_counts_and_path_changes() {
		let provider = PageLifecycleProvider::new(NullSink);
		let lifecycle = provider.handle();
		provider.location_changed("/");
		lifecycle.begin_load().unwrap();
		provider.location_changed("/next");
		lifecycle.end_load().unwrap();

		assert!(logs_contain("Begin loading data"));
		assert!(logs_contain("loading_data_count=1"));
		assert!(logs_contain("Path changed"));
		assert!(logs_contain("Raising page event"));
	}

	#[test]
	#[traced_test]
	fn test_logs_each_listener_delivery_when_enabled() {
		let settings = LifecycleSettings::default().with_trace_listeners(true);
		let provider = PageLifecycleProvider::with_settings(NullSink, settings);
		provider
			.handle()
			.on_route_changed(|_: &Location| {})
			.unwrap();

		provider.location_changed("/");

		assert!(logs_contain("Notifying listener"));
		assert!(logs_contain("topic=\"route\""));
	}

	#[test]
	#[traced_test]
	fn test_listener_delivery_not_logged_by_default() {
		let provider = PageLifecycleProvider::new(NullSink);
		provider
			.handle()
			.on_route_changed(|_: &Location| {})
			.unwrap();

		provider.location_changed("/");

		assert!(logs_contain("Raising page event"));
		assert!(!logs_contain("Notifying listener"));
	}

	#[test]
	#[traced_test]
	fn test_logs_warning_on_unbalanced_end() {
		let provider = PageLifecycleProvider::new(NullSink);

		let result = provider.handle().end_load();

		assert!(matches!(result, Err(LifecycleError::UnbalancedEndLoad)));
		assert!(logs_contain("end_load called without a matching begin_load"));
	}
}
