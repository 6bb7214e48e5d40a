//! Test helpers.
//!
//! Sinks and clocks that make the event stream easy to assert on.

use crate::clock::Clock;
use crate::event::{PageEvent, PageEventKind};
use crate::sink::EventSink;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Sink that records every event. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
	events: Rc<RefCell<Vec<PageEvent>>>,
}

impl RecordingSink {
	/// Creates an empty recorder.
	pub fn new() -> Self {
		Self::default()
	}

	/// Copies the recorded events.
	pub fn events(&self) -> Vec<PageEvent> {
		self.events.borrow().clone()
	}

	/// Kinds of the recorded events, in order.
	pub fn kinds(&self) -> Vec<PageEventKind> {
		self.events.borrow().iter().map(|event| event.kind).collect()
	}

	/// Removes and returns the recorded events.
	pub fn take(&self) -> Vec<PageEvent> {
		std::mem::take(&mut *self.events.borrow_mut())
	}

	/// Forgets the recorded events.
	pub fn clear(&self) {
		self.events.borrow_mut().clear();
	}

	/// Number of recorded events.
	pub fn len(&self) -> usize {
		self.events.borrow().len()
	}

	/// Whether nothing was recorded.
	pub fn is_empty(&self) -> bool {
		self.events.borrow().is_empty()
	}

	/// Number of recorded events of `kind`.
	pub fn count(&self, kind: PageEventKind) -> usize {
		self.events
			.borrow()
			.iter()
			.filter(|event| event.kind == kind)
			.count()
	}
}

impl EventSink for RecordingSink {
	fn on_event(&self, event: PageEvent) {
		self.events.borrow_mut().push(event);
	}
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
	now: Rc<Cell<i64>>,
}

impl ManualClock {
	/// Creates a clock frozen at `millis`.
	pub fn new(millis: i64) -> Self {
		Self {
			now: Rc::new(Cell::new(millis)),
		}
	}

	/// Sets the current time.
	pub fn set(&self, millis: i64) {
		self.now.set(millis);
	}

	/// Moves the clock forward.
	pub fn advance(&self, millis: i64) {
		self.now.set(self.now.get() + millis);
	}
}

impl Clock for ManualClock {
	fn now_millis(&self) -> i64 {
		self.now.get()
	}
}
