//! Event sinks.

use crate::event::PageEvent;

/// Receives the public event stream.
///
/// Sinks are called outside of any internal borrow, so a sink may call back
/// into the lifecycle. Events it causes are queued behind the one being
/// delivered. Sinks must not block.
pub trait EventSink {
	/// Handles one event.
	fn on_event(&self, event: PageEvent);
}

impl<F> EventSink for F
where
	F: Fn(PageEvent),
{
	fn on_event(&self, event: PageEvent) {
		self(event)
	}
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
	fn on_event(&self, _event: PageEvent) {}
}
