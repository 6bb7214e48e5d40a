//! Lifecycle events and derived page state.

use crate::location::Location;
use crate::metadata::Properties;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Payload key that always carries the active location.
pub const LOCATION_KEY: &str = "location";

/// Payload key that carries the failure description.
pub const ERROR_KEY: &str = "error";

/// Kind of lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageEventKind {
	/// A navigation started loading.
	#[serde(rename = "page-load-started")]
	Started,
	/// A navigation ended with a reported failure.
	#[serde(rename = "page-load-failed")]
	Failed,
	/// Every load of a navigation settled.
	#[serde(rename = "page-load-complete")]
	Complete,
}

impl PageEventKind {
	/// Wire name of the event type.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Started => "page-load-started",
			Self::Failed => "page-load-failed",
			Self::Complete => "page-load-complete",
		}
	}

	/// Whether this kind closes a navigation.
	pub fn is_terminal(&self) -> bool {
		matches!(self, Self::Failed | Self::Complete)
	}
}

impl fmt::Display for PageEventKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Merged metadata plus the location active at emission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
	/// Merged contributor metadata.
	#[serde(flatten)]
	pub properties: Properties,
	/// Location active when the event was emitted.
	pub location: Location,
	/// Failure description, only present on failed events.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

impl EventPayload {
	/// Builds a payload.
	///
	/// Contributed `location` and `error` keys are dropped; the engine's own
	/// values always win.
	pub fn new(mut properties: Properties, location: Location, error: Option<String>) -> Self {
		properties.remove(LOCATION_KEY);
		properties.remove(ERROR_KEY);
		Self {
			properties,
			location,
			error,
		}
	}

	/// Looks up a contributed property.
	pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
		self.properties.get(name)
	}
}

/// One record of the public event stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEvent {
	/// Event kind, serialised as `type`.
	#[serde(rename = "type")]
	pub kind: PageEventKind,
	/// Unix time in milliseconds.
	pub time_stamp: i64,
	/// Tag identifying the emitter.
	pub originator: String,
	/// Metadata and location.
	pub payload: EventPayload,
}

impl PageEvent {
	/// Pathname of the location the event refers to.
	pub fn pathname(&self) -> &str {
		&self.payload.location.pathname
	}

	/// Failure description, if any.
	pub fn error(&self) -> Option<&str> {
		self.payload.error.as_deref()
	}
}

/// Whether the current page has settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageState {
	/// A navigation is waiting for its terminal event, or none has started.
	#[default]
	Loading,
	/// The current navigation has emitted its terminal event.
	Loaded,
}

/// Read-only view exposed to contributors.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleState {
	/// Current page status.
	pub page_state: PageState,
	/// Latest location reported by the host.
	pub location: Option<Location>,
}
