//! Route tracking.
//!
//! Detects navigations by comparing each observed location with the last one
//! that was acted upon.

use crate::location::Location;
use page_lifecycle_conf::LocationMatch;

/// Result of observing a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteChange {
	/// First location ever observed. This is the initial page load, not a
	/// navigation.
	Initial,
	/// Same location as the current baseline.
	Unchanged,
	/// A different location; the baseline moved away from `from`.
	Navigated {
		/// The location that was current before this navigation.
		from: Location,
	},
}

/// Compares incoming locations against the last acted-upon one.
#[derive(Debug, Clone)]
pub struct RouteTracker {
	policy: LocationMatch,
	current: Option<Location>,
}

impl RouteTracker {
	/// Creates a tracker that has not observed anything yet.
	pub fn new(policy: LocationMatch) -> Self {
		Self {
			policy,
			current: None,
		}
	}

	/// Feeds the host's current location.
	///
	/// `Unchanged` observations leave the baseline alone, so a sequence of
	/// equal locations never produces a transition.
	pub fn observe(&mut self, location: Location) -> RouteChange {
		match self.current.take() {
			None => {
				self.current = Some(location);
				RouteChange::Initial
			}
			Some(previous) if previous.matches(&location, self.policy) => {
				self.current = Some(previous);
				RouteChange::Unchanged
			}
			Some(previous) => {
				tracing::debug!(
					old_path = %previous.pathname,
					new_path = %location.pathname,
					"Path changed"
				);
				self.current = Some(location);
				RouteChange::Navigated { from: previous }
			}
		}
	}

	/// The baseline location, if any has been observed.
	pub fn current(&self) -> Option<&Location> {
		self.current.as_ref()
	}

	/// The comparison policy in use.
	pub fn policy(&self) -> LocationMatch {
		self.policy
	}
}
