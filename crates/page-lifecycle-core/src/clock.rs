//! Event timestamps.

use chrono::Utc;

/// Source of event timestamps, in Unix milliseconds.
pub trait Clock {
	/// Current time in milliseconds since the Unix epoch.
	fn now_millis(&self) -> i64;
}

/// Wall clock backed by [`chrono::Utc`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now_millis(&self) -> i64 {
		Utc::now().timestamp_millis()
	}
}
