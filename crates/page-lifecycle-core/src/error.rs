//! Lifecycle error types.

use thiserror::Error;

/// Result type for lifecycle operations.
pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Errors reported to contributors.
///
/// Expected races (duplicate registration, completions arriving after the page
/// settled) are absorbed silently and never show up here.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LifecycleError {
	/// A contributor asked for the lifecycle outside of any provider scope.
	#[error(
		"page lifecycle provider context missing, ensure the page tree is rendered inside provide_lifecycle()"
	)]
	MissingContext,

	/// The provider behind a handle has been dropped.
	#[error("page lifecycle provider has been dropped")]
	ProviderDropped,

	/// `end_load` or `fail_load` was called with no outstanding `begin_load`.
	///
	/// The counter is clamped at zero, so later balanced pairs still count
	/// correctly.
	#[error("end of load reported without a matching begin_load")]
	UnbalancedEndLoad,

	/// Metadata did not serialise to a key-value object.
	#[error("page metadata must serialise to an object, got {0}")]
	InvalidMetadata(String),

	/// Metadata could not be serialised at all.
	#[error(transparent)]
	Serialization(#[from] serde_json::Error),
}

impl LifecycleError {
	/// Returns true for wiring mistakes that indicate the caller is not
	/// attached to a live provider.
	pub fn is_configuration_error(&self) -> bool {
		matches!(self, Self::MissingContext | Self::ProviderDropped)
	}
}
