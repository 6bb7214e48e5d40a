//! Settings types and TOML loading.

use crate::error::{SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Originator tag stamped on events when none is configured.
pub const DEFAULT_ORIGINATOR: &str = "PageEvents";

/// How two locations are compared when deciding whether a navigation happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationMatch {
	/// Every field, including the router's history key, must be equal.
	///
	/// Pushing the same path twice produces two navigations because each
	/// history entry carries a fresh key.
	#[default]
	Exact,
	/// Only the pathname is compared; query string, hash and key are ignored.
	Pathname,
}

impl fmt::Display for LocationMatch {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Exact => write!(f, "exact"),
			Self::Pathname => write!(f, "pathname"),
		}
	}
}

impl FromStr for LocationMatch {
	type Err = SettingsError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"exact" => Ok(Self::Exact),
			"pathname" | "path" => Ok(Self::Pathname),
			other => Err(SettingsError::invalid(
				"location_match",
				format!("expected 'exact' or 'pathname', got '{}'", other),
			)),
		}
	}
}

/// What happens to a navigation that is still settling when the next one starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupersededPolicy {
	/// Close the superseded navigation with a `page-load-failed` event.
	#[default]
	Fail,
	/// Drop the superseded navigation without a terminal event.
	Silent,
}

impl fmt::Display for SupersededPolicy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Fail => write!(f, "fail"),
			Self::Silent => write!(f, "silent"),
		}
	}
}

impl FromStr for SupersededPolicy {
	type Err = SettingsError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"fail" | "failed" => Ok(Self::Fail),
			"silent" => Ok(Self::Silent),
			other => Err(SettingsError::invalid(
				"superseded",
				format!("expected 'fail' or 'silent', got '{}'", other),
			)),
		}
	}
}

/// Settings for one lifecycle provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LifecycleSettings {
	/// Originator tag stamped on every emitted event.
	pub originator: String,
	/// Location comparison used by the route tracker.
	pub location_match: LocationMatch,
	/// Handling of navigations interrupted by a newer one.
	pub superseded: SupersededPolicy,
	/// Log every listener delivery at `trace` level.
	pub trace_listeners: bool,
}

impl Default for LifecycleSettings {
	fn default() -> Self {
		Self {
			originator: DEFAULT_ORIGINATOR.to_string(),
			location_match: LocationMatch::default(),
			superseded: SupersededPolicy::default(),
			trace_listeners: false,
		}
	}
}

impl LifecycleSettings {
	/// Parses settings from a TOML document. Missing keys keep their defaults.
	pub fn from_toml_str(source: &str) -> SettingsResult<Self> {
		let settings: Self = toml::from_str(source)?;
		settings.validate()?;
		Ok(settings)
	}

	/// Reads and parses a TOML settings file.
	pub fn from_toml_file(path: impl AsRef<Path>) -> SettingsResult<Self> {
		let path = path.as_ref();
		let source = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_toml_str(&source)
	}

	/// Sets the originator tag.
	pub fn with_originator(mut self, originator: impl Into<String>) -> Self {
		self.originator = originator.into();
		self
	}

	/// Sets the location comparison.
	pub fn with_location_match(mut self, location_match: LocationMatch) -> Self {
		self.location_match = location_match;
		self
	}

	/// Sets the superseded-navigation policy.
	pub fn with_superseded(mut self, superseded: SupersededPolicy) -> Self {
		self.superseded = superseded;
		self
	}

	/// Enables or disables listener trace logging.
	pub fn with_trace_listeners(mut self, enabled: bool) -> Self {
		self.trace_listeners = enabled;
		self
	}

	/// Checks invariants that serde cannot express.
	pub fn validate(&self) -> SettingsResult<()> {
		if self.originator.trim().is_empty() {
			return Err(SettingsError::invalid(
				"originator",
				"originator must not be empty",
			));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_defaults() {
		let settings = LifecycleSettings::default();
		assert_eq!(settings.originator, "PageEvents");
		assert_eq!(settings.location_match, LocationMatch::Exact);
		assert_eq!(settings.superseded, SupersededPolicy::Fail);
		assert!(!settings.trace_listeners);
	}

	#[rstest]
	fn test_empty_document_yields_defaults() {
		let settings = LifecycleSettings::from_toml_str("").unwrap();
		assert_eq!(settings, LifecycleSettings::default());
	}

	#[rstest]
	fn test_full_document() {
		let settings = LifecycleSettings::from_toml_str(
			r#"
originator = "Checkout"
location_match = "pathname"
superseded = "silent"
trace_listeners = true
"#,
		)
		.unwrap();

		assert_eq!(settings.originator, "Checkout");
		assert_eq!(settings.location_match, LocationMatch::Pathname);
		assert_eq!(settings.superseded, SupersededPolicy::Silent);
		assert!(settings.trace_listeners);
	}

	#[rstest]
	fn test_unknown_field_rejected() {
		let result = LifecycleSettings::from_toml_str("unknown = 1");
		assert!(matches!(result, Err(SettingsError::Parse(_))));
	}

	#[rstest]
	fn test_blank_originator_rejected() {
		let result = LifecycleSettings::from_toml_str("originator = \"  \"");
		assert!(matches!(
			result,
			Err(SettingsError::InvalidValue { ref key, .. }) if key == "originator"
		));
	}

	#[rstest]
	#[case("exact", LocationMatch::Exact)]
	#[case("Pathname", LocationMatch::Pathname)]
	#[case(" path ", LocationMatch::Pathname)]
	fn test_location_match_from_str(#[case] input: &str, #[case] expected: LocationMatch) {
		assert_eq!(input.parse::<LocationMatch>().unwrap(), expected);
	}

	#[rstest]
	fn test_location_match_from_str_invalid() {
		assert!("hash".parse::<LocationMatch>().is_err());
	}

	#[rstest]
	#[case("fail", SupersededPolicy::Fail)]
	#[case("FAILED", SupersededPolicy::Fail)]
	#[case("silent", SupersededPolicy::Silent)]
	fn test_superseded_from_str(#[case] input: &str, #[case] expected: SupersededPolicy) {
		assert_eq!(input.parse::<SupersededPolicy>().unwrap(), expected);
	}

	#[rstest]
	fn test_builder_methods() {
		let settings = LifecycleSettings::default()
			.with_originator("Search")
			.with_location_match(LocationMatch::Pathname)
			.with_superseded(SupersededPolicy::Silent)
			.with_trace_listeners(true);

		assert_eq!(settings.originator, "Search");
		assert_eq!(settings.location_match, LocationMatch::Pathname);
		assert_eq!(settings.superseded, SupersededPolicy::Silent);
		assert!(settings.trace_listeners);
	}
}
