//! Environment variable overrides.
//!
//! Recognised variables (shown with the default prefix):
//!
//! | Variable | Setting |
//! |----------|---------|
//! | `PAGE_LIFECYCLE_ORIGINATOR` | `originator` |
//! | `PAGE_LIFECYCLE_LOCATION_MATCH` | `location_match` (`exact` / `pathname`) |
//! | `PAGE_LIFECYCLE_SUPERSEDED` | `superseded` (`fail` / `silent`) |
//! | `PAGE_LIFECYCLE_TRACE_LISTENERS` | `trace_listeners` (boolean) |

use crate::error::{SettingsError, SettingsResult};
use crate::settings::LifecycleSettings;

/// Prefix used by [`LifecycleSettings::from_env`].
pub const DEFAULT_ENV_PREFIX: &str = "PAGE_LIFECYCLE";

/// Parses the usual spellings of a boolean flag.
pub fn parse_bool(value: &str) -> Result<bool, String> {
	match value.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" | "" => Ok(false),
		other => Err(format!("'{}' is not a boolean", other)),
	}
}

fn var_name(prefix: &str, key: &str) -> String {
	if prefix.is_empty() {
		key.to_string()
	} else {
		format!("{}_{}", prefix.trim_end_matches('_'), key)
	}
}

impl LifecycleSettings {
	/// Defaults overridden by `PAGE_LIFECYCLE_*` environment variables.
	pub fn from_env() -> SettingsResult<Self> {
		Self::default().apply_env(DEFAULT_ENV_PREFIX)
	}

	/// Overrides fields from the process environment using `prefix`.
	pub fn apply_env(self, prefix: &str) -> SettingsResult<Self> {
		self.apply_env_from(prefix, |name| std::env::var(name).ok())
	}

	/// Overrides fields from an arbitrary variable lookup.
	///
	/// `lookup` receives full variable names (prefix included) and returns
	/// `None` for unset variables.
	pub fn apply_env_from<F>(mut self, prefix: &str, lookup: F) -> SettingsResult<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		if let Some(originator) = lookup(&var_name(prefix, "ORIGINATOR")) {
			self.originator = originator;
		}

		if let Some(value) = lookup(&var_name(prefix, "LOCATION_MATCH")) {
			self.location_match = value.parse()?;
		}

		if let Some(value) = lookup(&var_name(prefix, "SUPERSEDED")) {
			self.superseded = value.parse()?;
		}

		let trace_key = var_name(prefix, "TRACE_LISTENERS");
		if let Some(value) = lookup(&trace_key) {
			self.trace_listeners =
				parse_bool(&value).map_err(|message| SettingsError::InvalidValue {
					key: trace_key.clone(),
					message,
				})?;
		}

		self.validate()?;
		Ok(self)
	}
}
