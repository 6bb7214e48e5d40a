//! Settings error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Errors raised while loading or validating settings.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsError {
	/// The settings file could not be read.
	#[error("failed to read settings file {path}: {source}")]
	Io {
		/// Path that was being read.
		path: PathBuf,
		/// Underlying I/O error.
		#[source]
		source: std::io::Error,
	},

	/// The TOML document is malformed or has fields of the wrong type.
	#[error("failed to parse settings: {0}")]
	Parse(#[from] toml::de::Error),

	/// A value was syntactically valid but not acceptable.
	#[error("invalid value for '{key}': {message}")]
	InvalidValue {
		/// Setting or environment variable name.
		key: String,
		/// What was wrong with it.
		message: String,
	},
}

impl SettingsError {
	pub(crate) fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
		Self::InvalidValue {
			key: key.into(),
			message: message.into(),
		}
	}
}
