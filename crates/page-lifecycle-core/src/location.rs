//! Navigation locations.
//!
//! A [`Location`] is owned by the host's router; the engine only stores copies
//! and compares them.

use page_lifecycle_conf::LocationMatch;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the user currently is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
	/// Path component, e.g. `/users/42/`.
	pub pathname: String,
	/// Query string including the leading `?`, or empty.
	#[serde(default)]
	pub search: String,
	/// Fragment including the leading `#`, or empty.
	#[serde(default)]
	pub hash: String,
	/// Router-assigned history entry key.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub key: Option<String>,
}

impl Location {
	/// Creates a location for `pathname` with no query, hash or key.
	pub fn new(pathname: impl Into<String>) -> Self {
		Self {
			pathname: pathname.into(),
			..Self::default()
		}
	}

	/// Splits a URL path such as `/search?q=rust#top` into its parts.
	pub fn parse(url: &str) -> Self {
		let (rest, hash) = match url.find('#') {
			Some(index) => url.split_at(index),
			None => (url, ""),
		};
		let (pathname, search) = match rest.find('?') {
			Some(index) => rest.split_at(index),
			None => (rest, ""),
		};

		Self {
			pathname: if pathname.is_empty() {
				"/".to_string()
			} else {
				pathname.to_string()
			},
			search: search.to_string(),
			hash: hash.to_string(),
			key: None,
		}
	}

	/// Sets the query string.
	pub fn with_search(mut self, search: impl Into<String>) -> Self {
		self.search = search.into();
		self
	}

	/// Sets the fragment.
	pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
		self.hash = hash.into();
		self
	}

	/// Sets the history entry key.
	pub fn with_key(mut self, key: impl Into<String>) -> Self {
		self.key = Some(key.into());
		self
	}

	/// Compares two locations under the given policy.
	pub fn matches(&self, other: &Self, policy: LocationMatch) -> bool {
		match policy {
			LocationMatch::Exact => self == other,
			LocationMatch::Pathname => self.pathname == other.pathname,
		}
	}
}

impl fmt::Display for Location {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{}{}", self.pathname, self.search, self.hash)
	}
}

impl From<&str> for Location {
	fn from(url: &str) -> Self {
		Self::parse(url)
	}
}
