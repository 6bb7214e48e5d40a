//! Lifecycle settings
//!
//! This module provides access to page-lifecycle-conf: the settings struct,
//! its TOML loaders and the environment overrides.
//!
//! ## Example
//!
//! ```rust
//! use page_lifecycle::conf::{LifecycleSettings, SupersededPolicy};
//!
//! let settings = LifecycleSettings::from_toml_str("superseded = \"silent\"").unwrap();
//! assert_eq!(settings.superseded, SupersededPolicy::Silent);
//! ```

pub use page_lifecycle_conf::*;
