//! # Page Lifecycle Settings
//!
//! Configuration for the page lifecycle engine.
//!
//! Settings are plain serde structs with defaults for every field, so an empty
//! TOML document (or no file at all) yields a working configuration. Values can
//! be layered in the usual order:
//!
//! 1. [`LifecycleSettings::default()`]
//! 2. A TOML file or string ([`LifecycleSettings::from_toml_file`],
//!    [`LifecycleSettings::from_toml_str`])
//! 3. Environment overrides ([`LifecycleSettings::apply_env`])
//!
//! ## Example
//!
//! ```
//! use page_lifecycle_conf::{LifecycleSettings, LocationMatch};
//!
//! let settings = LifecycleSettings::from_toml_str(
//!     r#"
//!     originator = "Storefront"
//!     location_match = "pathname"
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(settings.originator, "Storefront");
//! assert_eq!(settings.location_match, LocationMatch::Pathname);
//! ```

#![warn(missing_docs)]

pub mod env;
pub mod error;
pub mod settings;

pub use env::{DEFAULT_ENV_PREFIX, parse_bool};
pub use error::{SettingsError, SettingsResult};
pub use settings::{DEFAULT_ORIGINATOR, LifecycleSettings, LocationMatch, SupersededPolicy};
