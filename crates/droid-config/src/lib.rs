//! # droid-config
//!
//! Configuration system for droid. Reads from `droid.toml` (or a YAML `config.yaml`), environment
//! variables, and CLI overrides — in that precedence order.

pub mod schema;
pub mod loader;

pub use schema::DroidConfig;
pub use schema::{ConfigWarning, Transport, WarningSeverity};
pub use loader::{ConfigFormat, ConfigLoader, ConfigSource};
