//! # switchyard-config
//!
//! Configuration system for Switchyard. Reads `switchyard.toml`, then applies
//! environment variable overrides, then validates.

pub mod loader;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{
    CatalogConfig, ConfigWarning, LoggingConfig, RouterConfig, SwitchyardConfig, WarningSeverity,
    data_dir,
};
