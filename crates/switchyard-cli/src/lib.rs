//! # switchyard-cli
//!
//! Command-line interface for the Switchyard task router.
//!
//! ## Commands
//!
//! - `switchyard route` - Score a task and show the chosen model
//! - `switchyard record` - Record how a routed task went
//! - `switchyard stats` - Per-model success rate and latency
//! - `switchyard models` - List the model catalog
//! - `switchyard config` - Show configuration
//! - `switchyard doctor` - Audit configuration and routing state

pub mod commands;

pub use commands::Cli;
