//! # switchyard-core
//!
//! Shared vocabulary for the Switchyard task router: tiers, capabilities,
//! model specs, routing tables, chat messages and the workspace error type.

pub mod error;
pub mod message;
pub mod model;
pub mod tables;
pub mod types;

pub use error::{Result, SwitchyardError};
pub use message::{ChatMessage, Role};
pub use model::{ModelSpec, infer_provider};
pub use tables::{Band, BaseScores, RoutingTables, TierBands};
pub use types::{Capability, ModelStatus, TaskType, Tier};
