//! # switchyard-llm
//!
//! Model catalog, task router and the delegation glue that sends routed
//! prompts through a chat gateway and feeds outcomes back to the router.

pub mod catalog;
pub mod delegate;
pub mod gateway;
pub mod mock;
pub mod router;

pub use catalog::{ModelCatalog, ModelRegistry};
pub use delegate::{CallRequest, CodeRequest, Delegation, Delegator};
pub use gateway::{ChatGateway, ChatOptions, ChatResponse, Usage};
pub use mock::MockGateway;
pub use router::outcomes::{ModelStats, Outcome, OutcomeRecord, OutcomeStore};
pub use router::{RouteResult, Router, RouterOptions, task_signature};

/// Current time as fractional unix seconds.
pub(crate) fn unix_now() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
