use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::{Capability, ModelStatus, Tier};

/// Specification for a single routable model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Full identifier, e.g. "openrouter/qwen/qwen3-coder".
    pub id: String,
    /// Provider the gateway dispatches to. Inferred from `id` when left empty.
    #[serde(default)]
    pub provider: String,
    #[serde(default = "default_tier")]
    pub tier: Tier,
    #[serde(default = "default_context_window")]
    pub context_window: u64,
    /// USD per 1M input tokens.
    #[serde(default)]
    pub cost_per_1m_input: f64,
    /// USD per 1M output tokens.
    #[serde(default)]
    pub cost_per_1m_output: f64,
    /// Static ranking weight within a tier (0-100).
    #[serde(default = "default_priority")]
    pub priority: u32,
    /// Relative speed (1 = slow, 5 = fast).
    #[serde(default = "default_speed")]
    pub speed: u32,
    #[serde(default = "default_capabilities")]
    pub capabilities: BTreeSet<Capability>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default)]
    pub status: ModelStatus,
    #[serde(default)]
    pub added_at: String,
    /// Where this entry came from ("default", "cache", "config").
    #[serde(default = "default_source")]
    pub source: String,
}

fn default_tier() -> Tier {
    Tier::Standard
}

fn default_context_window() -> u64 {
    128_000
}

fn default_priority() -> u32 {
    50
}

fn default_speed() -> u32 {
    3
}

fn default_capabilities() -> BTreeSet<Capability> {
    BTreeSet::from([Capability::Chat])
}

fn default_max_output_tokens() -> u32 {
    8192
}

fn default_source() -> String {
    "config".into()
}

impl ModelSpec {
    /// Create a spec with default attributes; adjust with the `with_*` builders.
    pub fn new(id: impl Into<String>, provider: impl Into<String>, tier: Tier) -> Self {
        Self {
            id: id.into(),
            provider: provider.into(),
            tier,
            context_window: default_context_window(),
            cost_per_1m_input: 0.0,
            cost_per_1m_output: 0.0,
            priority: default_priority(),
            speed: default_speed(),
            capabilities: default_capabilities(),
            aliases: vec![],
            max_output_tokens: default_max_output_tokens(),
            status: ModelStatus::Active,
            added_at: String::new(),
            source: "default".into(),
        }
    }

    pub fn with_cost(mut self, input: f64, output: f64) -> Self {
        self.cost_per_1m_input = input;
        self.cost_per_1m_output = output;
        self
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_speed(mut self, speed: u32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_context_window(mut self, tokens: u64) -> Self {
        self.context_window = tokens;
        self
    }

    pub fn with_capabilities(mut self, caps: impl IntoIterator<Item = Capability>) -> Self {
        self.capabilities = caps.into_iter().collect();
        self
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_status(mut self, status: ModelStatus) -> Self {
        self.status = status;
        self
    }

    /// Zero cost on both axes.
    pub fn is_free(&self) -> bool {
        self.cost_per_1m_input == 0.0 && self.cost_per_1m_output == 0.0
    }

    pub fn has_capability(&self, cap: Capability) -> bool {
        self.capabilities.contains(&cap)
    }

    pub fn is_active(&self) -> bool {
        self.status == ModelStatus::Active
    }

    /// Fill in fields that deserialization leaves empty.
    pub fn normalized(mut self) -> Self {
        if self.provider.is_empty() {
            self.provider = infer_provider(&self.id).to_string();
        }
        self
    }

    /// The model name the provider expects, i.e. `id` without a leading `provider/`.
    pub fn provider_model_name(&self) -> &str {
        self.id
            .strip_prefix(self.provider.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(&self.id)
    }
}

/// Infer the provider from a model id prefix.
pub fn infer_provider(model_id: &str) -> &'static str {
    if model_id.starts_with("cliproxy/") {
        return "cliproxy";
    }
    if model_id.starts_with("openrouter/") {
        return "openrouter";
    }
    let first = model_id.split('/').next().unwrap_or(model_id);
    match first {
        "anthropic" => "anthropic",
        "google" | "gemini" => "gemini",
        "openai" => "openai",
        _ => "openrouter",
    }
}
