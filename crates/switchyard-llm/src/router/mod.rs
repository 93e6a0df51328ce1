//! Task router: picks a model for a natural-language task and learns from
//! recorded outcomes.
//!
//! Pipeline for [`Router::route`]:
//!
//! ```text
//! task ─▶ Classifier ─▶ Scorer ─▶ tier ─▶ Selector ─▶ fallbacks ─▶ RouteResult
//!                         ▲                  ▲
//!                         └── OutcomeStore ──┘
//! ```

pub mod classifier;
pub mod outcomes;
pub mod scorer;
pub mod selector;
pub mod signature;

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use switchyard_core::{Capability, ModelSpec, Result, RoutingTables, SwitchyardError, TaskType, Tier};

use crate::catalog::ModelCatalog;
use classifier::Classifier;
use outcomes::{ModelStats, Outcome, OutcomeRecord, OutcomeStore, TASK_PREVIEW_CHARS};
use scorer::Scorer;
use selector::Selector;

pub use signature::task_signature;

/// Below this success rate a free-tier model counts as unreliable.
const UNRELIABLE_SUCCESS_RATE: f64 = 0.5;
/// Composite value at which the reasoning string omits the rating.
const NEUTRAL_COMPOSITE: f64 = 50.0;

/// Provider policy and persistence settings for a [`Router`].
#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// Within a tier, pick a free model whenever one is eligible.
    pub prefer_free_providers: bool,
    /// Restrict selection to these providers. `None` means unrestricted.
    pub available_providers: Option<HashSet<String>>,
    /// Where the outcome log lives. `None` keeps it in memory only.
    pub outcomes_path: Option<PathBuf>,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            prefer_free_providers: true,
            available_providers: None,
            outcomes_path: None,
        }
    }
}

/// The routing decision for one task.
#[derive(Debug, Clone, Serialize)]
pub struct RouteResult {
    pub model: ModelSpec,
    pub tier: Tier,
    pub score: i32,
    pub reasoning: String,
    pub signature: String,
    pub task_type: TaskType,
    pub fallbacks: Vec<ModelSpec>,
    pub composite_score: f64,
    /// Ids of the first three fallbacks.
    pub alternatives: Vec<String>,
}

impl RouteResult {
    pub fn provider(&self) -> &str {
        &self.model.provider
    }

    pub fn model_id(&self) -> &str {
        &self.model.id
    }
}

pub struct Router {
    catalog: Arc<dyn ModelCatalog>,
    classifier: Classifier,
    scorer: Scorer,
    outcomes: OutcomeStore,
    prefer_free: bool,
    available_providers: Option<HashSet<String>>,
}

impl Router {
    /// Build a router over `catalog`. The outcome log is loaded immediately.
    pub fn new(catalog: Arc<dyn ModelCatalog>, tables: RoutingTables, options: RouterOptions) -> Self {
        let outcomes = match options.outcomes_path {
            Some(path) => OutcomeStore::open(path),
            None => OutcomeStore::in_memory(),
        };
        Self {
            catalog,
            classifier: Classifier::new(&tables.research_keywords),
            scorer: Scorer::new(&tables),
            outcomes,
            prefer_free: options.prefer_free_providers,
            available_providers: options.available_providers,
        }
    }

    pub fn catalog(&self) -> &Arc<dyn ModelCatalog> {
        &self.catalog
    }

    pub fn outcomes(&self) -> &OutcomeStore {
        &self.outcomes
    }

    fn selector(&self) -> Selector<'_> {
        Selector {
            catalog: self.catalog.as_ref(),
            outcomes: &self.outcomes,
            prefer_free: self.prefer_free,
            available_providers: self.available_providers.as_ref(),
        }
    }

    /// True once any free-tier model has dropped below the reliability threshold.
    fn free_tier_unreliable(&self) -> bool {
        self.catalog
            .list_by_tier(Tier::Free)
            .iter()
            .any(|m| self.outcomes.success_rate(&m.id) < UNRELIABLE_SUCCESS_RATE)
    }

    pub fn classify(&self, task: &str) -> TaskType {
        self.classifier.classify(task)
    }

    pub fn score(&self, task: &str, task_type: TaskType) -> i32 {
        self.scorer.score(task, task_type, self.free_tier_unreliable())
    }

    /// Route a task to the best available model.
    ///
    /// When the scored tier has no eligible model the other tiers are tried
    /// in escalation order; [`SwitchyardError::NoSuitableModel`] is returned
    /// only once every tier is exhausted.
    pub fn route(&self, task: &str, capability: Option<Capability>) -> Result<RouteResult> {
        let task_type = self.classify(task);
        let score = self.score(task, task_type);
        let scored_tier = self.scorer.tier_for(score, task_type == TaskType::Research);

        let selector = self.selector();
        let (tier, model) = std::iter::once(scored_tier)
            .chain(Tier::ESCALATION.into_iter().filter(|t| *t != scored_tier))
            .find_map(|tier| selector.select(tier, capability).map(|m| (tier, m)))
            .ok_or(SwitchyardError::NoSuitableModel)?;

        if tier != scored_tier {
            debug!(from = %scored_tier, to = %tier, "escalated to next tier with an eligible model");
        }

        let fallbacks = selector.fallbacks(tier, &model, capability);
        let composite_score = selector.composite(&model);
        let reasoning = self.reasoning(task_type, score, tier, &model, composite_score);

        debug!(
            task = %preview(task, 60),
            %tier,
            model = %model.id,
            score,
            "routed task"
        );

        Ok(RouteResult {
            alternatives: fallbacks.iter().take(3).map(|m| m.id.clone()).collect(),
            signature: task_signature(task),
            model,
            tier,
            score,
            reasoning,
            task_type,
            fallbacks,
            composite_score,
        })
    }

    fn reasoning(
        &self,
        task_type: TaskType,
        score: i32,
        tier: Tier,
        model: &ModelSpec,
        composite: f64,
    ) -> String {
        let mut parts = vec![
            format!("type={task_type}"),
            format!("base={}", self.scorer.base_score(task_type)),
            format!("→{tier}(score={score})"),
            format!("model={}", model.id),
        ];
        if composite != NEUTRAL_COMPOSITE {
            parts.push(format!("rating={composite:.0}"));
        }
        parts.join(" | ")
    }

    /// Record how a routed task went. The log is persisted before returning.
    pub fn record_outcome(
        &self,
        model_id: &str,
        task: &str,
        success: bool,
        latency_ms: u64,
        error: Option<&str>,
    ) {
        let outcome = if success {
            Outcome::Success
        } else {
            Outcome::Fail
        };
        match (success, error) {
            (false, Some(error)) => warn!(model = model_id, latency_ms, error, "task failed"),
            (false, None) => warn!(model = model_id, latency_ms, "task failed"),
            (true, _) => info!(model = model_id, latency_ms, "task succeeded"),
        }

        self.outcomes.append(OutcomeRecord {
            signature: task_signature(task),
            model_id: model_id.to_string(),
            outcome,
            task_preview: preview(task, TASK_PREVIEW_CHARS),
            timestamp: crate::unix_now(),
            latency_ms,
        });
    }

    pub fn get_success_rate(&self, model_id: &str) -> f64 {
        self.outcomes.success_rate(model_id)
    }

    pub fn get_avg_latency(&self, model_id: &str) -> u64 {
        self.outcomes.avg_latency(model_id)
    }

    pub fn get_stats(&self) -> BTreeMap<String, ModelStats> {
        self.outcomes.stats()
    }
}

/// First `chars` characters of `text`.
fn preview(text: &str, chars: usize) -> String {
    text.chars().take(chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_respects_char_boundaries() {
        assert_eq!(preview("привет мир", 6), "привет");
        assert_eq!(preview("short", 100), "short");
    }
}
