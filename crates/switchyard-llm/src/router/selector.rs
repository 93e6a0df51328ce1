use std::collections::HashSet;

use switchyard_core::{Capability, ModelSpec, Tier};

use super::outcomes::OutcomeStore;
use crate::catalog::ModelCatalog;

/// Most fallbacks attached to a route.
pub const MAX_FALLBACKS: usize = 4;

const PRIORITY_WEIGHT: f64 = 0.4;
const SUCCESS_WEIGHT: f64 = 0.3;
const SPEED_POINTS: f64 = 4.0;
const LATENCY_DIVISOR: f64 = 200.0;
const MAX_LATENCY_PENALTY: f64 = 30.0;

/// Ranks catalog candidates for a tier under the router's provider policy.
pub(crate) struct Selector<'a> {
    pub catalog: &'a dyn ModelCatalog,
    pub outcomes: &'a OutcomeStore,
    pub prefer_free: bool,
    /// `None` (or an empty set) means every provider is usable.
    pub available_providers: Option<&'a HashSet<String>>,
}

impl Selector<'_> {
    /// Blend of static priority, observed reliability, speed and latency, in `[0, 100]`.
    pub fn composite(&self, model: &ModelSpec) -> f64 {
        let success = self.outcomes.success_rate(&model.id) * 100.0;
        let latency = self.outcomes.avg_latency(&model.id) as f64;
        let penalty = (latency / LATENCY_DIVISOR).min(MAX_LATENCY_PENALTY);

        let composite = f64::from(model.priority) * PRIORITY_WEIGHT
            + success * SUCCESS_WEIGHT
            + f64::from(model.speed) * SPEED_POINTS
            - penalty;
        composite.clamp(0.0, 100.0)
    }

    fn provider_allowed(&self, model: &ModelSpec) -> bool {
        match self.available_providers {
            Some(set) if !set.is_empty() => set.contains(&model.provider),
            _ => true,
        }
    }

    fn eligible(&self, model: &ModelSpec, capability: Option<Capability>) -> bool {
        capability.is_none_or(|c| model.has_capability(c)) && self.provider_allowed(model)
    }

    /// Best model in `tier`, or `None` when nothing passes the filters.
    pub fn select(&self, tier: Tier, capability: Option<Capability>) -> Option<ModelSpec> {
        let mut scored: Vec<(ModelSpec, f64)> = self
            .catalog
            .list_by_tier(tier)
            .into_iter()
            .filter(|m| self.eligible(m, capability))
            .map(|m| {
                let composite = self.composite(&m);
                (m, composite)
            })
            .collect();

        // sort_by is stable: equal composites keep catalog order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        if self.prefer_free
            && let Some(pos) = scored.iter().position(|(m, _)| m.is_free())
        {
            return Some(scored.swap_remove(pos).0);
        }
        scored.into_iter().next().map(|(m, _)| m)
    }

    /// Alternatives to `primary`: the rest of its tier, then each tier above it.
    pub fn fallbacks(
        &self,
        tier: Tier,
        primary: &ModelSpec,
        capability: Option<Capability>,
    ) -> Vec<ModelSpec> {
        let mut seen: HashSet<String> = HashSet::from([primary.id.clone()]);
        let mut out = Vec::new();

        let tiers = std::iter::once(tier).chain(tier.above().iter().copied());
        for t in tiers {
            for candidate in self.catalog.list_by_tier(t) {
                if out.len() == MAX_FALLBACKS {
                    return out;
                }
                if self.eligible(&candidate, capability) && seen.insert(candidate.id.clone()) {
                    out.push(candidate);
                }
            }
        }
        out
    }
}
