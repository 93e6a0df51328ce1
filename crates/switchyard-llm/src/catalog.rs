use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use switchyard_core::{Capability, ModelSpec, Result, Tier};

/// Seconds after which a discovery snapshot is considered stale.
const DISCOVERY_TTL_SECS: f64 = 86_400.0;
/// Schema version written to the model cache file.
const CACHE_VERSION: u32 = 2;

/// Read-only view of the models the router may pick from.
///
/// Lookups hand out copies; the router never mutates catalog entries.
pub trait ModelCatalog: Send + Sync {
    /// Lookup by full id, or by alias (case-insensitive).
    fn get(&self, id_or_alias: &str) -> Option<ModelSpec>;

    /// All active models in a tier, in registration order.
    fn list_by_tier(&self, tier: Tier) -> Vec<ModelSpec>;

    /// All active models advertising a capability, in registration order.
    fn list_by_capability(&self, cap: Capability) -> Vec<ModelSpec>;
}

/// In-process model registry.
///
/// Entries come from three places, later ones overriding earlier ones:
/// 1. built-in defaults
/// 2. the JSON cache file
/// 3. models declared in `switchyard.toml`
pub struct ModelRegistry {
    models: Vec<ModelSpec>,
    /// Lower-cased alias → model id.
    aliases: HashMap<String, String>,
    cache_path: Option<PathBuf>,
    last_discovery: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    last_discovery: f64,
    #[serde(default)]
    models: Vec<serde_json::Value>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ModelRegistry {
    /// An empty registry with no cache file (for tests and fixtures).
    pub fn new_empty() -> Self {
        Self {
            models: Vec::new(),
            aliases: HashMap::new(),
            cache_path: None,
            last_discovery: 0.0,
        }
    }

    /// A registry holding only the built-in defaults.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new_empty();
        for spec in default_models() {
            registry.register(spec);
        }
        registry
    }

    /// Built-in defaults (optional) overlaid with the cache file at `cache_path`.
    pub fn load(cache_path: &Path, include_defaults: bool) -> Self {
        let mut registry = if include_defaults {
            Self::with_defaults()
        } else {
            Self::new_empty()
        };
        registry.cache_path = Some(cache_path.to_path_buf());
        registry.load_cache();
        registry
    }

    /// Register a model, replacing any entry with the same id in place.
    /// A non-active spec removes the id instead.
    pub fn register(&mut self, spec: ModelSpec) {
        let spec = spec.normalized();
        if !spec.is_active() {
            debug!(model = %spec.id, "dropping disabled model");
            self.unregister(&spec.id);
            return;
        }

        self.aliases.retain(|_, id| id != &spec.id);
        for alias in &spec.aliases {
            self.aliases.insert(alias.to_lowercase(), spec.id.clone());
        }

        match self.models.iter_mut().find(|m| m.id == spec.id) {
            Some(existing) => *existing = spec,
            None => self.models.push(spec),
        }
    }

    pub fn unregister(&mut self, model_id: &str) {
        self.models.retain(|m| m.id != model_id);
        self.aliases.retain(|_, id| id != model_id);
    }

    pub fn list_by_provider(&self, provider: &str) -> Vec<ModelSpec> {
        self.models
            .iter()
            .filter(|m| m.provider == provider)
            .cloned()
            .collect()
    }

    pub fn all(&self) -> &[ModelSpec] {
        &self.models
    }

    pub fn count(&self) -> usize {
        self.models.len()
    }

    /// Lowest combined input+output cost, optionally restricted to a capability.
    pub fn cheapest(&self, capability: Option<Capability>) -> Option<&ModelSpec> {
        self.candidates(capability).min_by(|a, b| {
            (a.cost_per_1m_input + a.cost_per_1m_output)
                .total_cmp(&(b.cost_per_1m_input + b.cost_per_1m_output))
        })
    }

    /// Highest speed rating; the earliest registered model wins ties.
    pub fn fastest(&self, capability: Option<Capability>) -> Option<&ModelSpec> {
        self.candidates(capability)
            .min_by_key(|m| std::cmp::Reverse(m.speed))
    }

    fn candidates(&self, capability: Option<Capability>) -> impl Iterator<Item = &ModelSpec> {
        self.models
            .iter()
            .filter(move |m| capability.is_none_or(|c| m.has_capability(c)))
    }

    /// True if no discovery snapshot exists or it is older than a day.
    pub fn needs_discovery(&self) -> bool {
        self.last_discovery == 0.0 || crate::unix_now() - self.last_discovery > DISCOVERY_TTL_SECS
    }

    /// Stamp the registry as freshly discovered.
    pub fn mark_discovered(&mut self) {
        self.last_discovery = crate::unix_now();
    }

    pub fn cache_path(&self) -> Option<&Path> {
        self.cache_path.as_deref()
    }

    // ── Persistence ────────────────────────────────────────────

    /// Merge models from the cache file. Returns how many entries were registered.
    fn load_cache(&mut self) -> usize {
        let Some(path) = self.cache_path.clone() else {
            return 0;
        };
        if !path.exists() {
            debug!(?path, "model cache not found");
            return 0;
        }

        let parsed = std::fs::read_to_string(&path)
            .map_err(switchyard_core::SwitchyardError::from)
            .and_then(|raw| Ok(serde_json::from_str::<CacheFile>(&raw)?));
        let cache = match parsed {
            Ok(cache) => cache,
            Err(e) => {
                warn!(?path, error = %e, "failed to load model cache");
                return 0;
            }
        };

        self.last_discovery = cache.last_discovery;
        let mut count = 0;
        for value in cache.models {
            match serde_json::from_value::<ModelSpec>(value) {
                Ok(spec) => {
                    self.register(spec);
                    count += 1;
                }
                Err(e) => debug!(error = %e, "skipping unreadable cached model"),
            }
        }
        if count > 0 {
            debug!(count, "loaded models from cache");
        }
        count
    }

    /// Persist the current registry to its cache file.
    pub fn save_cache(&self) -> Result<()> {
        let Some(path) = self.cache_path.as_deref() else {
            return Err(switchyard_core::SwitchyardError::Catalog(
                "registry has no cache path".into(),
            ));
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let cache = CacheFile {
            version: CACHE_VERSION,
            last_discovery: self.last_discovery,
            models: self
                .models
                .iter()
                .map(serde_json::to_value)
                .collect::<std::result::Result<_, _>>()?,
        };
        std::fs::write(path, serde_json::to_string_pretty(&cache)?)?;
        info!(?path, count = self.models.len(), "saved model cache");
        Ok(())
    }
}

impl ModelCatalog for ModelRegistry {
    fn get(&self, id_or_alias: &str) -> Option<ModelSpec> {
        self.models
            .iter()
            .find(|m| m.id == id_or_alias)
            .or_else(|| {
                let id = self.aliases.get(&id_or_alias.to_lowercase())?;
                self.models.iter().find(|m| &m.id == id)
            })
            .cloned()
    }

    fn list_by_tier(&self, tier: Tier) -> Vec<ModelSpec> {
        self.models
            .iter()
            .filter(|m| m.tier == tier)
            .cloned()
            .collect()
    }

    fn list_by_capability(&self, cap: Capability) -> Vec<ModelSpec> {
        self.models
            .iter()
            .filter(|m| m.has_capability(cap))
            .cloned()
            .collect()
    }
}

/// Minimal entries used when nothing else is configured.
fn default_models() -> Vec<ModelSpec> {
    vec![
        ModelSpec::new("cliproxy/gemini-2.5-flash", "cliproxy", Tier::Free)
            .with_context_window(1_000_000)
            .with_speed(5)
            .with_capabilities([Capability::Chat, Capability::Code, Capability::Vision])
            .with_aliases(&["cliproxy-flash"]),
        ModelSpec::new("cliproxy/claude-sonnet-4-5", "cliproxy", Tier::Free)
            .with_context_window(200_000)
            .with_capabilities([Capability::Chat, Capability::Code, Capability::Reasoning])
            .with_aliases(&["cliproxy-sonnet"]),
        ModelSpec::new("openrouter/perplexity/sonar-pro", "openrouter", Tier::Research)
            .with_cost(3.0, 15.0)
            .with_capabilities([Capability::Chat, Capability::Search])
            .with_aliases(&["perplexity", "sonar"]),
    ]
}
