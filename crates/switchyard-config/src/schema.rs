use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use switchyard_core::{ModelSpec, RoutingTables, SwitchyardError, Tier};

/// Root configuration, mapped to `switchyard.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitchyardConfig {
    pub router: RouterConfig,
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
}

/// `~/.switchyard`, where state files live unless configured otherwise.
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".switchyard")
}

// ── Router ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Within a tier, pick a free model whenever one is eligible.
    pub prefer_free_providers: bool,
    /// Providers the router may pick from. Unset means all of them.
    pub available_providers: Option<Vec<String>>,
    /// Outcome log location. Defaults to `~/.switchyard/routing_outcomes.json`.
    pub outcomes_path: Option<PathBuf>,
    /// Keyword weights, research triggers, base scores and tier bands.
    pub tables: RoutingTables,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            prefer_free_providers: true,
            available_providers: None,
            outcomes_path: None,
            tables: RoutingTables::default(),
        }
    }
}

impl RouterConfig {
    pub fn resolved_outcomes_path(&self) -> PathBuf {
        self.outcomes_path
            .clone()
            .unwrap_or_else(|| data_dir().join("routing_outcomes.json"))
    }
}

// ── Catalog ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Model cache file. Defaults to `~/.switchyard/models.json`.
    pub cache_path: Option<PathBuf>,
    /// Start from the built-in model list.
    pub include_defaults: bool,
    /// Models declared inline; these override cached and built-in entries.
    pub models: Vec<ModelSpec>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            cache_path: None,
            include_defaults: true,
            models: Vec::new(),
        }
    }
}

impl CatalogConfig {
    pub fn resolved_cache_path(&self) -> PathBuf {
        self.cache_path
            .clone()
            .unwrap_or_else(|| data_dir().join("models.json"))
    }
}

// ── Logging ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Output format: "pretty", "json", "compact".
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

// ── Validation ─────────────────────────────────────────────────

/// A config validation warning or error.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
    pub severity: WarningSeverity,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let icon = match self.severity {
            WarningSeverity::Error => "❌",
            WarningSeverity::Warning => "⚠️ ",
            WarningSeverity::Info => "💡",
        };
        write!(f, "{} {}: {}", icon, self.field, self.message)?;
        if let Some(ref h) = self.hint {
            write!(f, "\n   ↳ {}", h)?;
        }
        Ok(())
    }
}

const VALID_FORMATS: [&str; 3] = ["pretty", "json", "compact"];
const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl SwitchyardConfig {
    /// Validate the config and return the non-fatal findings.
    /// Any Error-severity finding fails with [`SwitchyardError::ConfigValidation`]
    /// naming the first offending field; later errors are appended to the reason.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, SwitchyardError> {
        let mut warnings = Vec::new();
        let tables = &self.router.tables;

        // ── Tier bands ───
        if let Err(reason) = tables.tier_bands.check() {
            warnings.push(ConfigWarning {
                field: "router.tables.tier_bands".into(),
                message: reason,
                severity: WarningSeverity::Error,
                hint: Some(
                    "Bands must ascend free → cheap → standard → premium, touch without gaps, and stay within 0-100"
                        .into(),
                ),
            });
        }

        // ── Keyword tables ───
        if tables.complexity_keywords.is_empty() {
            warnings.push(ConfigWarning {
                field: "router.tables.complexity_keywords".into(),
                message: "keyword table is empty; scores will come from base scores and length only".into(),
                severity: WarningSeverity::Warning,
                hint: Some("Remove the section to use the built-in bilingual table".into()),
            });
        }
        if tables.research_keywords.is_empty() {
            warnings.push(ConfigWarning {
                field: "router.tables.research_keywords".into(),
                message: "no research keywords; the research tier will never be selected".into(),
                severity: WarningSeverity::Warning,
                hint: None,
            });
        }

        // ── Providers ───
        if let Some(providers) = &self.router.available_providers {
            if providers.is_empty() {
                warnings.push(ConfigWarning {
                    field: "router.available_providers".into(),
                    message: "provider list is empty; no model could ever be selected".into(),
                    severity: WarningSeverity::Error,
                    hint: Some("Remove the key to allow every provider, or list e.g. [\"cliproxy\", \"openrouter\"]".into()),
                });
            } else if !self.router.prefer_free_providers && providers.iter().all(|p| p == "cliproxy") {
                warnings.push(ConfigWarning {
                    field: "router.prefer_free_providers".into(),
                    message: "only free providers are available, so the preference has no effect".into(),
                    severity: WarningSeverity::Info,
                    hint: None,
                });
            }
        }

        // ── Declared models ───
        for (i, model) in self.catalog.models.iter().enumerate() {
            let field = |name: &str| format!("catalog.models[{i}].{name}");
            if model.id.trim().is_empty() {
                warnings.push(ConfigWarning {
                    field: field("id"),
                    message: "model id is empty".into(),
                    severity: WarningSeverity::Error,
                    hint: Some("Use 'provider/model', e.g. 'openrouter/qwen/qwen3-coder'".into()),
                });
            }
            if !(1..=5).contains(&model.speed) {
                warnings.push(ConfigWarning {
                    field: field("speed"),
                    message: format!("speed {} is out of range", model.speed),
                    severity: WarningSeverity::Error,
                    hint: Some("Speed ranges from 1 (slow) to 5 (fast)".into()),
                });
            }
            if model.priority > 100 {
                warnings.push(ConfigWarning {
                    field: field("priority"),
                    message: format!("priority {} is above 100", model.priority),
                    severity: WarningSeverity::Error,
                    hint: Some("Priority ranges from 0 to 100 (default 50)".into()),
                });
            }
            if model.tier == Tier::Free && !model.is_free() {
                warnings.push(ConfigWarning {
                    field: field("tier"),
                    message: format!("'{}' is in the free tier but has a non-zero cost", model.id),
                    severity: WarningSeverity::Error,
                    hint: Some("Set both costs to 0 or move the model to the cheap tier".into()),
                });
            }
        }

        // ── Logging format ───
        if !VALID_FORMATS.contains(&self.logging.format.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.format".into(),
                message: format!("unknown log format '{}'", self.logging.format),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", VALID_FORMATS.join(", "))),
            });
        }

        // ── Logging level ───
        if !VALID_LEVELS.contains(&self.logging.level.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.level".into(),
                message: format!("unknown log level '{}'", self.logging.level),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", VALID_LEVELS.join(", "))),
            });
        }

        // Check for hard errors
        let mut errors = warnings
            .iter()
            .filter(|w| w.severity == WarningSeverity::Error);
        if let Some(first) = errors.next() {
            let mut reason = first.message.clone();
            for w in errors {
                reason.push_str(&format!("; {}: {}", w.field, w.message));
            }
            return Err(SwitchyardError::ConfigValidation {
                field: first.field.clone(),
                reason,
            });
        }

        Ok(warnings)
    }
}
