use std::path::{Path, PathBuf};
use tracing::{info, warn};

use switchyard_core::{Result, SwitchyardError};

use crate::schema::{ConfigWarning, SwitchyardConfig, data_dir};

/// Loads the Switchyard configuration and keeps the warnings it produced.
pub struct ConfigLoader {
    config: SwitchyardConfig,
    config_path: PathBuf,
    warnings: Vec<ConfigWarning>,
    from_file: bool,
}

impl ConfigLoader {
    /// Resolve the config path: explicit path > SWITCHYARD_CONFIG env > ~/.switchyard/switchyard.toml
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var("SWITCHYARD_CONFIG") {
            return PathBuf::from(p);
        }
        data_dir().join("switchyard.toml")
    }

    /// Load the config from disk, falling back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = Self::resolve_path(path);
        let from_file = config_path.exists();
        let config = if from_file {
            info!(?config_path, "loading configuration");
            let raw = std::fs::read_to_string(&config_path)?;
            Self::parse(&raw, &config_path)?
        } else {
            warn!(?config_path, "config file not found, using defaults");
            SwitchyardConfig::default()
        };

        let config = Self::apply_env_overrides(config);
        Self::finish(config, config_path, from_file)
    }

    /// Build a loader from an in-memory TOML document. Env overrides are not applied.
    pub fn from_toml(raw: &str) -> Result<Self> {
        let origin = PathBuf::from("<inline>");
        let config = Self::parse(raw, &origin)?;
        Self::finish(config, origin, false)
    }

    fn parse(raw: &str, origin: &Path) -> Result<SwitchyardConfig> {
        toml::from_str::<SwitchyardConfig>(raw).map_err(|e| {
            SwitchyardError::Config(format!("failed to parse {}: {}", origin.display(), e))
        })
    }

    /// Validate: log warnings, fail on errors.
    fn finish(config: SwitchyardConfig, config_path: PathBuf, from_file: bool) -> Result<Self> {
        let warnings = config.validate()?;
        for w in &warnings {
            warn!("{}", w);
        }
        Ok(Self {
            config,
            config_path,
            warnings,
            from_file,
        })
    }

    /// Get a snapshot of the current config.
    pub fn get(&self) -> SwitchyardConfig {
        self.config.clone()
    }

    pub fn config(&self) -> &SwitchyardConfig {
        &self.config
    }

    /// Resolved config path (it may not exist).
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Whether the config was read from a file rather than defaulted.
    pub fn from_file(&self) -> bool {
        self.from_file
    }

    /// Non-fatal validation findings.
    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }

    /// Apply env var overrides (SWITCHYARD_LOG_LEVEL, SWITCHYARD_PREFER_FREE, etc.)
    pub fn apply_env_overrides(config: SwitchyardConfig) -> SwitchyardConfig {
        Self::apply_overrides(config, |key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides(
        mut config: SwitchyardConfig,
        var: impl Fn(&str) -> Option<String>,
    ) -> SwitchyardConfig {
        if let Some(v) = var("SWITCHYARD_LOG_LEVEL") {
            config.logging.level = v;
        }
        if let Some(v) = var("SWITCHYARD_OUTCOMES_PATH") {
            config.router.outcomes_path = Some(PathBuf::from(v));
        }
        if let Some(v) = var("SWITCHYARD_AVAILABLE_PROVIDERS") {
            let providers: Vec<String> = v
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
            // An empty override lifts the restriction instead of blocking every provider
            config.router.available_providers = (!providers.is_empty()).then_some(providers);
        }
        if let Some(v) = var("SWITCHYARD_PREFER_FREE") {
            match parse_bool(&v) {
                Some(prefer) => config.router.prefer_free_providers = prefer,
                None => warn!(value = %v, "ignoring SWITCHYARD_PREFER_FREE: expected true/false"),
            }
        }
        config
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
