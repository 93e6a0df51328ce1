use thiserror::Error;

/// Unified error type for the Switchyard workspace.
#[derive(Error, Debug)]
pub enum SwitchyardError {
    // ── Routing errors ─────────────────────────────────────────
    #[error("no suitable model for any tier")]
    NoSuitableModel,

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("provider not available: {provider} (available: {available})")]
    ProviderUnavailable { provider: String, available: String },

    // ── Gateway errors ─────────────────────────────────────────
    #[error("gateway error: {0}")]
    Gateway(String),

    // ── Catalog errors ─────────────────────────────────────────
    #[error("catalog error: {0}")]
    Catalog(String),

    // ── Config errors ──────────────────────────────────────────
    #[error("config error: {0}")]
    Config(String),

    #[error("config validation failed: {field}: {reason}")]
    ConfigValidation { field: String, reason: String },

    // ── Generic wrappers ───────────────────────────────────────
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SwitchyardError>;
