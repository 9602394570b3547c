use thiserror::Error;

#[derive(Debug, Error)]
pub enum RulekitError {
    #[error("not initialized: run 'rulekit init'")]
    NotInitialized,

    #[error("already initialized: {0} exists (pass --force to re-initialize)")]
    AlreadyInitialized(String),

    #[error(
        "state file corrupt at {path}: {reason} — run 'rulekit init --force' to rebuild \
         (three-way diffing against the old baseline is lost)"
    )]
    StateCorrupt { path: String, reason: String },

    #[error("unsupported state schema version {0} (written by a newer rulekit?)")]
    UnsupportedStateVersion(u32),

    #[error("catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("invalid document path '{0}': must be relative lowercase-kebab segments")]
    InvalidDocPath(String),

    #[error("invalid content hash '{0}'")]
    InvalidHash(String),

    #[error("unknown agent tool '{0}': expected cursor, claude, or codex")]
    UnknownAgentTool(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, RulekitError>;
