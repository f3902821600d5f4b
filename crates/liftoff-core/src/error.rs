use thiserror::Error;

#[derive(Debug, Error)]
pub enum LiftoffError {
    #[error("liftoff is not initialized in this directory (run `liftoff init`)")]
    NotInitialized,

    #[error("setup spec '{0}' not found (import it with `liftoff spec import`)")]
    SpecNotFound(String),

    #[error("setup spec '{slug}' is malformed: {reason}")]
    SpecMalformed { slug: String, reason: String },

    #[error("spec '{spec}': step '{step}' names unknown operation '{operation}'")]
    UnknownOperation {
        spec: String,
        step: String,
        operation: String,
    },

    #[error("step '{step}' failed: {message}")]
    StepFailed { step: String, message: String },

    #[error("preview belongs to spec '{found}', expected '{expected}'")]
    PreviewMismatch { expected: String, found: String },

    #[error("domain '{0}' not found")]
    DomainNotFound(String),

    #[error("run record '{0}' not found")]
    RunNotFound(String),

    #[error("invalid slug '{0}': use lowercase letters, digits, and hyphens (max 64 chars)")]
    InvalidSlug(String),

    #[error("unknown on_error policy '{0}' (expected: abort, continue)")]
    InvalidPolicy(String),

    #[error("unknown severity '{0}' (expected: critical, recommended, optional)")]
    InvalidSeverity(String),

    #[error("unknown step phase '{0}' (expected: analyze, commit)")]
    InvalidPhase(String),

    #[error("run cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LiftoffError>;
