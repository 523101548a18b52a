use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Intent not selected: {0}")]
    IntentNotSelected(String),

    #[error("Scope violation: {0}")]
    ScopeViolation(String),

    #[error("Illegal transition: {0}")]
    Transition(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
