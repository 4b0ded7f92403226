use thiserror::Error;

/// Errors surfaced by the reconciliation engine.
///
/// Validation and structural errors reach the caller untouched. Collaborator
/// errors are normally absorbed by the engine and replaced with a safe default;
/// the rebalancer is the one pathway that reports them, because an aborted
/// rebalance must leave the caller holding the original plan.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("malformed plan: {0}")]
    Structural(String),

    #[error("collaborator failure: {0}")]
    Collaborator(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }

    pub fn structural(msg: impl Into<String>) -> Self {
        EngineError::Structural(msg.into())
    }

    pub fn collaborator(msg: impl Into<String>) -> Self {
        EngineError::Collaborator(msg.into())
    }

    /// Stable code for structured error output.
    pub fn error_code(&self) -> &'static str {
        match self {
            EngineError::Validation(_) => "VALIDATION_ERROR",
            EngineError::Structural(_) => "STRUCTURAL_ERROR",
            EngineError::Collaborator(_) => "COLLABORATOR_ERROR",
        }
    }
}
