use thiserror::Error;

/// Errors surfaced to the caller of a tool.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("execution failed: {0}")]
    Execution(String),
}

impl From<crate::Error> for ToolError {
    fn from(e: crate::Error) -> Self {
        Self::Execution(e.to_string())
    }
}
