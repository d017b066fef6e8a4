//! Error types for llmify.

use crate::config::ConfigError;
use crate::output::OutputError;
use crate::walker::WalkError;

/// Top-level error type for llmify operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmifyError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Walk(#[from] WalkError),

    #[error("{0}")]
    Output(#[from] OutputError),
}

/// Map an error to its exit code.
pub fn exit_code(error: &LlmifyError) -> i32 {
    match error {
        LlmifyError::Config(_) => 2,
        LlmifyError::Walk(WalkError::NotFound { .. }) => 3,
        LlmifyError::Walk(WalkError::NotADirectory { .. }) => 4,
        LlmifyError::Walk(WalkError::Io { .. }) => 1,
        LlmifyError::Output(_) => 5,
    }
}
