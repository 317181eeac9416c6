use thiserror::Error;

/// Errors from calls to a language model, for completions, prompts and embeddings alike.
#[derive(Error, Debug)]
pub enum LanguageModelError {
    #[error("Context length exceeded: {0}")]
    ContextLengthExceeded(anyhow::Error),
    #[error("Permanent error: {0}")]
    PermanentError(anyhow::Error),
    #[error("Transient error: {0}")]
    TransientError(anyhow::Error),
}

impl LanguageModelError {
    pub fn permanent(e: impl Into<anyhow::Error>) -> Self {
        LanguageModelError::PermanentError(e.into())
    }

    pub fn transient(e: impl Into<anyhow::Error>) -> Self {
        LanguageModelError::TransientError(e.into())
    }

    pub fn context_length_exceeded(e: impl Into<anyhow::Error>) -> Self {
        LanguageModelError::ContextLengthExceeded(e.into())
    }
}

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("arguments for tool failed to parse: {0}")]
    WrongArguments(#[from] serde_json::Error),

    #[error("tool call missing arguments")]
    MissingArguments,

    #[error("tool call failed: {0}")]
    ToolFailed(anyhow::Error),
}

impl ToolError {
    pub fn failed(e: impl Into<anyhow::Error>) -> Self {
        ToolError::ToolFailed(e.into())
    }
}
