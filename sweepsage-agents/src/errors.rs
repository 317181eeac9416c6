use sweepsage_core::chat_completion::{
    ChatCompletionRequestBuilderError, errors::LanguageModelError,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Failed to build chat completion request {0}")]
    FailedToBuildRequest(ChatCompletionRequestBuilderError),

    #[error("Error from LLM when running completions {0}")]
    CompletionsFailed(LanguageModelError),

    #[error("Agent did not finish within {0} model calls")]
    MaxIterations(usize),
}
