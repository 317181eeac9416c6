use std::fmt::Debug;

use async_trait::async_trait;

use crate::{chat_completion::errors::LanguageModelError, prompt::Prompt};

#[cfg(feature = "test-utils")]
#[doc(hidden)]
use mockall::{automock, predicate::str};

#[cfg_attr(feature = "test-utils", automock)]
#[async_trait]
/// Given a rendered prompt, queries an LLM and returns its answer
pub trait SimplePrompt: Send + Sync + Debug {
    async fn prompt(&self, prompt: Prompt) -> Result<String, LanguageModelError>;
}
