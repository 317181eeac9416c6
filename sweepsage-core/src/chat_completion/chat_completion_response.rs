use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use super::tools::ToolCall;

/// A generic response from chat completions
#[derive(Clone, Builder, Debug, Serialize, Deserialize, PartialEq, Default)]
#[builder(setter(strip_option, into))]
pub struct ChatCompletionResponse {
    #[builder(default)]
    pub message: Option<String>,

    #[builder(default)]
    pub tool_calls: Option<Vec<ToolCall>>,

    #[builder(default)]
    pub usage: Option<Usage>,
}

#[derive(Clone, Default, Builder, Debug, Serialize, Deserialize, PartialEq)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl ChatCompletionResponse {
    pub fn builder() -> ChatCompletionResponseBuilder {
        ChatCompletionResponseBuilder::default()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Tool calls requested by the model, empty lists count as none
    pub fn tool_calls(&self) -> Option<&[ToolCall]> {
        self.tool_calls.as_deref().filter(|calls| !calls.is_empty())
    }
}
