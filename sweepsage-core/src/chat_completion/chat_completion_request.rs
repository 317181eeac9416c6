use derive_builder::Builder;

use super::{chat_message::ChatMessage, tools::ToolSpec};

/// A series of chat messages and the tools the model may call, ready to send to any LLM.
#[derive(Builder, Clone, PartialEq, Debug)]
#[builder(setter(into, strip_option))]
pub struct ChatCompletionRequest {
    messages: Vec<ChatMessage>,
    #[builder(default)]
    tools_spec: Vec<ToolSpec>,
}

impl ChatCompletionRequest {
    pub fn builder() -> ChatCompletionRequestBuilder {
        ChatCompletionRequestBuilder::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The system prompt this request was prepared with, if any
    pub fn system_prompt(&self) -> Option<&str> {
        self.messages.iter().find_map(|message| match message {
            ChatMessage::System(prompt) => Some(prompt.as_str()),
            _ => None,
        })
    }

    pub fn tools_spec(&self) -> &[ToolSpec] {
        &self.tools_spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_is_found() {
        let request = ChatCompletionRequest::builder()
            .messages(vec![
                ChatMessage::new_system("You are helpful"),
                ChatMessage::new_user("Hello"),
            ])
            .build()
            .unwrap();

        assert_eq!(request.system_prompt(), Some("You are helpful"));
        assert_eq!(request.messages().len(), 2);
        assert!(request.tools_spec().is_empty());
    }
}
