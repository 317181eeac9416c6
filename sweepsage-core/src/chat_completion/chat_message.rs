use serde::{Deserialize, Serialize};

use super::tools::{ToolCall, ToolOutput};

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize, Default)]
pub struct AssistantMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Clone, strum_macros::EnumIs, PartialEq, Debug, Serialize, Deserialize)]
pub enum ChatMessage {
    System(String),
    User(String),
    Assistant(AssistantMessage),
    ToolOutput(ToolCall, ToolOutput),
}

impl std::fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatMessage::System(s) => write!(f, "System: \"{s}\""),
            ChatMessage::User(s) => write!(f, "User: \"{s}\""),
            ChatMessage::Assistant(message) => write!(
                f,
                "Assistant: \"{}\", tools: {}",
                message.content.as_deref().unwrap_or("None"),
                message.tool_calls.as_deref().map_or("None".to_string(), |tc| {
                    tc.iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                })
            ),
            ChatMessage::ToolOutput(tc, to) => write!(f, "ToolOutput: \"{tc}\": \"{to}\""),
        }
    }
}

impl ChatMessage {
    pub fn new_system(message: impl Into<String>) -> Self {
        ChatMessage::System(message.into())
    }

    pub fn new_user(message: impl Into<String>) -> Self {
        ChatMessage::User(message.into())
    }

    pub fn new_assistant(message: Option<String>, tool_calls: Option<Vec<ToolCall>>) -> Self {
        ChatMessage::Assistant(AssistantMessage {
            content: message,
            tool_calls,
        })
    }

    pub fn new_tool_output(tool_call: impl Into<ToolCall>, output: impl Into<ToolOutput>) -> Self {
        ChatMessage::ToolOutput(tool_call.into(), output.into())
    }

    /// Short role label, as printed in streamed agent output
    pub fn role(&self) -> &'static str {
        match self {
            ChatMessage::System(_) => "System",
            ChatMessage::User(_) => "User",
            ChatMessage::Assistant(_) => "Assistant",
            ChatMessage::ToolOutput(..) => "Tool",
        }
    }
}

/// Returns the content of the message as a string slice.
///
/// Note that this omits the tool calls from the assistant message.
impl AsRef<str> for ChatMessage {
    fn as_ref(&self) -> &str {
        match self {
            ChatMessage::System(s) | ChatMessage::User(s) => s,
            ChatMessage::Assistant(message) => message.content.as_deref().unwrap_or(""),
            ChatMessage::ToolOutput(_, output) => output.content(),
        }
    }
}
