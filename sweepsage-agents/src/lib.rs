//! The sweepsage support agent.
//!
//! An [`Agent`] runs a tool-calling loop against a chat model. Every conversation owns a
//! [`ConversationContext`] which starts in [`PromptMode::Normal`] and switches to
//! [`PromptMode::Report`] once the model calls the report trigger tool. Before every model call
//! the system prompt is chosen by [`select_prompt`] from the current mode.
mod agent;
mod conversation;
mod errors;
pub mod tools;

pub use agent::{Agent, AgentBuilder};
pub use conversation::{ConversationContext, PromptMode, PromptSet, REPORT_TRIGGER, select_prompt};
pub use errors::AgentError;
