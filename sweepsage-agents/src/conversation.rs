use sweepsage_core::chat_completion::ChatMessage;

/// Name of the tool that switches a conversation into report mode
pub const REPORT_TRIGGER: &str = "fill_context_for_report";

/// Which system prompt a conversation uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum_macros::EnumIs, strum_macros::Display)]
pub enum PromptMode {
    #[default]
    Normal,
    /// Entered once the report trigger ran. There is no way back for the rest of the
    /// conversation.
    Report,
}

/// The system prompts an agent chooses from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    pub main: String,
    pub report: String,
}

impl PromptSet {
    pub fn new(main: impl Into<String>, report: impl Into<String>) -> Self {
        Self {
            main: main.into(),
            report: report.into(),
        }
    }
}

/// The system prompt for a conversation in `mode`
pub fn select_prompt(mode: PromptMode, prompts: &PromptSet) -> &str {
    match mode {
        PromptMode::Normal => &prompts.main,
        PromptMode::Report => &prompts.report,
    }
}

/// State owned by a single conversation: its prompt mode and its message history.
///
/// Conversations never share a context, so concurrent conversations cannot affect each other's
/// prompt selection.
#[derive(Debug, Clone, Default)]
pub struct ConversationContext {
    mode: PromptMode,
    history: Vec<ChatMessage>,
}

impl ConversationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> PromptMode {
        self.mode
    }

    pub fn enter_report_mode(&mut self) {
        if self.mode.is_normal() {
            tracing::info!("Switching conversation to report mode");
        }
        self.mode = PromptMode::Report;
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub(crate) fn record(&mut self, message: ChatMessage) {
        self.history.push(message);
    }
}
