//! The tool-calling loop
use derive_builder::Builder;
use sweepsage_core::chat_completion::{
    ChatCompletion, ChatCompletionRequest, ChatMessage, Tool, ToolCall, ToolOutput,
};
use tokio::sync::mpsc;
use tokio_stream::{Stream, wrappers::ReceiverStream};

use crate::{
    conversation::{ConversationContext, PromptSet, REPORT_TRIGGER, select_prompt},
    errors::AgentError,
};

const DEFAULT_MAX_ITERATIONS: usize = 10;

/// A support agent answering a query by calling a chat model and the tools it asks for.
///
/// Each iteration sends the system prompt selected for the conversation, followed by the whole
/// conversation history, to the model. Tool calls in the response are executed one after the
/// other and their outputs appended to the history. The loop ends when the model answers without
/// calling a tool.
///
/// A tool that fails does not end the loop; the model receives the failure as the tool's output.
#[derive(Clone, Builder)]
#[builder(setter(into), build_fn(error = "anyhow::Error"))]
pub struct Agent {
    llm: Box<dyn ChatCompletion>,
    #[builder(default)]
    tools: Vec<Box<dyn Tool>>,
    prompts: PromptSet,
    /// Model calls allowed per query
    #[builder(default = "DEFAULT_MAX_ITERATIONS")]
    max_iterations: usize,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field(
                "tools",
                &self.tools.iter().map(|t| t.name()).collect::<Vec<_>>(),
            )
            .field("max_iterations", &self.max_iterations)
            .finish()
    }
}

impl AgentBuilder {
    /// Sets the chat model
    pub fn llm_client(&mut self, llm: impl ChatCompletion + 'static) -> &mut Self {
        self.llm = Some(Box::new(llm) as Box<dyn ChatCompletion>);
        self
    }

    /// Adds a tool to the tools already configured
    pub fn add_tool(&mut self, tool: impl Tool + 'static) -> &mut Self {
        self.tools
            .get_or_insert_with(Vec::new)
            .push(Box::new(tool) as Box<dyn Tool>);
        self
    }
}

impl Agent {
    pub fn builder() -> AgentBuilder {
        AgentBuilder::default()
    }

    pub fn tools(&self) -> &[Box<dyn Tool>] {
        &self.tools
    }

    /// Runs the loop for `query` within an existing conversation and returns the final answer.
    ///
    /// The conversation's history grows with the query and every message that follows it. If
    /// the report trigger succeeds, the conversation stays in report mode afterwards.
    ///
    /// # Errors
    ///
    /// Fails when the model call fails or the model keeps calling tools past the iteration limit.
    pub async fn query(
        &self,
        context: &mut ConversationContext,
        query: &str,
    ) -> Result<String, AgentError> {
        self.run(context, query, None).await
    }

    /// Runs `query` in a fresh conversation and streams every non-empty message as
    /// `[Role] content\n`, starting with the query itself.
    ///
    /// The stream ends with the final answer, or with the error that stopped the loop.
    pub fn execute_stream(
        &self,
        query: &str,
    ) -> impl Stream<Item = Result<String, AgentError>> + use<> {
        let (tx, rx) = mpsc::channel(32);
        let agent = self.clone();
        let query = query.to_string();

        tokio::spawn(async move {
            let mut context = ConversationContext::new();
            if let Err(e) = agent.run(&mut context, &query, Some(&tx)).await {
                let _ = tx.send(Err(e)).await;
            }
        });

        ReceiverStream::new(rx)
    }

    #[tracing::instrument(skip_all, name = "agent.query", fields(mode = tracing::field::Empty))]
    async fn run(
        &self,
        context: &mut ConversationContext,
        query: &str,
        events: Option<&mpsc::Sender<Result<String, AgentError>>>,
    ) -> Result<String, AgentError> {
        Self::record(context, ChatMessage::new_user(query), events).await;

        for _ in 0..self.max_iterations {
            let system_prompt = select_prompt(context.mode(), &self.prompts);
            tracing::Span::current().record("mode", tracing::field::display(context.mode()));

            tracing::info!(messages = context.history().len(), "Calling model");
            if let Some(last) = context.history().last() {
                tracing::debug!(
                    role = last.role(),
                    content = last.as_ref().trim(),
                    "Last message before model call"
                );
            }

            let mut messages = Vec::with_capacity(context.history().len() + 1);
            messages.push(ChatMessage::new_system(system_prompt));
            messages.extend(context.history().iter().cloned());

            let request = ChatCompletionRequest::builder()
                .messages(messages)
                .tools_spec(
                    self.tools
                        .iter()
                        .map(|tool| tool.tool_spec())
                        .collect::<Vec<_>>(),
                )
                .build()
                .map_err(AgentError::FailedToBuildRequest)?;

            let response = self
                .llm
                .complete(&request)
                .await
                .map_err(AgentError::CompletionsFailed)?;

            let tool_calls = response.tool_calls().map(<[ToolCall]>::to_vec);
            Self::record(
                context,
                ChatMessage::new_assistant(response.message.clone(), tool_calls.clone()),
                events,
            )
            .await;

            let Some(tool_calls) = tool_calls else {
                return Ok(response.message.unwrap_or_default());
            };

            for tool_call in tool_calls {
                let output = self.invoke_tool(&tool_call).await;

                if output.is_text() && tool_call.name() == REPORT_TRIGGER {
                    context.enter_report_mode();
                }

                Self::record(context, ChatMessage::ToolOutput(tool_call, output), events).await;
            }
        }

        Err(AgentError::MaxIterations(self.max_iterations))
    }

    /// Invokes the tool a call refers to. Failures become a failed tool output for the model.
    async fn invoke_tool(&self, tool_call: &ToolCall) -> ToolOutput {
        let name = tool_call.name();
        tracing::info!(tool = name, args = tool_call.args().unwrap_or("{}"), "Invoking tool");

        let Some(tool) = self.tools.iter().find(|tool| tool.name() == name) else {
            tracing::warn!(tool = name, "Model called a tool that does not exist");
            return ToolOutput::fail(format!("Tool `{name}` does not exist"));
        };

        match tool.invoke(tool_call.args()).await {
            Ok(output) => {
                tracing::info!(tool = name, "Tool completed");
                output
            }
            Err(e) => {
                tracing::error!(tool = name, error = %e, "Tool failed");
                ToolOutput::fail(e.to_string())
            }
        }
    }

    async fn record(
        context: &mut ConversationContext,
        message: ChatMessage,
        events: Option<&mpsc::Sender<Result<String, AgentError>>>,
    ) {
        if let Some(events) = events {
            let content = message.as_ref().trim();
            if !content.is_empty() {
                let line = format!("[{}] {content}\n", message.role());
                // The receiver went away, the run continues regardless
                let _ = events.send(Ok(line)).await;
            }
        }
        context.record(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::FillContextForReport;
    use futures_util::StreamExt as _;
    use pretty_assertions::assert_eq;
    use sweepsage_core::{
        assistant, chat_completion::errors::LanguageModelError, chat_response,
        test_utils::MockChatCompletion, tool_output, user,
    };

    fn prompts() -> PromptSet {
        PromptSet::new("main prompt", "report prompt")
    }

    fn agent(llm: &MockChatCompletion) -> Agent {
        Agent::builder()
            .llm_client(llm.clone())
            .add_tool(FillContextForReport)
            .prompts(prompts())
            .build()
            .unwrap()
    }

    #[test_log::test(tokio::test)]
    async fn test_answers_without_tools() {
        let llm = MockChatCompletion::new();
        llm.respond_with(chat_response!("Empty the bin after each run"));

        let mut context = ConversationContext::new();
        let answer = agent(&llm)
            .query(&mut context, "How often to empty the bin?")
            .await
            .unwrap();

        assert_eq!(answer, "Empty the bin after each run");
        assert_eq!(
            context.history(),
            &[
                user!("How often to empty the bin?"),
                assistant!("Empty the bin after each run"),
            ]
        );
        assert_eq!(llm.system_prompts(), vec!["main prompt"]);
    }

    #[test_log::test(tokio::test)]
    async fn test_switches_prompt_after_report_tool() {
        let llm = MockChatCompletion::new();
        llm.respond_with(chat_response!("Preparing"; tool_calls = ["fill_context_for_report"]))
            .respond_with(chat_response!("Your monthly report"));

        let mut context = ConversationContext::new();
        agent(&llm)
            .query(&mut context, "Generate my report")
            .await
            .unwrap();

        assert_eq!(llm.system_prompts(), vec!["main prompt", "report prompt"]);
        assert!(context.mode().is_report());
        assert_eq!(
            context.history()[2],
            tool_output!("fill_context_for_report", "fill_context_for_report completed")
        );
    }

    #[tokio::test]
    async fn test_report_mode_persists_across_queries() {
        let llm = MockChatCompletion::new();
        llm.respond_with(chat_response!("Preparing"; tool_calls = ["fill_context_for_report"]))
            .respond_with(chat_response!("Your monthly report"))
            .respond_with(chat_response!("Anything else?"));

        let agent = agent(&llm);
        let mut context = ConversationContext::new();
        agent.query(&mut context, "Generate my report").await.unwrap();
        agent.query(&mut context, "Thanks").await.unwrap();

        assert_eq!(
            llm.system_prompts(),
            vec!["main prompt", "report prompt", "report prompt"]
        );
    }

    #[tokio::test]
    async fn test_unknown_tool_is_reported_to_model() {
        let llm = MockChatCompletion::new();
        llm.respond_with(chat_response!("Let me check"; tool_calls = ["does_not_exist"]))
            .respond_with(chat_response!("Sorry"));

        let mut context = ConversationContext::new();
        let answer = agent(&llm).query(&mut context, "Hi").await.unwrap();

        assert_eq!(answer, "Sorry");
        assert!(matches!(
            &context.history()[2],
            ChatMessage::ToolOutput(_, ToolOutput::Fail(_))
        ));
        assert!(context.mode().is_normal());
    }

    #[tokio::test]
    async fn test_completion_failure_is_returned() {
        let llm = MockChatCompletion::new();
        llm.fail_with(LanguageModelError::permanent(anyhow::anyhow!("bad key")));

        let mut context = ConversationContext::new();
        let error = agent(&llm).query(&mut context, "Hi").await.unwrap_err();

        assert!(matches!(
            error,
            AgentError::CompletionsFailed(LanguageModelError::PermanentError(_))
        ));
    }

    #[tokio::test]
    async fn test_stops_after_max_iterations() {
        let llm = MockChatCompletion::new();
        llm.respond_with(chat_response!("again"; tool_calls = ["fill_context_for_report"]))
            .respond_with(chat_response!("again"; tool_calls = ["fill_context_for_report"]));

        let agent = Agent::builder()
            .llm_client(llm.clone())
            .add_tool(FillContextForReport)
            .prompts(prompts())
            .max_iterations(2_usize)
            .build()
            .unwrap();

        let mut context = ConversationContext::new();
        let error = agent.query(&mut context, "Hi").await.unwrap_err();
        assert!(matches!(error, AgentError::MaxIterations(2)));
    }

    #[tokio::test]
    async fn test_concurrent_conversations_keep_their_own_mode() {
        let reporting = MockChatCompletion::new();
        reporting
            .respond_with(chat_response!("Preparing"; tool_calls = ["fill_context_for_report"]))
            .respond_with(chat_response!("Report"));
        let chatting = MockChatCompletion::new();
        chatting.respond_with(chat_response!("Hello"));

        let reporting_agent = agent(&reporting);
        let chatting_agent = agent(&chatting);
        let mut first = ConversationContext::new();
        let mut second = ConversationContext::new();

        let (a, b) = tokio::join!(
            reporting_agent.query(&mut first, "Report please"),
            chatting_agent.query(&mut second, "Hi")
        );
        a.unwrap();
        b.unwrap();

        assert!(first.mode().is_report());
        assert!(second.mode().is_normal());
        assert_eq!(chatting.system_prompts(), vec!["main prompt"]);
    }

    #[tokio::test]
    async fn test_execute_stream_prefixes_roles() {
        let llm = MockChatCompletion::new();
        llm.respond_with(chat_response!(""; tool_calls = ["fill_context_for_report"]))
            .respond_with(chat_response!("  Your report  "));

        let lines = agent(&llm)
            .execute_stream("Generate my report")
            .map(Result::unwrap)
            .collect::<Vec<_>>()
            .await;

        assert_eq!(
            lines,
            vec![
                "[User] Generate my report\n",
                "[Tool] fill_context_for_report completed\n",
                "[Assistant] Your report\n",
            ]
        );
    }

    #[tokio::test]
    async fn test_execute_stream_ends_with_error() {
        let llm = MockChatCompletion::new();
        llm.fail_with(LanguageModelError::transient(anyhow::anyhow!("timeout")));

        let items = agent(&llm).execute_stream("Hi").collect::<Vec<_>>().await;

        assert_eq!(items.len(), 2);
        assert!(items[1].is_err());
    }
}
