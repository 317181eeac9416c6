use async_trait::async_trait;
use sweepsage_core::{
    SimplePrompt,
    chat_completion::{
        ChatCompletion as _, ChatCompletionRequest, ChatMessage, errors::LanguageModelError,
    },
    prompt::Prompt,
    util::debug_long_utf8,
};

use super::GenericOpenAI;

#[async_trait]
impl<C> SimplePrompt for GenericOpenAI<C>
where
    C: async_openai::config::Config + Clone + std::fmt::Debug + Default + Send + Sync + 'static,
{
    /// Renders the prompt and sends it as a single user message
    #[tracing::instrument(skip_all)]
    async fn prompt(&self, prompt: Prompt) -> Result<String, LanguageModelError> {
        let rendered = prompt.render().map_err(LanguageModelError::permanent)?;
        tracing::debug!(prompt = %debug_long_utf8(&rendered, 100), "Prompting model");

        let request = ChatCompletionRequest::builder()
            .messages(vec![ChatMessage::new_user(rendered)])
            .build()
            .map_err(LanguageModelError::permanent)?;

        let response = self.complete(&request).await?;
        Ok(response.message.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use crate::ollama::Ollama;
    use serde_json::json;
    use sweepsage_core::{SimplePrompt, prompt::Template};
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, method, path},
    };

    #[tokio::test]
    async fn test_renders_and_returns_answer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "model": "qwen3",
                "messages": [{"role": "user", "content": "Summarize: brushes"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-2",
                "object": "chat.completion",
                "created": 1_735_689_600,
                "model": "qwen3",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "Clean the brushes"},
                    "finish_reason": "stop"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let ollama = Ollama::builder()
            .config(crate::ollama::OllamaConfig::with_api_base(server.uri()))
            .default_prompt_model("qwen3")
            .build()
            .unwrap();

        let prompt = Template::with_placeholders("Summarize: {input}", &["input"])
            .to_prompt()
            .with_context_value("input", "brushes");

        assert_eq!(ollama.prompt(prompt).await.unwrap(), "Clean the brushes");
    }
}
