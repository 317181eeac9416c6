use async_openai::{
    error::OpenAIError,
    types::{
        ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
        ChatCompletionTool, ChatCompletionToolArgs, ChatCompletionToolType,
        CreateChatCompletionRequestArgs, FunctionCall, FunctionObjectArgs,
    },
};
use async_trait::async_trait;
use itertools::Itertools as _;
use sweepsage_core::chat_completion::{
    ChatCompletion, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ToolCall,
    ToolSpec, Usage, errors::LanguageModelError,
};

use super::{GenericOpenAI, openai_error_to_language_model_error};

#[async_trait]
impl<C> ChatCompletion for GenericOpenAI<C>
where
    C: async_openai::config::Config + Clone + std::fmt::Debug + Default + Send + Sync + 'static,
{
    #[tracing::instrument(skip_all)]
    async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, LanguageModelError> {
        let model = self.prompt_model()?;

        let messages = request
            .messages()
            .iter()
            .map(message_to_openai)
            .collect::<Result<Vec<_>, _>>()
            .map_err(openai_error_to_language_model_error)?;

        let mut openai_request = CreateChatCompletionRequestArgs::default();
        openai_request.model(model).messages(messages);

        if !request.tools_spec().is_empty() {
            openai_request.tools(
                request
                    .tools_spec()
                    .iter()
                    .map(tool_to_openai)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(openai_error_to_language_model_error)?,
            );
        }

        let openai_request = openai_request
            .build()
            .map_err(openai_error_to_language_model_error)?;

        let response = self
            .client
            .chat()
            .create(openai_request)
            .await
            .map_err(openai_error_to_language_model_error)?;

        let Some(choice) = response.choices.into_iter().next() else {
            return Err(LanguageModelError::permanent(anyhow::anyhow!(
                "Expected at least one choice in the response"
            )));
        };

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tool_call| {
                ToolCall::builder()
                    .id(tool_call.id)
                    .name(tool_call.function.name)
                    .args(tool_call.function.arguments)
                    .build()
            })
            .try_collect::<_, Vec<_>, _>()
            .map_err(LanguageModelError::permanent)?;

        let usage = response.usage.map(|usage| Usage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        });

        Ok(ChatCompletionResponse {
            message: choice.message.content,
            tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
            usage,
        })
    }
}

fn tool_to_openai(spec: &ToolSpec) -> Result<ChatCompletionTool, OpenAIError> {
    ChatCompletionToolArgs::default()
        .r#type(ChatCompletionToolType::Function)
        .function(
            FunctionObjectArgs::default()
                .name(spec.name.as_str())
                .description(spec.description.as_str())
                .parameters(spec.parameters_json())
                .build()?,
        )
        .build()
}

fn message_to_openai(message: &ChatMessage) -> Result<ChatCompletionRequestMessage, OpenAIError> {
    let openai_message = match message {
        ChatMessage::System(content) => ChatCompletionRequestSystemMessageArgs::default()
            .content(content.as_str())
            .build()?
            .into(),
        ChatMessage::User(content) => ChatCompletionRequestUserMessageArgs::default()
            .content(content.as_str())
            .build()?
            .into(),
        ChatMessage::Assistant(assistant) => {
            let mut builder = ChatCompletionRequestAssistantMessageArgs::default();

            if let Some(content) = &assistant.content {
                builder.content(content.as_str());
            }

            if let Some(tool_calls) = &assistant.tool_calls {
                builder.tool_calls(
                    tool_calls
                        .iter()
                        .map(|tool_call| ChatCompletionMessageToolCall {
                            id: tool_call.id().to_string(),
                            r#type: ChatCompletionToolType::Function,
                            function: FunctionCall {
                                name: tool_call.name().to_string(),
                                arguments: tool_call.args().unwrap_or("{}").to_string(),
                            },
                        })
                        .collect::<Vec<_>>(),
                );
            }

            builder.build()?.into()
        }
        // Failed outputs keep their failure prefix so the model can tell them apart
        ChatMessage::ToolOutput(tool_call, output) => ChatCompletionRequestToolMessageArgs::default()
            .content(output.to_string())
            .tool_call_id(tool_call.id())
            .build()?
            .into(),
    };

    Ok(openai_message)
}

#[cfg(test)]
mod tests {
    use crate::dashscope::{Dashscope, DashscopeConfig};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use sweepsage_core::chat_completion::{
        ChatCompletion, ChatCompletionRequest, ChatMessage, ToolCall, ToolOutput, ToolSpec,
        errors::LanguageModelError,
    };
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, header, method, path},
    };

    fn client(server: &MockServer) -> Dashscope {
        Dashscope::builder()
            .config(DashscopeConfig::new(server.uri(), "test-key"))
            .default_prompt_model("qwen3-max")
            .build()
            .unwrap()
    }

    fn request() -> ChatCompletionRequest {
        ChatCompletionRequest::builder()
            .messages(vec![
                ChatMessage::new_system("You are a support agent"),
                ChatMessage::new_user("What is the weather?"),
            ])
            .tools_spec(vec![
                ToolSpec::builder()
                    .name("get_user_location")
                    .description("Location of the user")
                    .build()
                    .unwrap(),
            ])
            .build()
            .unwrap()
    }

    fn completion(message: serde_json::Value) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1_735_689_600,
            "model": "qwen3-max",
            "choices": [{"index": 0, "message": message, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        })
    }

    #[test_log::test(tokio::test)]
    async fn test_parses_tool_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "model": "qwen3-max",
                "messages": [
                    {"role": "system", "content": "You are a support agent"},
                    {"role": "user", "content": "What is the weather?"}
                ],
                "tools": [{
                    "type": "function",
                    "function": {
                        "name": "get_user_location",
                        "parameters": {"type": "object", "properties": {}}
                    }
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!({
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": "get_user_location", "arguments": "{}"}
                }]
            }))))
            .expect(1)
            .mount(&server)
            .await;

        let response = client(&server).complete(&request()).await.unwrap();

        assert_eq!(response.message(), None);
        assert_eq!(
            response.tool_calls().unwrap(),
            &[ToolCall::builder()
                .id("call_1")
                .name("get_user_location")
                .args("{}")
                .build()
                .unwrap()]
        );
        assert_eq!(response.usage.unwrap().total_tokens, 15);
    }

    #[tokio::test]
    async fn test_sends_tool_outputs_with_call_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "messages": [
                    {"role": "user", "content": "Where am I?"},
                    {
                        "role": "assistant",
                        "tool_calls": [{
                            "id": "call_1",
                            "type": "function",
                            "function": {"name": "get_user_location", "arguments": "{}"}
                        }]
                    },
                    {"role": "tool", "tool_call_id": "call_1", "content": "Hangzhou"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!({
                "role": "assistant",
                "content": "You are in Hangzhou"
            }))))
            .expect(1)
            .mount(&server)
            .await;

        let tool_call = ToolCall::builder()
            .id("call_1")
            .name("get_user_location")
            .build()
            .unwrap();
        let request = ChatCompletionRequest::builder()
            .messages(vec![
                ChatMessage::new_user("Where am I?"),
                ChatMessage::new_assistant(None, Some(vec![tool_call.clone()])),
                ChatMessage::new_tool_output(tool_call, ToolOutput::text("Hangzhou")),
            ])
            .build()
            .unwrap();

        let response = client(&server).complete(&request).await.unwrap();

        assert_eq!(response.message(), Some("You are in Hangzhou"));
        assert!(response.tool_calls().is_none());
    }

    #[tokio::test]
    async fn test_invalid_api_key_is_permanent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {
                    "message": "Incorrect API key provided",
                    "type": "invalid_request_error",
                    "param": null,
                    "code": "invalid_api_key"
                }
            })))
            .mount(&server)
            .await;

        let error = client(&server).complete(&request()).await.unwrap_err();
        assert!(matches!(error, LanguageModelError::PermanentError(_)));
    }

    #[tokio::test]
    async fn test_context_length_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "message": "This model's maximum context length is 8192 tokens",
                    "type": "invalid_request_error",
                    "param": "messages",
                    "code": "context_length_exceeded"
                }
            })))
            .mount(&server)
            .await;

        let error = client(&server).complete(&request()).await.unwrap_err();
        assert!(matches!(error, LanguageModelError::ContextLengthExceeded(_)));
    }

    #[tokio::test]
    async fn test_missing_model_is_permanent() {
        let server = MockServer::start().await;
        let client = Dashscope::builder()
            .config(DashscopeConfig::new(server.uri(), "test-key"))
            .build()
            .unwrap();

        let error = client.complete(&request()).await.unwrap_err();
        assert!(matches!(error, LanguageModelError::PermanentError(_)));
    }
}
