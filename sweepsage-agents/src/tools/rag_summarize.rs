use std::{borrow::Cow, sync::Arc};

use async_trait::async_trait;
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use sweepsage_core::chat_completion::{Tool, ToolOutput, ToolSpec, errors::ToolError};
use sweepsage_query::RagService;

use super::parse_args;

#[derive(Debug, Deserialize, JsonSchema)]
struct RagSummarizeArgs {
    /// The question to look up in the knowledge base
    query: String,
}

/// Answers a question from the knowledge base through the [`RagService`]
#[derive(Clone, Debug)]
pub struct RagSummarize {
    service: Arc<RagService>,
}

impl RagSummarize {
    pub fn new(service: Arc<RagService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for RagSummarize {
    async fn invoke(&self, raw_args: Option<&str>) -> Result<ToolOutput, ToolError> {
        let RagSummarizeArgs { query } = parse_args(raw_args)?;

        let answer = self
            .service
            .summarize(&query)
            .await
            .map_err(ToolError::failed)?;
        Ok(ToolOutput::text(answer))
    }

    fn name(&self) -> Cow<'_, str> {
        "rag_summarize".into()
    }

    fn tool_spec(&self) -> ToolSpec {
        ToolSpec {
            name: "rag_summarize".to_string(),
            description: "Retrieves reference material from the knowledge base about robot \
                          vacuums and mop robots, returned as a string"
                .to_string(),
            parameters_schema: Some(schema_for!(RagSummarizeArgs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweepsage_core::{
        MockSegmentGateway, MockSimplePrompt, SegmentGateway, SimplePrompt,
        chat_completion::errors::LanguageModelError,
    };

    fn service(client: MockSimplePrompt) -> Arc<RagService> {
        let mut gateway = MockSegmentGateway::new();
        gateway
            .expect_similarity_search()
            .returning(|_, _| Ok(Vec::new()));

        Arc::new(
            RagService::builder()
                .gateway(Arc::new(gateway) as Arc<dyn SegmentGateway>)
                .client(Arc::new(client) as Arc<dyn SimplePrompt>)
                .build()
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_returns_answer() {
        let mut client = MockSimplePrompt::new();
        client
            .expect_prompt()
            .returning(|_| Ok("Charge it for four hours first".to_string()));

        let output = RagSummarize::new(service(client))
            .invoke(Some(r#"{"query": "What do I do on first use?"}"#))
            .await
            .unwrap();

        assert_eq!(output, ToolOutput::text("Charge it for four hours first"));
    }

    #[tokio::test]
    async fn test_model_failure_fails_the_tool() {
        let mut client = MockSimplePrompt::new();
        client.expect_prompt().returning(|_| {
            Err(LanguageModelError::permanent(anyhow::anyhow!(
                "invalid api key"
            )))
        });

        let result = RagSummarize::new(service(client))
            .invoke(Some(r#"{"query": "anything"}"#))
            .await;

        assert!(matches!(result, Err(ToolError::ToolFailed(_))));
    }
}
