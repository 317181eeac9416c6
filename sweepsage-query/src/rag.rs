use std::sync::Arc;

use anyhow::Result;
use derive_builder::Builder;
use sweepsage_core::{SegmentGateway, SimplePrompt, prompt::Template};

use crate::grounding::grounding_context;

const DEFAULT_K: usize = 3;

/// Answers a question from the segments most similar to it.
///
/// The template is rendered with `input`, the question, and `context`, the numbered references
/// built by [`grounding_context`]. The model's answer is returned as is. Failures of the model
/// call are not retried and reach the caller unchanged, so a
/// [`LanguageModelError`](sweepsage_core::chat_completion::errors::LanguageModelError) can be
/// recovered with `downcast_ref`.
#[derive(Debug, Clone, Builder)]
#[builder(
    setter(into),
    build_fn(validate = "Self::validate", error = "anyhow::Error")
)]
pub struct RagService {
    gateway: Arc<dyn SegmentGateway>,
    client: Arc<dyn SimplePrompt>,
    /// Must reference both `input` and `context`
    #[builder(default = "default_template()")]
    template: Template,
    /// Number of references retrieved per question
    #[builder(default = "DEFAULT_K")]
    k: usize,
}

/// The template used when none is configured
pub fn default_template() -> Template {
    indoc::indoc! {"
    You are a support assistant for robot vacuums and mop robots.
    Answer the question using only the references below. If they do not contain the answer,
    say that you do not know.

    Question: {{ input }}

    References:
    {{ context }}
    "}
    .into()
}

impl RagServiceBuilder {
    fn validate(&self) -> Result<()> {
        if let Some(template) = &self.template {
            for name in ["input", "context"] {
                anyhow::ensure!(
                    template.references(name),
                    "Summarize template must reference `{name}`"
                );
            }
        }
        Ok(())
    }
}

impl RagService {
    pub fn builder() -> RagServiceBuilder {
        RagServiceBuilder::default()
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Retrieves references for `query` and returns the model's answer.
    ///
    /// # Errors
    ///
    /// Fails when retrieval, rendering the template or the model call fails.
    #[tracing::instrument(skip(self), name = "rag.summarize")]
    pub async fn summarize(&self, query: &str) -> Result<String> {
        let segments = self.gateway.similarity_search(query, self.k).await?;
        tracing::debug!(references = segments.len(), "Retrieved references");

        let prompt = self
            .template
            .to_prompt()
            .with_context_value("input", query)
            .with_context_value("context", grounding_context(&segments));

        if tracing::enabled!(tracing::Level::DEBUG) {
            if let Ok(rendered) = prompt.render() {
                tracing::debug!(prompt = %rendered, "Rendered summarize prompt");
            }
        }

        let answer = self.client.prompt(prompt).await?;
        Ok(answer)
    }
}
