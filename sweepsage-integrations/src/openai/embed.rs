use async_openai::types::CreateEmbeddingRequestArgs;
use async_trait::async_trait;
use sweepsage_core::{EmbeddingModel, Embeddings, chat_completion::errors::LanguageModelError};

use super::{GenericOpenAI, openai_error_to_language_model_error};

#[async_trait]
impl<C> EmbeddingModel for GenericOpenAI<C>
where
    C: async_openai::config::Config + Clone + std::fmt::Debug + Default + Send + Sync + 'static,
{
    #[tracing::instrument(skip_all, fields(num_texts = input.len()))]
    async fn embed(&self, input: Vec<String>) -> Result<Embeddings, LanguageModelError> {
        if input.is_empty() {
            return Ok(Vec::new());
        }
        let expected = input.len();

        let request = CreateEmbeddingRequestArgs::default()
            .model(self.embed_model()?)
            .input(input)
            .build()
            .map_err(openai_error_to_language_model_error)?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(openai_error_to_language_model_error)?;

        if response.data.len() != expected {
            return Err(LanguageModelError::permanent(anyhow::anyhow!(
                "Expected {expected} embeddings, received {}",
                response.data.len()
            )));
        }

        let mut data = response.data;
        data.sort_by_key(|d| d.index);
        tracing::debug!(num_embeddings = data.len(), "Received embeddings");

        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}
