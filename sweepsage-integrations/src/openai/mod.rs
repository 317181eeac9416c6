//! Clients for OpenAI compatible APIs, on top of `async-openai`.
//!
//! [`GenericOpenAI`] implements [`ChatCompletion`](sweepsage_core::chat_completion::ChatCompletion),
//! [`SimplePrompt`](sweepsage_core::SimplePrompt) and
//! [`EmbeddingModel`](sweepsage_core::EmbeddingModel). Providers differ only in their
//! [`async_openai::config::Config`]: the api base and the headers sent with every request.
use std::sync::Arc;

use async_openai::error::OpenAIError;
use derive_builder::Builder;
use sweepsage_core::chat_completion::errors::LanguageModelError;

mod chat_completion;
mod embed;
mod simple_prompt;

/// Generic client for OpenAI compatible APIs
#[derive(Debug, Builder, Clone)]
#[builder(setter(into, strip_option))]
pub struct GenericOpenAI<
    C: async_openai::config::Config + Clone + std::fmt::Debug + Default + Send + Sync + 'static,
> {
    #[builder(
        default = "Arc::new(async_openai::Client::<C>::with_config(C::default()))",
        setter(custom)
    )]
    client: Arc<async_openai::Client<C>>,

    /// Default options for embedding and prompt models.
    #[builder(default)]
    pub(crate) default_options: Options,
}

/// Models used by a client
#[derive(Debug, Clone, Default, Builder)]
#[builder(setter(into, strip_option))]
pub struct Options {
    /// The default embedding model to use, if specified.
    #[builder(default)]
    pub embed_model: Option<String>,
    /// The default prompt model to use, if specified.
    #[builder(default)]
    pub prompt_model: Option<String>,
}

impl Options {
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::default()
    }
}

impl<C> GenericOpenAIBuilder<C>
where
    C: async_openai::config::Config + Clone + std::fmt::Debug + Default + Send + Sync + 'static,
{
    /// Sets the `async-openai` client, for example one with a custom http client
    pub fn client(&mut self, client: async_openai::Client<C>) -> &mut Self {
        self.client = Some(Arc::new(client));
        self
    }

    /// Uses a client for this provider config
    pub fn config(&mut self, config: C) -> &mut Self {
        self.client = Some(Arc::new(async_openai::Client::with_config(config)));
        self
    }

    /// Sets the default embedding model
    pub fn default_embed_model(&mut self, model: impl Into<String>) -> &mut Self {
        self.default_options
            .get_or_insert_with(Options::default)
            .embed_model = Some(model.into());
        self
    }

    /// Sets the default prompt model
    pub fn default_prompt_model(&mut self, model: impl Into<String>) -> &mut Self {
        self.default_options
            .get_or_insert_with(Options::default)
            .prompt_model = Some(model.into());
        self
    }
}

impl<C> GenericOpenAI<C>
where
    C: async_openai::config::Config + Clone + std::fmt::Debug + Default + Send + Sync + 'static,
{
    pub fn options(&self) -> &Options {
        &self.default_options
    }

    pub fn config(&self) -> &C {
        self.client.config()
    }

    fn prompt_model(&self) -> Result<&str, LanguageModelError> {
        self.default_options
            .prompt_model
            .as_deref()
            .ok_or_else(|| LanguageModelError::permanent(anyhow::anyhow!("Prompt model not set")))
    }

    fn embed_model(&self) -> Result<&str, LanguageModelError> {
        self.default_options
            .embed_model
            .as_deref()
            .ok_or_else(|| LanguageModelError::permanent(anyhow::anyhow!("Embed model not set")))
    }
}

/// Maps an `async-openai` failure onto the retry classes of [`LanguageModelError`].
///
/// Rate limits, server errors, failed connections and unreadable responses are transient. A
/// request that does not fit the model's context is reported as such. Anything else is permanent.
pub fn openai_error_to_language_model_error(e: OpenAIError) -> LanguageModelError {
    match e {
        OpenAIError::ApiError(api_error) => {
            let message = api_error.message.to_lowercase();
            let code = api_error.code.as_deref().unwrap_or_default();
            let kind = api_error.r#type.as_deref().unwrap_or_default();

            if code == "context_length_exceeded"
                || message.contains("maximum context length")
                || message.contains("range of input length")
            {
                LanguageModelError::context_length_exceeded(OpenAIError::ApiError(api_error))
            } else if code == "rate_limit_exceeded" || kind == "server_error" {
                tracing::warn!(?api_error, "Api error worth retrying");
                LanguageModelError::transient(OpenAIError::ApiError(api_error))
            } else {
                tracing::error!(?api_error, "Api error");
                LanguageModelError::permanent(OpenAIError::ApiError(api_error))
            }
        }
        OpenAIError::Reqwest(e) => match e.status() {
            Some(status) if status.as_u16() == 429 && !e.to_string().contains("quota") => {
                LanguageModelError::transient(e)
            }
            Some(status) if status.is_server_error() => {
                tracing::warn!(error = %e, "Server error");
                LanguageModelError::transient(e)
            }
            Some(_) => {
                tracing::error!(error = %e, "Client error");
                LanguageModelError::permanent(e)
            }
            None => {
                tracing::error!(error = %e, "Request failed");
                LanguageModelError::transient(e)
            }
        },
        e @ OpenAIError::JSONDeserialize(..) => {
            tracing::error!(error = %e, "Response could not be deserialized");
            LanguageModelError::transient(e)
        }
        e => LanguageModelError::permanent(e),
    }
}
