//! Builds the pipeline, rag service and agent from a [`Config`].
use std::sync::Arc;

use anyhow::{Context as _, Result};
use derive_builder::Builder;
use sweepsage_agents::{
    Agent,
    tools::{ExternalDataCache, support_tools},
};
use sweepsage_core::{
    EmbeddingModel, IngestionLedger, SegmentGateway, SimplePrompt, VectorStore,
    chat_completion::ChatCompletion,
};
use sweepsage_indexing::{FileLedger, IngestionPipeline, RecursiveCharacterSplitter, VectorGateway};
use sweepsage_integrations::{
    dashscope::{Dashscope, DashscopeConfig},
    ollama::{Ollama, OllamaConfig},
    redb::RedbVectorStore,
};
use sweepsage_query::RagService;

use crate::{
    config::{Config, EmbeddingProvider},
    prompts::PromptLibrary,
};

const VECTOR_DATABASE_FILE: &str = "vectors.redb";

/// Every long lived service the commands share.
///
/// [`SweepSage::from_config`] connects the real model providers and the redb store; tests set
/// the services directly through the builder.
#[derive(Clone, Builder)]
#[builder(setter(into), build_fn(error = "anyhow::Error"))]
pub struct SweepSage {
    config: Config,
    prompts: PromptLibrary,
    /// Chat model used by the agent loop
    llm: Box<dyn ChatCompletion>,
    /// Generation model used for rag answers
    generator: Arc<dyn SimplePrompt>,
    embedder: Arc<dyn EmbeddingModel>,
    store: Arc<dyn VectorStore>,
}

impl std::fmt::Debug for SweepSage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweepSage")
            .field("root", &self.config.root())
            .field("store", &self.store)
            .finish()
    }
}

impl SweepSage {
    pub fn builder() -> SweepSageBuilder {
        SweepSageBuilder::default()
    }

    /// Loads the prompts and connects the configured providers.
    ///
    /// # Errors
    ///
    /// Fails if a prompt cannot be loaded, a client cannot be built or the vector database
    /// cannot be opened.
    pub fn from_config(config: Config) -> Result<Self> {
        let prompts = PromptLibrary::load(&config)?;
        let models = &config.models;

        let dashscope_config = models
            .dashscope_api_base
            .as_deref()
            .map(DashscopeConfig::with_api_base)
            .unwrap_or_default();
        if !dashscope_config.has_api_key() {
            tracing::warn!("DASHSCOPE_API_KEY is not set, model requests will be rejected");
        }

        let dashscope = Dashscope::builder()
            .config(dashscope_config)
            .default_prompt_model(&models.chat_model_name)
            .default_embed_model(&models.embedding_model_name)
            .build()?;

        let embedder: Arc<dyn EmbeddingModel> = match models.embedding_provider {
            EmbeddingProvider::Dashscope => Arc::new(dashscope.clone()),
            EmbeddingProvider::Ollama => {
                let ollama_config = models
                    .ollama_api_base
                    .as_deref()
                    .map(OllamaConfig::with_api_base)
                    .unwrap_or_default();
                Arc::new(
                    Ollama::builder()
                        .config(ollama_config)
                        .default_embed_model(models.active_embedding_model())
                        .build()?,
                )
            }
        };
        tracing::info!(
            provider = %models.embedding_provider,
            model = models.active_embedding_model(),
            "Using embedding model"
        );

        let store = RedbVectorStore::builder()
            .database_path(
                config
                    .resolve(&config.store.persist_directory)
                    .join(VECTOR_DATABASE_FILE),
            )
            .collection_name(config.store.collection_name.clone())
            .build()
            .context("Failed to open the vector database")?;

        Self::builder()
            .prompts(prompts)
            .llm(Box::new(dashscope.clone()) as Box<dyn ChatCompletion>)
            .generator(Arc::new(dashscope) as Arc<dyn SimplePrompt>)
            .embedder(embedder)
            .store(Arc::new(store) as Arc<dyn VectorStore>)
            .config(config)
            .build()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn prompts(&self) -> &PromptLibrary {
        &self.prompts
    }

    pub fn gateway(&self) -> Result<VectorGateway> {
        VectorGateway::builder()
            .embedder(self.embedder.clone())
            .store(self.store.clone())
            .batch_size(self.config.store.embed_batch_size)
            .build()
    }

    /// The ingestion pipeline over the configured data directory
    ///
    /// # Errors
    ///
    /// Fails on invalid chunking settings.
    pub fn ingestion_pipeline(&self) -> Result<IngestionPipeline> {
        let store = &self.config.store;
        let chunker = RecursiveCharacterSplitter::new(
            store.chunk_size,
            store.chunk_overlap,
            store.separators.clone(),
        )
        .context("Invalid chunking settings")?;

        let ledger: Arc<dyn IngestionLedger> =
            Arc::new(FileLedger::new(self.config.resolve(&store.ledger_path)));
        let gateway: Arc<dyn SegmentGateway> = Arc::new(self.gateway()?);

        IngestionPipeline::builder()
            .data_dir(self.config.resolve(&store.data_path))
            .allowed_extensions(store.allow_knowledge_file_type.clone())
            .ledger(ledger)
            .chunker(chunker)
            .gateway(gateway)
            .build()
    }

    pub fn rag_service(&self) -> Result<RagService> {
        let gateway: Arc<dyn SegmentGateway> = Arc::new(self.gateway()?);

        RagService::builder()
            .gateway(gateway)
            .client(self.generator.clone())
            .template(self.prompts.rag_summarize().clone())
            .k(self.config.store.k)
            .build()
    }

    /// The support agent with its full tool set.
    ///
    /// The external usage data is read here, once, and shared by every conversation.
    ///
    /// # Errors
    ///
    /// Fails if the external data csv cannot be loaded.
    pub fn agent(&self) -> Result<Agent> {
        let external_data_path = self.config.resolve(&self.config.agent.external_data_path);
        let external_data = ExternalDataCache::load(&external_data_path)?;

        let tools = support_tools(Arc::new(self.rag_service()?), Arc::new(external_data));

        Agent::builder()
            .llm(self.llm.clone())
            .tools(tools)
            .prompts(self.prompts.prompt_set())
            .max_iterations(self.config.agent.max_iterations)
            .build()
    }
}
