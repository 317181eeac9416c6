//! Fixtures shared by the integration tests
#![allow(dead_code)]
use std::sync::Arc;

use sweepsage::{Config, PromptLibrary, SweepSage};
use sweepsage_core::{
    EmbeddingModel, SimplePrompt, VectorStore,
    chat_completion::ChatCompletion,
    query_traits::MockSimplePrompt,
    test_utils::{MockChatCompletion, WordHashEmbedder},
};
use sweepsage_integrations::redb::RedbVectorStore;
use temp_dir::TempDir;

pub const CONFIG: &str = r#"
[models]
chat_model_name = "qwen3-max"
embedding_model_name = "text-embedding-v4"

[store]
collection_name = "agent"
persist_directory = "store/vectors"
chunk_size = 120
chunk_overlap = 10
data_path = "data"
allow_knowledge_file_type = ["txt"]

[prompts]
main_prompt_path = "prompts/main_prompt.txt"
rag_summarize_prompt_path = "prompts/rag_summarize.txt"
report_prompt_path = "prompts/report_prompt.txt"

[agent]
external_data_path = "data/external/records.csv"
max_iterations = 6
"#;

pub const MAIN_PROMPT: &str = "You are a robot vacuum support agent";
pub const REPORT_PROMPT: &str = "Write the user's monthly usage report";

/// A project root with prompts, knowledge files and usage data
pub fn project() -> (TempDir, Config) {
    let dir = TempDir::new().unwrap();

    let prompts = dir.child("prompts");
    std::fs::create_dir_all(&prompts).unwrap();
    std::fs::write(prompts.join("main_prompt.txt"), MAIN_PROMPT).unwrap();
    std::fs::write(prompts.join("report_prompt.txt"), REPORT_PROMPT).unwrap();
    std::fs::write(
        prompts.join("rag_summarize.txt"),
        "Question: {input}\nReferences:\n{context}",
    )
    .unwrap();

    let data = dir.child("data");
    std::fs::create_dir_all(data.join("external")).unwrap();
    std::fs::write(
        data.join("brushes.txt"),
        "Remove hair from the main brush once a week.\n\nReplace the side brush every three months.",
    )
    .unwrap();
    std::fs::write(
        data.join("charging.txt"),
        "If the robot does not charge, clean the charging contacts on the dock.",
    )
    .unwrap();
    std::fs::write(
        data.join("external").join("records.csv"),
        "用户ID,清洁效率,时间\n1001,高效,2025-01\n1002,中等,2025-02\n",
    )
    .unwrap();

    let config = Config::from_toml_str(CONFIG, dir.path()).unwrap();
    (dir, config)
}

pub fn generator(answer: &'static str) -> MockSimplePrompt {
    let mut generator = MockSimplePrompt::new();
    generator
        .expect_prompt()
        .returning(move |_| Ok(answer.to_string()));
    generator
}

pub fn app(
    config: &Config,
    llm: &MockChatCompletion,
    generator: MockSimplePrompt,
    embedder: &WordHashEmbedder,
) -> SweepSage {
    let store = RedbVectorStore::builder()
        .database_path(config.resolve("store/vectors/vectors.redb"))
        .collection_name(config.store.collection_name.clone())
        .build()
        .unwrap();

    SweepSage::builder()
        .prompts(PromptLibrary::load(config).unwrap())
        .llm(Box::new(llm.clone()) as Box<dyn ChatCompletion>)
        .generator(Arc::new(generator) as Arc<dyn SimplePrompt>)
        .embedder(Arc::new(embedder.clone()) as Arc<dyn EmbeddingModel>)
        .store(Arc::new(store) as Arc<dyn VectorStore>)
        .config(config.clone())
        .build()
        .unwrap()
}
