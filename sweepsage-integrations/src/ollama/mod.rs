//! Ollama, through its OpenAI compatible api. Used for local embeddings.
use reqwest::header::HeaderMap;
use secrecy::SecretString;

use crate::openai;

pub const OLLAMA_API_BASE: &str = "http://localhost:11434/v1";

/// Under the hood this uses the Ollama openai mapping, so some features might not work as
/// expected.
pub type Ollama = openai::GenericOpenAI<OllamaConfig>;
pub type OllamaBuilder = openai::GenericOpenAIBuilder<OllamaConfig>;

impl Ollama {
    pub fn builder() -> OllamaBuilder {
        OllamaBuilder::default()
    }
}

#[derive(Clone, Debug)]
pub struct OllamaConfig {
    api_base: String,
    /// Always empty
    api_key: SecretString,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self::with_api_base(OLLAMA_API_BASE)
    }
}

impl OllamaConfig {
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            api_key: SecretString::from(String::new()),
        }
    }
}

impl async_openai::config::Config for OllamaConfig {
    /// Ollama needs no authorization
    fn headers(&self) -> HeaderMap {
        HeaderMap::new()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base.trim_end_matches('/'))
    }

    fn api_base(&self) -> &str {
        &self.api_base
    }

    fn api_key(&self) -> &SecretString {
        &self.api_key
    }

    fn query(&self) -> Vec<(&str, &str)> {
        vec![]
    }
}
