#![allow(clippy::missing_panics_doc)]
//! Test doubles shared by the sweepsage crates
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{
    EmbeddingModel, Embeddings,
    chat_completion::{
        ChatCompletion, ChatCompletionRequest, ChatCompletionResponse, errors::LanguageModelError,
    },
};

#[macro_export]
macro_rules! user {
    ($message:expr) => {
        $crate::chat_completion::ChatMessage::User($message.to_string())
    };
}

#[macro_export]
macro_rules! assistant {
    ($message:expr) => {
        $crate::chat_completion::ChatMessage::new_assistant(Some($message.to_string()), None)
    };
}

#[macro_export]
macro_rules! tool_output {
    ($tool_name:expr, $message:expr) => {{
        $crate::chat_completion::ChatMessage::ToolOutput(
            $crate::chat_completion::ToolCall::builder()
                .name($tool_name)
                .id("1")
                .build()
                .unwrap(),
            $crate::chat_completion::ToolOutput::Text($message.to_string()),
        )
    }};
}

#[macro_export]
macro_rules! chat_response {
    ($message:expr; tool_calls = [$($tool_name:expr),*]) => {{
        let tool_calls = vec![
            $($crate::chat_completion::ToolCall::builder().name($tool_name).id("1").build().unwrap()),*
        ];

        $crate::chat_completion::ChatCompletionResponse::builder()
            .message($message)
            .tool_calls(tool_calls)
            .build()
            .unwrap()
    }};
    ($message:expr) => {{
        $crate::chat_completion::ChatCompletionResponse::builder()
            .message($message)
            .build()
            .unwrap()
    }};
}

type Responses = Arc<Mutex<Vec<Result<ChatCompletionResponse, LanguageModelError>>>>;

/// A chat completion that answers with scripted responses, in order, and records every request
/// it receives.
///
/// Panics on drop if not every scripted response was consumed.
#[derive(Clone, Default)]
pub struct MockChatCompletion {
    responses: Responses,
    received: Arc<Mutex<Vec<ChatCompletionRequest>>>,
}

impl MockChatCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_with(&self, response: ChatCompletionResponse) -> &Self {
        self.responses.lock().unwrap().insert(0, Ok(response));
        self
    }

    pub fn fail_with(&self, error: LanguageModelError) -> &Self {
        self.responses.lock().unwrap().insert(0, Err(error));
        self
    }

    /// All requests received so far
    pub fn requests(&self) -> Vec<ChatCompletionRequest> {
        self.received.lock().unwrap().clone()
    }

    /// System prompts of all requests received so far, in order
    pub fn system_prompts(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|request| request.system_prompt().unwrap_or_default().to_string())
            .collect()
    }
}

#[async_trait]
impl ChatCompletion for MockChatCompletion {
    async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, LanguageModelError> {
        self.received.lock().unwrap().push(request.clone());

        self.responses.lock().unwrap().pop().unwrap_or_else(|| {
            panic!(
                "Received completion request, but no responses are scripted\n{}",
                pretty_request(request)
            )
        })
    }
}

impl Drop for MockChatCompletion {
    fn drop(&mut self) {
        // We are still cloned, so do not check assertions yet
        if Arc::strong_count(&self.responses) > 1 || std::thread::panicking() {
            return;
        }
        let Ok(responses) = self.responses.lock() else {
            return;
        };

        if responses.is_empty() {
            tracing::debug!("[MockChatCompletion] All scripted responses were used");
        } else {
            panic!(
                "[MockChatCompletion] {} scripted responses were never requested",
                responses.len()
            );
        }
    }
}

fn pretty_request(request: &ChatCompletionRequest) -> String {
    request
        .messages()
        .iter()
        .map(|message| format!(" {message}\n"))
        .collect()
}

/// Deterministic embeddings for tests: a histogram of hashed, lowercased words.
///
/// Texts sharing words end up close to each other, which is enough to test ordering.
#[derive(Debug, Clone)]
pub struct WordHashEmbedder {
    dimensions: usize,
    calls: Arc<Mutex<usize>>,
}

impl Default for WordHashEmbedder {
    fn default() -> Self {
        Self::new(64)
    }
}

impl WordHashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Number of `embed` calls made
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimensions];
        for word in text.split_whitespace() {
            let word = word
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            if word.is_empty() {
                continue;
            }
            let bucket = word
                .bytes()
                .fold(7_usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize))
                % self.dimensions;
            vector[bucket] += 1.0;
        }
        vector
    }
}

#[async_trait]
impl EmbeddingModel for WordHashEmbedder {
    async fn embed(&self, input: Vec<String>) -> Result<Embeddings, LanguageModelError> {
        *self.calls.lock().unwrap() += 1;
        Ok(input.iter().map(|text| self.embed_one(text)).collect())
    }
}
