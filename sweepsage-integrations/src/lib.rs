//! Integrations with external services for sweepsage.
//!
//! Chat and embedding models are reached over their OpenAI compatible HTTP APIs, and stored
//! records can be persisted in an embedded redb database.

#[cfg(feature = "dashscope")]
pub mod dashscope;
#[cfg(feature = "ollama")]
pub mod ollama;
#[cfg(feature = "openai")]
pub mod openai;
#[cfg(feature = "redb")]
pub mod redb;
