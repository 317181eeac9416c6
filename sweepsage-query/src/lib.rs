//! Retrieval augmented answers over the sweepsage knowledge base.
//!
//! A [`RagService`] retrieves the segments closest to a question, numbers them into a grounding
//! context and asks a language model to answer from that context.
mod grounding;
mod rag;

pub use grounding::grounding_context;
pub use rag::{RagService, RagServiceBuilder, default_template};
