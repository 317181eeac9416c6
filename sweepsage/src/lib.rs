//! # SweepSage
//!
//! A customer support agent for robot vacuums and mop robots, answering from a knowledge base of
//! manuals and guides.
//!
//! Knowledge files are ingested with an idempotent pipeline: a file is fingerprinted, and only
//! files whose content was never ingested before are loaded, split, embedded and stored. The
//! fingerprint is recorded after the store write succeeds, so a run can be interrupted and
//! repeated safely.
//!
//! Questions are answered by a tool-calling [`agents::Agent`]. One of its tools retrieves from
//! the knowledge base; another switches the conversation into report mode, after which every
//! model call uses the report prompt.
//!
//! The binary wires everything from `config/sweepsage.toml`:
//!
//! ```text
//! sweepsage ingest
//! sweepsage ask "How do I clean the main brush?"
//! sweepsage chat "Write my usage report for last month"
//! ```
pub mod app;
pub mod config;
pub mod logging;
pub mod prompts;

pub use app::{SweepSage, SweepSageBuilder};
pub use config::{Config, ConfigError};
pub use prompts::{PromptError, PromptLibrary};

#[doc(inline)]
pub use sweepsage_core::prompt;

/// Shared data model and the traits between the pipeline and its services
pub mod traits {
    #[doc(inline)]
    pub use sweepsage_core::indexing_traits::*;
    #[doc(inline)]
    pub use sweepsage_core::query_traits::*;
}

/// Knowledge base ingestion
pub mod indexing {
    #[doc(inline)]
    pub use sweepsage_indexing::*;
}

/// Retrieval augmented answers
pub mod query {
    #[doc(inline)]
    pub use sweepsage_query::*;
}

/// The support agent, its conversation state and tools
pub mod agents {
    #[doc(inline)]
    pub use sweepsage_agents::*;
}

/// Model providers and the persistent vector store
pub mod integrations {
    #[doc(inline)]
    pub use sweepsage_integrations::*;
}
