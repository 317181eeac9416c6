//! Knowledge base ingestion for sweepsage.
//!
//! The [`IngestionPipeline`] walks a data directory and, for every file whose content has not been
//! ingested before, loads it, splits it into segments and hands those to a
//! [`SegmentGateway`](sweepsage_core::SegmentGateway). A file's [`Fingerprint`] is recorded in
//! the [`IngestionLedger`](sweepsage_core::IngestionLedger) only after its segments were stored,
//! so a run can be interrupted and repeated at any point.
//!
//! [`Fingerprint`]: sweepsage_core::Fingerprint
pub mod chunker;
pub mod gateway;
pub mod hasher;
pub mod ledger;
pub mod loaders;
pub mod persist;
mod pipeline;

pub use chunker::RecursiveCharacterSplitter;
pub use gateway::VectorGateway;
pub use ledger::FileLedger;
pub use pipeline::*;
