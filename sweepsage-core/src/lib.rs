//! Core types and traits shared by every sweepsage crate.
//!
//! The data model follows a file through ingestion: a [`Document`] is loaded from disk, split into
//! [`Segment`]s and persisted as [`StoredRecord`]s. The traits at the root are the seams between
//! the pipeline and the services it talks to.
mod document;
pub mod indexing_traits;
mod metadata;
pub mod prompt;
pub mod query_traits;
pub mod type_aliases;

pub mod chat_completion;

pub use crate::document::*;
pub use crate::metadata::*;
pub use crate::type_aliases::*;

/// All traits are available from the root
pub use crate::indexing_traits::*;
pub use crate::query_traits::*;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub mod util;
