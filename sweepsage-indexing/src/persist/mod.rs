//! Vector stores that live inside this crate
mod memory_store;

pub use memory_store::MemoryVectorStore;
