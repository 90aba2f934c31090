//! Storage implementations for the blob store collaborator

pub mod in_memory;

pub use in_memory::InMemoryBlobStore;
