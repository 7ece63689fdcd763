//! Civic backend adapters.

mod in_memory;

pub use in_memory::InMemoryCivicBackend;
