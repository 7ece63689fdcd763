//! Application layer - the conversation session.
//!
//! The Brain composes the secretary domain with the civic backend, the host
//! navigator and the destination resolver.

pub mod brain;

pub use brain::Brain;
