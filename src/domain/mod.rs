//! Domain layer containing the conversation engine and civic types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared identifiers
//! - `civic` - Geography, issues, proposals and tasks exchanged with the backend
//! - `secretary` - Intents, slots, flow graph and view model of a chat session

pub mod civic;
pub mod foundation;
pub mod secretary;
