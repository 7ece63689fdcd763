//! Shared domain primitives.

mod ids;

pub use ids::{ListenerId, SessionId};
