//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the secretary to external systems:
//! - `backend` - Civic backend implementations (in-memory)
//! - `navigation` - Navigators and destination resolvers

pub mod backend;
pub mod navigation;

pub use backend::InMemoryCivicBackend;
pub use navigation::{Destination, RecordingNavigator, StaticDestinationCatalog};
