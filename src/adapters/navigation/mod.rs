//! Navigation adapters.

mod recording;
mod static_catalog;

pub use recording::RecordingNavigator;
pub use static_catalog::{Destination, StaticDestinationCatalog};
