//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the secretary and the outside world. Adapters implement these ports.
//!
//! - `CivicBackend` - Geography, issue, proposal and task data
//! - `Navigator` - Host application page changes
//! - `DestinationResolver` - Deep links and keyword destinations

mod civic_backend;
mod destination_resolver;
mod navigator;

pub use civic_backend::{BackendError, BackendOperation, CivicBackend};
pub use destination_resolver::{DestinationResolver, NoDestinations};
pub use navigator::Navigator;
