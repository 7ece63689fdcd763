//! Navigator that records requests instead of routing anywhere.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::secretary::NavigationRequest;
use crate::ports::Navigator;

/// Captures every navigation request for later inspection.
///
/// Clones share the same log, so a test can keep one handle and give the
/// other to the Brain.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    requests: Arc<Mutex<Vec<NavigationRequest>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<NavigationRequest> {
        self.lock().clone()
    }

    pub fn last(&self) -> Option<NavigationRequest> {
        self.lock().last().cloned()
    }

    pub fn count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<NavigationRequest>> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, request: &NavigationRequest) {
        tracing::debug!(destination = %request.destination_id, "navigation recorded");
        self.lock().push(request.clone());
    }
}
