//! Navigator Port - Host application page changes.

use crate::domain::secretary::NavigationRequest;

/// Receives requests to route the user elsewhere.
///
/// Closures taking `&NavigationRequest` implement this directly.
pub trait Navigator: Send + Sync {
    fn navigate(&self, request: &NavigationRequest);
}

impl<F> Navigator for F
where
    F: Fn(&NavigationRequest) + Send + Sync,
{
    fn navigate(&self, request: &NavigationRequest) {
        self(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn closure_is_a_navigator() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let navigator: Arc<dyn Navigator> = Arc::new(move |request: &NavigationRequest| {
            sink.lock().unwrap().push(request.destination_id.clone());
        });

        navigator.navigate(&NavigationRequest::new("instance"));
        assert_eq!(*seen.lock().unwrap(), vec!["instance".to_string()]);
    }
}
