//! Destination Resolver Port - Maps free text onto host destinations.
//!
//! Consulted by the Brain when an utterance on the menu matches no intent:
//! first as an explicit deep link, then as keywords naming a destination.

use crate::domain::secretary::NavigationRequest;

pub trait DestinationResolver: Send + Sync {
    /// Parses text that is itself a link to a destination.
    fn parse_deep_link(&self, text: &str) -> Option<NavigationRequest>;

    /// Finds a destination named by keywords in the text.
    fn find_destination(&self, text: &str) -> Option<NavigationRequest>;
}

/// Resolver that never matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDestinations;

impl DestinationResolver for NoDestinations {
    fn parse_deep_link(&self, _text: &str) -> Option<NavigationRequest> {
        None
    }

    fn find_destination(&self, _text: &str) -> Option<NavigationRequest> {
        None
    }
}
