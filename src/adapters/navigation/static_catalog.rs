//! Fixed table of host destinations.
//!
//! Resolves deep links (`/tasks`, `app://tasks`) by path and plain text by
//! whole-word keywords. The first destination in table order wins.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::secretary::{
    normalize, NavigationRequest, DESTINATION_CREATE_INSTANCE, DESTINATION_INSTANCE,
    DESTINATION_REPORT_ISSUE,
};
use crate::ports::DestinationResolver;

static DEEP_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:app://|/)([a-z0-9][a-z0-9\-]*(?:/[a-z0-9\-]+)*)/?$").expect("static regex")
});

/// A page the host can open.
#[derive(Debug, Clone)]
pub struct Destination {
    pub id: String,
    /// Path without the leading slash, e.g. `tasks` or `instances/new`.
    pub path: String,
    pub keywords: Vec<String>,
    pub closes_widget: bool,
    keyword_patterns: Vec<Regex>,
}

impl Destination {
    pub fn new(id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: path.into().trim_matches('/').to_string(),
            keywords: Vec::new(),
            closes_widget: true,
            keyword_patterns: Vec::new(),
        }
    }

    pub fn with_keywords(mut self, keywords: &[&str]) -> Self {
        for keyword in keywords {
            let keyword = normalize(keyword);
            if let Ok(pattern) = Regex::new(&format!(r"\b{}\b", regex::escape(&keyword))) {
                self.keyword_patterns.push(pattern);
            }
            self.keywords.push(keyword);
        }
        self
    }

    /// Keeps the chat widget open after navigating.
    pub fn keep_open(mut self) -> Self {
        self.closes_widget = false;
        self
    }

    fn request(&self) -> NavigationRequest {
        let request = NavigationRequest::new(self.id.clone());
        if self.closes_widget {
            request.closing()
        } else {
            request
        }
    }
}

/// [`DestinationResolver`] over an ordered list of destinations.
#[derive(Debug, Clone, Default)]
pub struct StaticDestinationCatalog {
    destinations: Vec<Destination>,
}

impl StaticDestinationCatalog {
    pub fn new(destinations: Vec<Destination>) -> Self {
        Self { destinations }
    }

    /// The pages of the civic app the secretary knows how to open.
    pub fn civic_defaults() -> Self {
        Self::new(vec![
            Destination::new(DESTINATION_CREATE_INSTANCE, "instances/new"),
            Destination::new(DESTINATION_REPORT_ISSUE, "report"),
            Destination::new(DESTINATION_INSTANCE, "instance"),
            Destination::new("tasks", "tasks").with_keywords(&["task board", "my tasks", "tasks", "to do"]),
            Destination::new("governance", "governance").with_keywords(&[
                "governance",
                "voting",
                "vote",
                "proposals",
            ]),
            Destination::new("moderation", "moderation").with_keywords(&[
                "moderation",
                "moderate",
                "review queue",
            ]),
            Destination::new("profile", "profile").with_keywords(&[
                "my profile",
                "profile",
                "account",
                "settings",
            ]),
            Destination::new("help", "help")
                .with_keywords(&["help", "faq", "how does this work"])
                .keep_open(),
        ])
    }

    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }
}

impl DestinationResolver for StaticDestinationCatalog {
    fn parse_deep_link(&self, text: &str) -> Option<NavigationRequest> {
        let text = text.trim().to_lowercase();
        let captures = DEEP_LINK.captures(&text)?;
        let path = captures.get(1)?.as_str();
        self.destinations
            .iter()
            .find(|destination| destination.path == path)
            .map(Destination::request)
    }

    fn find_destination(&self, text: &str) -> Option<NavigationRequest> {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return None;
        }
        self.destinations
            .iter()
            .find(|destination| {
                destination
                    .keyword_patterns
                    .iter()
                    .any(|pattern| pattern.is_match(&normalized))
            })
            .map(Destination::request)
    }
}
