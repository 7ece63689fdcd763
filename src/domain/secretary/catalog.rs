//! Session cache of geography and issue data fetched from the backend.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::civic::{CategorySuggestion, GeoId, Geography, TopIssue};

/// Geography records loaded so far in this session.
///
/// Counties and places accumulate as the user picks states; lookups filter
/// by parent id so stale entries from an earlier state never leak into a
/// candidate list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeographyCatalog {
    states: Vec<Geography>,
    counties: Vec<Geography>,
    places: Vec<Geography>,
    /// States whose place list has been fetched, even if it came back empty.
    places_loaded: BTreeSet<GeoId>,
}

impl GeographyCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn states(&self) -> &[Geography] {
        &self.states
    }

    pub fn has_states(&self) -> bool {
        !self.states.is_empty()
    }

    pub fn set_states(&mut self, states: Vec<Geography>) {
        self.states = states;
    }

    /// Replaces the counties and places cached for one state.
    pub fn set_state_children(&mut self, state_id: &GeoId, counties: Vec<Geography>, places: Vec<Geography>) {
        self.set_state_counties(state_id, counties);
        self.set_state_places(state_id, places);
    }

    pub fn set_state_counties(&mut self, state_id: &GeoId, counties: Vec<Geography>) {
        self.counties.retain(|c| !c.is_within_state(state_id));
        self.counties.extend(counties);
    }

    /// Replaces the places cached for one state and marks them loaded.
    pub fn set_state_places(&mut self, state_id: &GeoId, places: Vec<Geography>) {
        self.places.retain(|p| !p.is_within_state(state_id));
        self.places.extend(places);
        self.places_loaded.insert(state_id.clone());
    }

    /// Returns true once counties for the state have been loaded.
    pub fn has_children_of(&self, state_id: &GeoId) -> bool {
        self.counties.iter().any(|c| c.is_within_state(state_id))
    }

    /// Returns true once a place list for the state has been fetched.
    pub fn has_places_of(&self, state_id: &GeoId) -> bool {
        self.places_loaded.contains(state_id)
    }

    pub fn counties_in(&self, state_id: &GeoId) -> Vec<Geography> {
        self.counties
            .iter()
            .filter(|c| c.is_within_state(state_id))
            .cloned()
            .collect()
    }

    /// Places in the state, optionally narrowed to one county.
    pub fn places_in(&self, state_id: &GeoId, county_id: Option<&GeoId>) -> Vec<Geography> {
        self.places
            .iter()
            .filter(|p| p.is_within_state(state_id))
            .filter(|p| county_id.map_or(true, |county| p.is_within_county(county)))
            .cloned()
            .collect()
    }

    pub fn county_by_id(&self, county_id: &GeoId) -> Option<&Geography> {
        self.counties.iter().find(|c| &c.id == county_id)
    }
}

/// Issue data for the location currently under discussion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueBoard {
    pub top_issues: Vec<TopIssue>,
    pub suggestions: Vec<CategorySuggestion>,
    pub open_task_count: Option<usize>,
}
