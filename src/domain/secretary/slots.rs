//! Slot store for intent-driven conversations.
//!
//! Holds the geography and free-text values an intent needs before it can
//! complete. Geography slots form a small dependency chain
//! (state → county → place); changing or clearing a parent always clears
//! its descendants so a county can never outlive the state it belongs to.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::civic::Geography;

/// Named piece of information an intent may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotName {
    State,
    County,
    Place,
    IssueDescription,
    IssueCategory,
}

impl SlotName {
    pub const ALL: [SlotName; 5] = [
        SlotName::State,
        SlotName::County,
        SlotName::Place,
        SlotName::IssueDescription,
        SlotName::IssueCategory,
    ];

    /// Returns true for slots filled only through structured selection.
    pub fn is_geography(&self) -> bool {
        matches!(self, Self::State | Self::County | Self::Place)
    }

    /// Slots that lose their meaning when this one changes.
    pub fn dependents(&self) -> &'static [SlotName] {
        match self {
            Self::State => &[SlotName::County, SlotName::Place],
            Self::County => &[SlotName::Place],
            Self::Place | Self::IssueDescription | Self::IssueCategory => &[],
        }
    }

    /// Parent slot whose value scopes this one, if any.
    pub fn parent(&self) -> Option<SlotName> {
        match self {
            Self::County => Some(Self::State),
            Self::Place => Some(Self::County),
            Self::State | Self::IssueDescription | Self::IssueCategory => None,
        }
    }

    /// Short user-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::State => "state",
            Self::County => "county",
            Self::Place => "city or town",
            Self::IssueDescription => "description",
            Self::IssueCategory => "category",
        }
    }
}

impl fmt::Display for SlotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Value carried by a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SlotValue {
    Geography(Geography),
    Text(String),
}

/// Typed key/value bag for intent slots.
///
/// All operations are total. A value of the wrong shape for a slot is
/// ignored and reported through the boolean returned by [`SlotStore::set`].
/// A county or place may be stored before its state, but it only reads as
/// filled once a state is present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotStore {
    state: Option<Geography>,
    county: Option<Geography>,
    place: Option<Geography>,
    issue_description: String,
    issue_category: String,
}

impl SlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the slot's value, or `None` when unfilled.
    pub fn get(&self, slot: SlotName) -> Option<SlotValue> {
        if !self.is_filled(slot) {
            return None;
        }
        match slot {
            SlotName::State => self.state.clone().map(SlotValue::Geography),
            SlotName::County => self.county.clone().map(SlotValue::Geography),
            SlotName::Place => self.place.clone().map(SlotValue::Geography),
            SlotName::IssueDescription => Some(SlotValue::Text(self.issue_description.clone())),
            SlotName::IssueCategory => Some(SlotValue::Text(self.issue_category.clone())),
        }
    }

    /// Stores a value. Returns false if the value was rejected.
    pub fn set(&mut self, slot: SlotName, value: SlotValue) -> bool {
        match (slot, value) {
            (SlotName::State, SlotValue::Geography(geo)) => {
                self.state = Some(geo);
                true
            }
            (SlotName::County, SlotValue::Geography(geo)) => {
                self.county = Some(geo);
                true
            }
            (SlotName::Place, SlotValue::Geography(geo)) => {
                self.place = Some(geo);
                true
            }
            (SlotName::IssueDescription, SlotValue::Text(text)) => {
                self.issue_description = text;
                true
            }
            (SlotName::IssueCategory, SlotValue::Text(text)) => {
                self.issue_category = text;
                true
            }
            _ => false,
        }
    }

    /// Clears a slot together with everything that depends on it.
    pub fn clear(&mut self, slot: SlotName) {
        match slot {
            SlotName::State => self.state = None,
            SlotName::County => self.county = None,
            SlotName::Place => self.place = None,
            SlotName::IssueDescription => self.issue_description.clear(),
            SlotName::IssueCategory => self.issue_category.clear(),
        }
        self.clear_dependents(slot);
    }

    /// Clears the slots downstream of `changed`, leaving `changed` itself intact.
    pub fn clear_dependents(&mut self, changed: SlotName) {
        for dependent in changed.dependents() {
            match dependent {
                SlotName::County => self.county = None,
                SlotName::Place => self.place = None,
                _ => {}
            }
        }
    }

    /// Clears the geography below `changed` that lies outside its new value.
    pub fn clear_mismatched_dependents(&mut self, changed: SlotName) {
        match changed {
            SlotName::State => {
                let Some(state_id) = self.state.as_ref().map(|state| state.id.clone()) else {
                    return;
                };
                if self.county.as_ref().is_some_and(|county| !county.is_within_state(&state_id)) {
                    self.county = None;
                }
                if self.place.as_ref().is_some_and(|place| !place.is_within_state(&state_id)) {
                    self.place = None;
                }
            }
            SlotName::County => {
                let Some(county_id) = self.county.as_ref().map(|county| county.id.clone()) else {
                    return;
                };
                if self.place.as_ref().is_some_and(|place| !place.is_within_county(&county_id)) {
                    self.place = None;
                }
            }
            SlotName::Place | SlotName::IssueDescription | SlotName::IssueCategory => {}
        }
    }

    /// Empty or whitespace-only text and absent geography count as unfilled.
    pub fn is_filled(&self, slot: SlotName) -> bool {
        match slot {
            SlotName::State => self.state.is_some(),
            SlotName::County => self.state.is_some() && self.county.is_some(),
            SlotName::Place => self.state.is_some() && self.place.is_some(),
            SlotName::IssueDescription => !self.issue_description.trim().is_empty(),
            SlotName::IssueCategory => !self.issue_category.trim().is_empty(),
        }
    }

    /// Returns true if any slot holds a value.
    pub fn any_filled(&self) -> bool {
        SlotName::ALL.iter().any(|slot| self.is_filled(*slot))
    }

    pub fn state(&self) -> Option<&Geography> {
        self.state.as_ref()
    }

    pub fn county(&self) -> Option<&Geography> {
        self.county.as_ref().filter(|_| self.state.is_some())
    }

    pub fn place(&self) -> Option<&Geography> {
        self.place.as_ref().filter(|_| self.state.is_some())
    }

    pub fn issue_description(&self) -> Option<&str> {
        Some(self.issue_description.trim()).filter(|s| !s.is_empty())
    }

    pub fn issue_category(&self) -> Option<&str> {
        Some(self.issue_category.trim()).filter(|s| !s.is_empty())
    }
}
