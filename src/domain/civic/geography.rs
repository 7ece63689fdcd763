//! Geography records returned by the civic backend.
//!
//! States, counties and places share one record shape. Hierarchy is carried
//! by parent ids rather than nesting so candidate lists can be filtered
//! cheaply by the caller before text matching.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend identifier for a geography record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeoId(String);

impl GeoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GeoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Level of a geography record in the state → county → place hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoLevel {
    State,
    County,
    Place,
}

/// Suffixes dropped from county names to derive a short name.
const COUNTY_SUFFIXES: [&str; 4] = [" County", " Parish", " Borough", " Census Area"];

/// A state, county or place.
///
/// `short_name` is the abbreviation for a state ("CA") and the bare name for
/// a county ("Alameda" for "Alameda County"). Places usually have none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geography {
    pub id: GeoId,
    pub level: GeoLevel,
    pub name: String,
    pub short_name: Option<String>,
    pub state_id: Option<GeoId>,
    pub county_id: Option<GeoId>,
}

impl Geography {
    /// Creates a state record with its postal abbreviation.
    pub fn state(id: impl Into<String>, name: impl Into<String>, abbreviation: impl Into<String>) -> Self {
        Self {
            id: GeoId::new(id),
            level: GeoLevel::State,
            name: name.into(),
            short_name: Some(abbreviation.into()),
            state_id: None,
            county_id: None,
        }
    }

    /// Creates a county record, deriving the short name from known suffixes.
    pub fn county(id: impl Into<String>, name: impl Into<String>, state_id: &GeoId) -> Self {
        let name = name.into();
        let short_name = COUNTY_SUFFIXES
            .iter()
            .find_map(|suffix| name.strip_suffix(suffix))
            .map(str::to_string);

        Self {
            id: GeoId::new(id),
            level: GeoLevel::County,
            name,
            short_name,
            state_id: Some(state_id.clone()),
            county_id: None,
        }
    }

    /// Creates a place record inside a county.
    pub fn place(
        id: impl Into<String>,
        name: impl Into<String>,
        state_id: &GeoId,
        county_id: &GeoId,
    ) -> Self {
        Self {
            id: GeoId::new(id),
            level: GeoLevel::Place,
            name: name.into(),
            short_name: None,
            state_id: Some(state_id.clone()),
            county_id: Some(county_id.clone()),
        }
    }

    /// Overrides the short name.
    pub fn with_short_name(mut self, short_name: impl Into<String>) -> Self {
        self.short_name = Some(short_name.into());
        self
    }

    /// Returns true if this record sits inside the given state.
    pub fn is_within_state(&self, state_id: &GeoId) -> bool {
        match self.level {
            GeoLevel::State => &self.id == state_id,
            GeoLevel::County | GeoLevel::Place => self.state_id.as_ref() == Some(state_id),
        }
    }

    /// Returns true if this record sits inside the given county.
    pub fn is_within_county(&self, county_id: &GeoId) -> bool {
        match self.level {
            GeoLevel::State => false,
            GeoLevel::County => &self.id == county_id,
            GeoLevel::Place => self.county_id.as_ref() == Some(county_id),
        }
    }
}

/// Resolved location handed to backend lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRef {
    pub state_id: GeoId,
    pub county_id: Option<GeoId>,
    pub place_id: Option<GeoId>,
    /// Human readable label, most specific first ("Oakland, Alameda County, California").
    pub label: String,
}

impl LocationRef {
    /// Builds a location from whichever geography levels are known.
    pub fn from_parts(state: &Geography, county: Option<&Geography>, place: Option<&Geography>) -> Self {
        let label = [place, county, Some(state)]
            .into_iter()
            .flatten()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            state_id: state.id.clone(),
            county_id: county.map(|c| c.id.clone()),
            place_id: place.map(|p| p.id.clone()),
            label,
        }
    }
}
