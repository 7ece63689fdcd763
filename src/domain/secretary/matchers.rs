//! Deterministic text matching against geography names.
//!
//! Matching is two-pass: the first candidate whose full name appears as a
//! substring of the normalized text wins; failing that, the first candidate
//! whose short name appears as a whole word wins. Results follow list order,
//! not specificity. Callers scope county and place candidates to the
//! already-matched state before calling in.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::civic::Geography;

use super::catalog::GeographyCatalog;

/// Prepositions that introduce a location in free text.
const LOCATION_PREPOSITIONS: &str = "in|at|near|around|by|on|from|of|outside|inside";

/// Shortest description kept after stripping location words.
pub const MIN_CLEANED_DESCRIPTION_CHARS: usize = 3;

static TERMINAL_PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?,;:]+$").expect("static regex"));

static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").expect("static regex"));

static DANGLING_PREPOSITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\s+(?:{})\s*[.!?,;:]*$", LOCATION_PREPOSITIONS)).expect("static regex")
});

static STRAY_PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+([,.;:!?])").expect("static regex"));

/// Lowercases, trims and strips terminal punctuation.
pub fn normalize(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    TERMINAL_PUNCTUATION.replace(&lowered, "").trim_end().to_string()
}

/// Abbreviations such as "CA" or "IN" only match when written in capitals,
/// so the English word "in" never resolves to Indiana.
fn is_abbreviation(short_name: &str) -> bool {
    short_name.len() <= 3 && short_name.chars().all(|c| c.is_ascii_uppercase())
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_word_edge(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

/// Byte ranges where `word` appears in `text` as a whole word.
///
/// Case folding is ASCII-only so the ranges stay valid in the original text.
fn whole_word_spans(text: &str, word: &str, case_insensitive: bool) -> Vec<(usize, usize)> {
    let len = word.len();
    let mut spans = Vec::new();
    if len == 0 {
        return spans;
    }
    let mut start = 0;
    while start + len <= text.len() {
        let end = start + len;
        if text.is_char_boundary(start) && text.is_char_boundary(end) {
            let candidate = &text[start..end];
            let same = if case_insensitive {
                candidate.eq_ignore_ascii_case(word)
            } else {
                candidate == word
            };
            if same && is_word_edge(text, start, end) {
                spans.push((start, end));
                start = end;
                continue;
            }
        }
        start += 1;
    }
    spans
}

fn matches_short_name(text: &str, short_name: &str) -> bool {
    let short_name = short_name.trim();
    if short_name.is_empty() {
        return false;
    }
    let case_insensitive = !is_abbreviation(short_name);
    !whole_word_spans(text.trim(), short_name, case_insensitive).is_empty()
}

/// Moves `start` back over a location preposition and the space after it.
fn include_leading_preposition(text: &str, start: usize) -> usize {
    let before = &text[..start];
    let trimmed = before.trim_end();
    if trimmed.len() == before.len() {
        return start;
    }
    let word_start = trimmed
        .char_indices()
        .rev()
        .find(|(_, c)| !is_word_char(*c))
        .map_or(0, |(i, c)| i + c.len_utf8());
    let word = &trimmed[word_start..];
    if LOCATION_PREPOSITIONS
        .split('|')
        .any(|preposition| preposition.eq_ignore_ascii_case(word))
    {
        word_start
    } else {
        start
    }
}

/// Removes every whole-word occurrence of `name`, with any preposition before it.
fn remove_location_name(text: &str, name: &str) -> String {
    let case_insensitive = !is_abbreviation(name);
    let mut cleaned = text.to_string();
    for (start, end) in whole_word_spans(text, name, case_insensitive).into_iter().rev() {
        let start = include_leading_preposition(&cleaned, start);
        cleaned.replace_range(start..end, "");
    }
    cleaned
}

/// Returns the first candidate named in the text.
pub fn find_geography_in_text<'a>(text: &str, candidates: &'a [Geography]) -> Option<&'a Geography> {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return None;
    }

    candidates
        .iter()
        .find(|candidate| {
            let name = candidate.name.trim().to_lowercase();
            !name.is_empty() && normalized.contains(&name)
        })
        .or_else(|| {
            candidates.iter().find(|candidate| {
                candidate
                    .short_name
                    .as_deref()
                    .is_some_and(|short| matches_short_name(text, short))
            })
        })
}

pub fn find_state_in_text<'a>(text: &str, states: &'a [Geography]) -> Option<&'a Geography> {
    find_geography_in_text(text, states)
}

pub fn find_county_in_text<'a>(text: &str, counties: &'a [Geography]) -> Option<&'a Geography> {
    find_geography_in_text(text, counties)
}

pub fn find_place_in_text<'a>(text: &str, places: &'a [Geography]) -> Option<&'a Geography> {
    find_geography_in_text(text, places)
}

/// Most specific geography tuple found in a piece of text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeographyMatch {
    pub state: Option<Geography>,
    pub county: Option<Geography>,
    pub place: Option<Geography>,
}

impl GeographyMatch {
    pub fn is_empty(&self) -> bool {
        self.state.is_none() && self.county.is_none() && self.place.is_none()
    }

    fn matched(&self) -> impl Iterator<Item = &Geography> {
        [&self.state, &self.county, &self.place].into_iter().flatten()
    }
}

/// Matches state, then county and place within that state.
///
/// A place match without a county match pulls in the place's county from the
/// catalog so the tuple stays consistent.
pub fn extract_geography_from_text(text: &str, catalog: &GeographyCatalog) -> GeographyMatch {
    let Some(state) = find_state_in_text(text, catalog.states()).cloned() else {
        return GeographyMatch::default();
    };

    let counties = catalog.counties_in(&state.id);
    let mut county = find_county_in_text(text, &counties).cloned();

    let places = catalog.places_in(&state.id, county.as_ref().map(|c| &c.id));
    let place = find_place_in_text(text, &places).cloned();

    if county.is_none() {
        county = place
            .as_ref()
            .and_then(|p| p.county_id.as_ref())
            .and_then(|county_id| catalog.county_by_id(county_id))
            .cloned();
    }

    GeographyMatch {
        state: Some(state),
        county,
        place,
    }
}

/// Derives an issue description by removing matched geography.
///
/// Each matched name (and a location preposition directly before it) is
/// removed. Falls back to the trimmed original when less than
/// [`MIN_CLEANED_DESCRIPTION_CHARS`] characters survive.
pub fn clean_issue_description(text: &str, matched: &GeographyMatch) -> String {
    let original = text.trim();
    let mut cleaned = original.to_string();

    for geography in matched.matched() {
        let names = std::iter::once(geography.name.as_str()).chain(geography.short_name.as_deref());
        for name in names {
            cleaned = remove_location_name(&cleaned, name);
        }
    }

    let cleaned = MULTI_SPACE.replace_all(&cleaned, " ");
    let cleaned = STRAY_PUNCTUATION.replace_all(&cleaned, "$1");
    let cleaned = DANGLING_PREPOSITION.replace(&cleaned, "");
    let cleaned = cleaned
        .trim()
        .trim_matches(|c: char| c == ',' || c == ';' || c == ':')
        .trim()
        .to_string();

    if cleaned.chars().count() < MIN_CLEANED_DESCRIPTION_CHARS {
        original.to_string()
    } else {
        cleaned
    }
}
