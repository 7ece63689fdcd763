//! Mid-conversation corrections ("repair").
//!
//! Detects utterances that correct an earlier answer and works out which
//! slot they target. Slot inference is keyword based and refuses to guess:
//! when zero or several slots are named the result is `None` and the caller
//! asks the user which field to change.

use once_cell::sync::Lazy;
use regex::Regex;

use super::matchers::normalize;
use super::slots::{SlotName, SlotStore, SlotValue};

/// Phrases that mark an utterance as a correction.
pub const REPAIR_CUES: [&str; 8] = [
    "actually",
    "sorry",
    "i meant",
    "no wait",
    "change",
    "instead",
    "rather",
    "correction",
];

/// Keywords naming each slot, most specific slot first.
const SLOT_KEYWORDS: [(SlotName, &[&str]); 5] = [
    (SlotName::Place, &["city", "town", "place", "village"]),
    (SlotName::County, &["county", "parish", "borough"]),
    (SlotName::State, &["state"]),
    (SlotName::IssueDescription, &["description", "describe", "details", "wording"]),
    (SlotName::IssueCategory, &["category", "categories", "type of issue"]),
];

static CUE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    REPAIR_CUES
        .iter()
        .filter_map(|cue| Regex::new(&format!(r"\b{}", regex::escape(cue))).ok())
        .collect()
});

static SLOT_PATTERNS: Lazy<Vec<(SlotName, Regex)>> = Lazy::new(|| {
    SLOT_KEYWORDS
        .iter()
        .filter_map(|(slot, keywords)| {
            let alternation = keywords
                .iter()
                .map(|k| regex::escape(k))
                .collect::<Vec<_>>()
                .join("|");
            Regex::new(&format!(r"\b(?:{})\b", alternation))
                .ok()
                .map(|re| (*slot, re))
        })
        .collect()
});

/// Returns true if the text starts with or contains a correction cue.
///
/// Cues match at a word start, so "exchange" is not read as "change".
pub fn looks_like_repair(text: &str) -> bool {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return false;
    }
    REPAIR_CUES.iter().any(|cue| normalized.starts_with(cue))
        || CUE_PATTERNS.iter().any(|re| re.is_match(&normalized))
}

/// Best-effort guess at the slot a correction targets.
///
/// Returns `None` when no slot keyword appears or when keywords for more
/// than one slot appear.
pub fn parse_repair_slot(text: &str) -> Option<SlotName> {
    let normalized = normalize(text);
    let mut named = SLOT_PATTERNS
        .iter()
        .filter(|(_, re)| re.is_match(&normalized))
        .map(|(slot, _)| *slot);

    let first = named.next()?;
    if named.next().is_some() {
        return None;
    }
    Some(first)
}

/// Sets a slot to its corrected value and clears everything depending on it.
///
/// Returns false if the store rejected the value.
pub fn apply_repair(slots: &mut SlotStore, slot: SlotName, value: SlotValue) -> bool {
    if !slots.set(slot, value) {
        return false;
    }
    slots.clear_dependents(slot);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::civic::{GeoId, Geography};

    mod detection {
        use super::*;

        #[test]
        fn detects_leading_cue() {
            assert!(looks_like_repair("Actually, it's in Texas"));
            assert!(looks_like_repair("sorry I typed that wrong"));
            assert!(looks_like_repair("No wait, the other county"));
        }

        #[test]
        fn detects_embedded_cue() {
            assert!(looks_like_repair("can we change the county"));
            assert!(looks_like_repair("use Travis instead"));
            assert!(looks_like_repair("what I meant was Oakland"));
        }

        #[test]
        fn ignores_cue_inside_another_word() {
            assert!(!looks_like_repair("the currency exchange is closed"));
        }

        #[test]
        fn plain_answer_is_not_repair() {
            assert!(!looks_like_repair("the streetlight on 5th is out"));
            assert!(!looks_like_repair(""));
        }
    }

    mod slot_inference {
        use super::*;

        #[test]
        fn names_each_slot() {
            assert_eq!(parse_repair_slot("change the state"), Some(SlotName::State));
            assert_eq!(parse_repair_slot("actually wrong county"), Some(SlotName::County));
            assert_eq!(parse_repair_slot("i meant a different city"), Some(SlotName::Place));
            assert_eq!(
                parse_repair_slot("let me fix the description"),
                Some(SlotName::IssueDescription)
            );
            assert_eq!(parse_repair_slot("change category"), Some(SlotName::IssueCategory));
        }

        #[test]
        fn statement_is_not_state() {
            assert_eq!(parse_repair_slot("correction to my statement"), None);
        }

        #[test]
        fn several_slots_are_ambiguous() {
            assert_eq!(parse_repair_slot("change the state and county"), None);
        }

        #[test]
        fn no_slot_keyword_is_ambiguous() {
            assert_eq!(parse_repair_slot("actually, sorry"), None);
        }
    }

    mod applying {
        use super::*;

        #[test]
        fn new_state_clears_county_and_place() {
            let ca = Geography::state("06", "California", "CA");
            let tx = Geography::state("48", "Texas", "TX");
            let alameda = Geography::county("06001", "Alameda County", &ca.id);
            let oakland = Geography::place("0653000", "Oakland", &ca.id, &alameda.id);

            let mut slots = SlotStore::new();
            slots.set(SlotName::State, SlotValue::Geography(ca));
            slots.set(SlotName::County, SlotValue::Geography(alameda));
            slots.set(SlotName::Place, SlotValue::Geography(oakland));

            assert!(apply_repair(&mut slots, SlotName::State, SlotValue::Geography(tx.clone())));
            assert_eq!(slots.state(), Some(&tx));
            assert!(slots.county().is_none());
            assert!(slots.place().is_none());
        }

        #[test]
        fn text_repair_keeps_geography() {
            let ca = Geography::state("06", "California", "CA");
            let county = Geography::county("06001", "Alameda County", &GeoId::new("06"));
            let mut slots = SlotStore::new();
            slots.set(SlotName::State, SlotValue::Geography(ca));
            slots.set(SlotName::County, SlotValue::Geography(county));
            slots.set(SlotName::IssueDescription, SlotValue::Text("old".into()));

            assert!(apply_repair(
                &mut slots,
                SlotName::IssueDescription,
                SlotValue::Text("new".into())
            ));
            assert_eq!(slots.issue_description(), Some("new"));
            assert!(slots.county().is_some());
        }

        #[test]
        fn rejected_value_changes_nothing() {
            let mut slots = SlotStore::new();
            assert!(!apply_repair(&mut slots, SlotName::County, SlotValue::Text("x".into())));
            assert!(!slots.any_filled());
        }
    }
}
