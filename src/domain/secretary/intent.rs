//! Keyword intent classification.
//!
//! An utterance is mapped onto a closed set of intents by an ordered rule
//! list. Rules are tried top to bottom and the first hit wins, so the more
//! specific "top issues" phrasing sits above the broad "report" rule that
//! would otherwise swallow it. Reordering [`INTENT_RULES`] changes outcomes.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::matchers::normalize;

/// A closed, named user goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    TopIssues,
    ReportIssue,
    FindInstance,
    CreateInstance,
    AskCategory,
}

impl Intent {
    pub const ALL: [Intent; 5] = [
        Intent::TopIssues,
        Intent::ReportIssue,
        Intent::FindInstance,
        Intent::CreateInstance,
        Intent::AskCategory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopIssues => "top_issues",
            Self::ReportIssue => "report_issue",
            Self::FindInstance => "find_instance",
            Self::CreateInstance => "create_instance",
            Self::AskCategory => "ask_category",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classification rule: the intent and the patterns that select it.
///
/// Patterns are regular expressions applied to normalized (lowercase) text.
#[derive(Debug, Clone, Copy)]
pub struct IntentRule {
    pub intent: Intent,
    pub patterns: &'static [&'static str],
}

/// Classification rules in priority order.
pub static INTENT_RULES: &[IntentRule] = &[
    IntentRule {
        intent: Intent::TopIssues,
        patterns: &[
            r"\btop (?:issues?|problems?|concerns?|complaints?)",
            r"\b(?:biggest|main|common|popular) (?:issues?|problems?|concerns?)",
            r"\bmost (?:reported|common)",
            r"\bwhat(?:'s| is| are) (?:the )?(?:issues|problems)\b",
            r"\btrending\b",
        ],
    },
    IntentRule {
        intent: Intent::ReportIssue,
        patterns: &[
            r"\breport",
            r"\bcomplain",
            r"\bbroke",
            r"\bfix",
            r"\bissue",
            r"\bproblem",
            r"\bpothole",
            r"\bnot working\b",
            r"\bdamaged?\b",
            r"\bleak",
        ],
    },
    IntentRule {
        intent: Intent::FindInstance,
        patterns: &[
            r"\bfind",
            r"\bsearch",
            r"\bdiscover",
            r"\bexplor",
            r"\blook ?up\b",
            r"\blocate\b",
            r"\bwhere is\b",
        ],
    },
    IntentRule {
        intent: Intent::CreateInstance,
        patterns: &[
            r"\bcreat",
            r"\bnew instance\b",
            r"\bstart (?:a |an )?(?:new )?(?:whisper|instance)\b",
            r"\bset up\b",
            r"\blaunch",
        ],
    },
    IntentRule {
        intent: Intent::AskCategory,
        patterns: &[r"\bcategor", r"\bclassif", r"\btopics?\b", r"\bbrowse\b"],
    },
];

struct CompiledRule {
    intent: Intent,
    patterns: Vec<Regex>,
}

static COMPILED_RULES: Lazy<Vec<CompiledRule>> = Lazy::new(|| {
    INTENT_RULES
        .iter()
        .map(|rule| CompiledRule {
            intent: rule.intent,
            patterns: rule
                .patterns
                .iter()
                .filter_map(|pattern| Regex::new(pattern).ok())
                .collect(),
        })
        .collect()
});

/// Maps an utterance to an intent, or `None` when no rule fires.
pub fn classify_intent(text: &str) -> Option<Intent> {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return None;
    }

    COMPILED_RULES
        .iter()
        .find(|rule| rule.patterns.iter().any(|re| re.is_match(&normalized)))
        .map(|rule| rule.intent)
}
