//! Text resources spoken by the secretary.
//!
//! Kept in one place so wording can change without touching flow logic.

use super::intent::Intent;
use super::matchers::normalize;
use super::slots::SlotName;

pub const WELCOME: &str =
    "Hi! I'm the secretary. I can help you report an issue, find your local instance, \
     start a new one, or browse issue categories. What would you like to do?";
pub const MENU_AGAIN: &str = "Anything else I can help with?";
pub const TEXT_PLACEHOLDER: &str = "Type a message...";

pub const MENU_REPORT_ISSUE: &str = "Report an issue";
pub const MENU_FIND_INSTANCE: &str = "Find my instance";
pub const MENU_CREATE_INSTANCE: &str = "Create an instance";
pub const MENU_TOP_ISSUES: &str = "See top issues";
pub const MENU_BROWSE_CATEGORIES: &str = "Browse categories";

pub const BACK_TO_MENU: &str = "Back to menu";
pub const SOMETHING_ELSE: &str = "Something else";
pub const OTHER_CATEGORY: &str = "Other...";
pub const REPORT_HERE: &str = "Report an issue here";
pub const REPORT_SOMETHING_NEW: &str = "Report something new";
pub const VIEW_INSTANCE: &str = "View this instance";
pub const CREATE_INSTANCE_HERE: &str = "Create an instance here";
pub const TRY_AGAIN: &str = "Try again";
pub const SHOW_MENU: &str = "Show me the options";

pub const ASK_STATE_FOR_DISCOVERY: &str = "Which state are you in?";
pub const STATE_NOT_RECOGNIZED: &str =
    "I couldn't match that to a state. Pick one from the list or type its full name.";
pub const LOCATION_NOT_RECOGNIZED: &str =
    "I couldn't match that to a county or city. Pick one from the list.";
pub const GEOGRAPHY_UNAVAILABLE: &str =
    "I'm having trouble loading locations right now. Please try again in a moment.";
pub const ASK_DESCRIPTION: &str = "Describe the issue in a sentence or two.";
pub const ASK_TOPIC: &str = "What kind of issue are you curious about?";
pub const ASK_CATEGORY: &str = "Which category fits best? Pick one below or type your own.";
pub const ASK_CUSTOM_CATEGORY: &str = "What category would you put it under?";
pub const NO_SUGGESTIONS: &str =
    "I couldn't find a matching category. Type the category you'd like to use.";
pub const CHECKING_REPORTS: &str = "Let me check what neighbors have already reported...";
pub const PICK_EXISTING_ISSUE: &str =
    "Is it one of these? Pick one to add your voice, or choose something else.";
pub const NO_EXISTING_ISSUES: &str = "Nobody has reported anything here yet. What's going on?";
pub const SUBMITTING: &str = "Submitting your report...";
pub const SUBMIT_FAILED: &str =
    "Sorry, I couldn't submit your report just now. You can try again in a moment.";
pub const TOP_ISSUES_UNAVAILABLE: &str = "No issues have been reported here yet.";
pub const CATEGORY_LIST_UNAVAILABLE: &str =
    "I couldn't find categories for that right now. Try describing it differently.";
pub const ASK_WHICH_FIELD: &str =
    "No problem. Which detail should I change: the state, county, city, description, or category?";
pub const PICK_AN_OPTION: &str = "Please pick one of the options below, or go back to the menu.";
pub const WHAT_NEXT_AFTER_CATEGORIES: &str =
    "Pick a category to report an issue in it, or go back to the menu.";

/// Phrases that abandon a slot-filling conversation.
const EXIT_PHRASES: [&str; 6] = ["menu", "main menu", "start over", "cancel", "never mind", "nevermind"];

/// Phrases that name a reporting goal without saying what is wrong.
const BARE_REPORT_PHRASES: [&str; 8] = [
    "i want to",
    "i'd like to",
    "i would like to",
    "report",
    "an issue",
    "a problem",
    "a complaint",
    "file",
];

pub fn is_exit_phrase(text: &str) -> bool {
    let normalized = normalize(text);
    EXIT_PHRASES.iter().any(|phrase| normalized == *phrase)
}

/// Returns true if a report utterance says more than "report an issue".
pub fn carries_issue_detail(text: &str) -> bool {
    let mut remainder = normalize(text);
    for phrase in BARE_REPORT_PHRASES {
        remainder = remainder.replace(phrase, " ");
    }
    remainder.split_whitespace().count() >= 2
}

pub fn intent_acknowledgement(intent: Intent) -> &'static str {
    match intent {
        Intent::ReportIssue => "I can help you report that.",
        Intent::TopIssues => "Let's look at the top issues near you.",
        Intent::FindInstance => "Let's find your local instance.",
        Intent::CreateInstance => "Great, let's set up a new instance.",
        Intent::AskCategory => "Happy to show you the issue categories.",
    }
}

pub fn completing(intent: Intent) -> &'static str {
    match intent {
        Intent::ReportIssue => "Thanks, I have everything I need. Opening the report form...",
        Intent::CreateInstance => "Thanks! Taking you to the instance setup...",
        Intent::FindInstance | Intent::TopIssues | Intent::AskCategory => "Got it.",
    }
}

pub fn use_selector(slot: SlotName) -> String {
    format!("Please choose the {} from the list so I get it exactly right.", slot.label())
}

pub fn description_too_short(min_chars: usize) -> String {
    format!("Could you tell me a bit more? At least {} characters, please.", min_chars)
}

pub fn repair_acknowledgement(slot: SlotName) -> String {
    format!("Sure, let's change the {}.", slot.label())
}

pub fn nothing_to_repair(slot: SlotName) -> String {
    format!("We haven't set the {} yet.", slot.label())
}

pub fn ask_county(state: Option<&str>) -> String {
    match state {
        Some(state) => format!("Which county in {}?", state),
        None => "Which county?".to_string(),
    }
}

pub fn ask_place(county: Option<&str>) -> String {
    match county {
        Some(county) => format!("Which city or town in {}?", county),
        None => "Which city or town?".to_string(),
    }
}

pub fn ask_state(intent: Option<Intent>) -> &'static str {
    match intent {
        Some(Intent::ReportIssue) => "Which state is the issue in?",
        Some(Intent::CreateInstance) => "Which state should the new instance cover?",
        _ => ASK_STATE_FOR_DISCOVERY,
    }
}

pub fn ask_location(state: &str) -> String {
    format!("Which county or city in {}?", state)
}

pub fn discovery_summary(label: &str) -> String {
    format!("Here's what I found for {}.", label)
}

pub fn open_tasks(count: usize) -> String {
    match count {
        0 => "There are no open tasks on its board right now.".to_string(),
        1 => "There is 1 open task on its board.".to_string(),
        n => format!("There are {} open tasks on its board.", n),
    }
}

pub fn loading_top_issues(label: &str) -> String {
    format!("Here are the top issues reported in {}:", label)
}

pub fn issue_line(title: &str, reports: u32) -> String {
    match reports {
        0 => format!("- {}", title),
        1 => format!("- {} (1 report)", title),
        n => format!("- {} ({} reports)", title, n),
    }
}

pub fn endorse_label(title: &str) -> String {
    format!("Me too: {}", title)
}

pub fn submitted(reference: &str) -> String {
    format!("Your report is in! Reference: {}. Thanks for speaking up.", reference)
}

pub fn categories_for(topic: &str) -> String {
    format!("Here are categories related to \"{}\":", topic)
}

pub fn navigating_to(destination: &str) -> String {
    format!("Taking you to {}...", destination)
}

pub fn unknown_input(last_input: Option<&str>) -> String {
    match last_input {
        Some(input) if !input.trim().is_empty() => format!(
            "Sorry, I didn't understand \"{}\". Here's what I can help with:",
            input.trim()
        ),
        _ => "Sorry, I didn't understand that. Here's what I can help with:".to_string(),
    }
}
