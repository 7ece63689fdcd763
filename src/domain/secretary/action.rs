//! Inbound user actions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::civic::{CategorySuggestion, Geography, TopIssue};

use super::copy;
use super::slots::SlotName;

/// Entries on the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MenuOption {
    ReportIssue,
    FindInstance,
    CreateInstance,
    TopIssues,
    BrowseCategories,
}

impl MenuOption {
    pub const ALL: [MenuOption; 5] = [
        MenuOption::ReportIssue,
        MenuOption::FindInstance,
        MenuOption::CreateInstance,
        MenuOption::TopIssues,
        MenuOption::BrowseCategories,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::ReportIssue => copy::MENU_REPORT_ISSUE,
            Self::FindInstance => copy::MENU_FIND_INSTANCE,
            Self::CreateInstance => copy::MENU_CREATE_INSTANCE,
            Self::TopIssues => copy::MENU_TOP_ISSUES,
            Self::BrowseCategories => copy::MENU_BROWSE_CATEGORIES,
        }
    }
}

/// Something the user did: typed text or a structured selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum FlowAction {
    MenuSelected(MenuOption),
    FreeTextInput(String),
    StateSelected(Geography),
    LocationSelected {
        county: Geography,
        place: Option<Geography>,
    },
    SuggestionSelected(CategorySuggestion),
    TopIssueSelected(TopIssue),
    RepairSlot(SlotName),
    SomethingElse,
    CustomCategory,
    ReportHere,
    OpenDestination(String),
    IssuesLoaded,
    Retry,
    BackToMenu,
}

/// Payload-free discriminant used to key transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    MenuSelected,
    FreeTextInput,
    StateSelected,
    LocationSelected,
    SuggestionSelected,
    TopIssueSelected,
    RepairSlot,
    SomethingElse,
    CustomCategory,
    ReportHere,
    OpenDestination,
    IssuesLoaded,
    Retry,
    BackToMenu,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_value(self).map_err(|_| fmt::Error)?;
        f.write_str(json.as_str().unwrap_or("unknown"))
    }
}

impl FlowAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::MenuSelected(_) => ActionKind::MenuSelected,
            Self::FreeTextInput(_) => ActionKind::FreeTextInput,
            Self::StateSelected(_) => ActionKind::StateSelected,
            Self::LocationSelected { .. } => ActionKind::LocationSelected,
            Self::SuggestionSelected(_) => ActionKind::SuggestionSelected,
            Self::TopIssueSelected(_) => ActionKind::TopIssueSelected,
            Self::RepairSlot(_) => ActionKind::RepairSlot,
            Self::SomethingElse => ActionKind::SomethingElse,
            Self::CustomCategory => ActionKind::CustomCategory,
            Self::ReportHere => ActionKind::ReportHere,
            Self::OpenDestination(_) => ActionKind::OpenDestination,
            Self::IssuesLoaded => ActionKind::IssuesLoaded,
            Self::Retry => ActionKind::Retry,
            Self::BackToMenu => ActionKind::BackToMenu,
        }
    }

    /// Text echoed into the log as the user's turn, if the action is user-facing.
    pub fn echo(&self) -> Option<String> {
        match self {
            Self::MenuSelected(option) => Some(option.label().to_string()),
            Self::FreeTextInput(text) => Some(text.clone()),
            Self::StateSelected(state) => Some(state.name.clone()),
            Self::LocationSelected { county, place } => Some(match place {
                Some(place) => format!("{}, {}", place.name, county.name),
                None => county.name.clone(),
            }),
            Self::SuggestionSelected(category) => Some(category.name.clone()),
            Self::TopIssueSelected(issue) => Some(copy::endorse_label(&issue.title)),
            Self::RepairSlot(slot) => Some(format!("Change the {}", slot.label())),
            Self::SomethingElse => Some(copy::SOMETHING_ELSE.to_string()),
            Self::CustomCategory => Some(copy::OTHER_CATEGORY.to_string()),
            Self::ReportHere => Some(copy::REPORT_HERE.to_string()),
            Self::Retry => Some(copy::TRY_AGAIN.to_string()),
            Self::BackToMenu => Some(copy::BACK_TO_MENU.to_string()),
            Self::OpenDestination(_) | Self::IssuesLoaded => None,
        }
    }

    /// Free text carried by the action, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::FreeTextInput(text) => Some(text.as_str()),
            _ => None,
        }
    }
}
