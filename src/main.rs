//! Terminal front end for the secretary.
//!
//! Runs one session against the in-memory backend. Type to chat, `/N` to pick
//! the N-th listed option, `/reset` to start over and `/quit` to leave.
//! An optional first argument names a TOML config file.

use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use civic_secretary::adapters::{InMemoryCivicBackend, StaticDestinationCatalog};
use civic_secretary::application::Brain;
use civic_secretary::config::AppConfig;
use civic_secretary::domain::secretary::{FlowAction, NavigationRequest, Role, ViewModel};
use civic_secretary::telemetry::init_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::load_from(Path::new(&path))?,
        None => AppConfig::load()?,
    };
    config.validate()?;
    init_tracing(&config.logging);

    let navigator = Arc::new(|request: &NavigationRequest| {
        let params: Vec<String> = request
            .params
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        println!(
            "  [navigate] {} {}{}",
            request.destination_id,
            params.join("&"),
            if request.should_close { " (closing chat)" } else { "" }
        );
    });

    let mut brain = Brain::new(navigator, config.secretary.clone())
        .with_backend(Arc::new(InMemoryCivicBackend::with_sample_data()))
        .with_destinations(Arc::new(StaticDestinationCatalog::civic_defaults()));

    let mut shown = 0;
    let mut options = render(&brain.get_view_model(), &mut shown);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "" => continue,
            "/quit" => break,
            "/reset" => {
                brain.reset();
                shown = 0;
            }
            _ => match line.strip_prefix('/').and_then(|n| n.parse::<usize>().ok()) {
                Some(n) => match n.checked_sub(1).and_then(|i| options.get(i)) {
                    Some(action) => brain.handle_action(action.clone()).await,
                    None => println!("  no option {}", n),
                },
                None => brain.handle_user_text(line).await,
            },
        }
        options = render(&brain.get_view_model(), &mut shown);
    }

    brain.close();
    Ok(())
}

/// Prints messages not yet shown plus the numbered options, and returns the
/// actions in the order they were numbered.
fn render(view: &ViewModel, shown: &mut usize) -> Vec<FlowAction> {
    for message in view.messages.iter().skip(*shown) {
        let speaker = match message.role {
            Role::User => "you",
            Role::Assistant => "secretary",
        };
        println!("{:>9}: {}", speaker, message.content);
    }
    *shown = view.messages.len();

    let entries = view
        .typeahead_options
        .iter()
        .map(|option| match &option.detail {
            Some(detail) => (format!("{} ({})", option.label, detail), &option.action),
            None => (option.label.clone(), &option.action),
        })
        .chain(view.suggestions.iter().map(|chip| (chip.label.clone(), &chip.action)))
        .chain(view.buttons.iter().map(|button| (button.label.clone(), &button.action)));

    let mut actions = Vec::new();
    for (label, action) in entries {
        actions.push(action.clone());
        println!("  /{} {}", actions.len(), label);
    }
    actions
}
