//! CLI interface for Wayfarer.
//!
//! Each subcommand is non-interactive: arguments in, text or JSON out.
//! Journals are addressed with `--journal`, taking a full UUID or an
//! unambiguous prefix.
//!
//! Journals belong to the user who was logged in when they were created.
//! Only the owner may change a journal; others may read it once it is
//! public. Any command that changes journals re-evaluates the owner's
//! achievements afterwards.

mod account;
mod entry;
mod format;
mod journal;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::achievements::{AchievementTracker, Evaluator};
use crate::model::Journal;
use crate::{browse, cities, config::Config, storage::Storage};

use account::AccountCommand;
use entry::EntryCommand;
use journal::JournalCommand;

/// Wayfarer: keep a journal of where you've been.
#[derive(Debug, Parser)]
#[command(name = "wayfarer", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r#"Workflow: journaling a trip
  1. wayfarer account register ada --name "Ada" --password hunter22
  2. wayfarer journal new "Spring in Paris" --city Paris --public
     → prints a journal ID (e.g. a3b0fc12-...)
  3. wayfarer entry photo --journal a3b eiffel.jpg --caption "Sunset at Eiffel"
  4. wayfarer entry itinerary --journal a3b --date 03/14/2024 \
       --activity "10:00|Museum|Louvre" --activity "|Dinner"
  5. wayfarer journal show --journal a3b
  6. wayfarer achievements"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage journals: create, list, show, delete, pin, publish.
    Journal {
        #[command(subcommand)]
        command: JournalCommand,
    },

    /// Add or remove journal entries: photos, notes, itineraries.
    Entry {
        #[command(subcommand)]
        command: EntryCommand,
    },

    /// Manage your local account and session.
    Account {
        #[command(subcommand)]
        command: AccountCommand,
    },

    /// Show achievement progress.
    Achievements {
        /// Print states as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Public journals from other users, newest first.
    Feed,

    /// Search journals by title, description, city, or country.
    Search {
        /// Text to look for (case-insensitive).
        query: String,
    },

    /// List known destinations.
    Cities {
        /// Only cities in this country.
        #[arg(long)]
        country: Option<String>,
    },
}

/// Run the CLI, returning an error message on failure.
pub fn run(config: &Config, storage: &Storage) -> Result<(), String> {
    let cli = Cli::parse();

    match cli.command {
        Command::Journal { command } => journal::run(config, storage, command),
        Command::Entry { command } => entry::run(config, storage, command),
        Command::Account { command } => account::run(storage, command),
        Command::Achievements { json } => cmd_achievements(config, storage, json),
        Command::Feed => cmd_feed(storage),
        Command::Search { query } => cmd_search(storage, &query),
        Command::Cities { country } => {
            cmd_cities(country.as_deref());
            Ok(())
        }
    }
}

fn cmd_achievements(config: &Config, storage: &Storage, json: bool) -> Result<(), String> {
    let viewer = account::current_username(storage)?;
    let tracker = load_tracker(config, storage, viewer.as_deref())?;

    if json {
        let json = serde_json::to_string_pretty(tracker.states())
            .map_err(|e| format!("failed to serialize achievements: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    let mut category = None;
    for (def, state) in tracker.progress() {
        if category != Some(def.category) {
            if category.is_some() {
                println!();
            }
            println!("{}", def.category.label());
            category = Some(def.category);
        }
        println!("  {}", format::format_achievement(def, &state));
    }
    Ok(())
}

fn cmd_feed(storage: &Storage) -> Result<(), String> {
    let journals = list_journals(storage)?;
    let viewer = account::current_username(storage)?;

    let feed = browse::feed(&journals, viewer.as_deref());
    if feed.is_empty() {
        println!("Nothing in your feed yet");
        return Ok(());
    }
    for journal in feed {
        println!("{}", format::format_journal_line(journal));
    }
    Ok(())
}

fn cmd_search(storage: &Storage, query: &str) -> Result<(), String> {
    let viewer = account::current_username(storage)?;
    let journals: Vec<Journal> = list_journals(storage)?
        .into_iter()
        .filter(|j| can_view(j, viewer.as_deref()))
        .collect();

    let found = browse::search(&journals, query);
    if found.is_empty() {
        println!("No journals found");
        return Ok(());
    }
    for journal in found {
        println!("{}", format::format_journal_line(journal));
    }
    Ok(())
}

fn cmd_cities(country: Option<&str>) {
    match country {
        Some(country) => {
            for city in cities::in_country(country) {
                println!("{}", city.label);
            }
        }
        None => {
            for country in cities::countries() {
                println!("{country}");
                for city in cities::in_country(country) {
                    println!("  {}", city.label);
                }
            }
        }
    }
}

fn list_journals(storage: &Storage) -> Result<Vec<Journal>, String> {
    storage
        .list_journals()
        .map_err(|e| format!("failed to list journals: {e}"))
}

fn load_tracker<'a>(
    config: &Config,
    storage: &'a Storage,
    owner: Option<&str>,
) -> Result<AchievementTracker<'a, Storage>, String> {
    AchievementTracker::load(storage, owner, Evaluator::new(config.time_zone()))
        .map_err(|e| format!("failed to load achievements: {e}"))
}

/// Re-evaluate the current user's achievements after a journal change and
/// announce new unlocks.
fn refresh_achievements(config: &Config, storage: &Storage) -> Result<(), String> {
    let viewer = account::current_username(storage)?;
    let journals = list_journals(storage)?;
    let mut tracker = load_tracker(config, storage, viewer.as_deref())?;

    let before: Vec<bool> = tracker.progress().iter().map(|(_, s)| s.completed).collect();
    tracker
        .update(&journals)
        .map_err(|e| format!("failed to save achievements: {e}"))?;

    for ((def, state), was_completed) in tracker.progress().into_iter().zip(before) {
        if state.completed && !was_completed {
            eprintln!("Achievement unlocked: {}", def.title);
        }
    }
    Ok(())
}

/// Whether `viewer` may read `journal`.
fn can_view(journal: &Journal, viewer: Option<&str>) -> bool {
    journal.public || journal.owner.as_deref() == viewer
}

/// Resolve a journal the current user may read.
fn resolve_visible_journal(storage: &Storage, reference: &str) -> Result<Journal, String> {
    let journal = resolve_journal(storage, reference)?;
    let viewer = account::current_username(storage)?;
    if can_view(&journal, viewer.as_deref()) {
        Ok(journal)
    } else {
        Err(format!("journal {} is private", format::short_id(journal.id)))
    }
}

/// Resolve a journal the current user may change.
fn resolve_own_journal(storage: &Storage, reference: &str) -> Result<Journal, String> {
    let journal = resolve_journal(storage, reference)?;
    let viewer = account::current_username(storage)?;
    check_owner(&journal, viewer.as_deref())?;
    Ok(journal)
}

fn check_owner(journal: &Journal, viewer: Option<&str>) -> Result<(), String> {
    if journal.owner.as_deref() == viewer {
        return Ok(());
    }
    let id = format::short_id(journal.id);
    Err(match &journal.owner {
        Some(owner) => format!("journal {id} belongs to {owner}"),
        None => format!("journal {id} was created without an account; log out to change it"),
    })
}

/// Resolve a journal reference (full UUID or unambiguous prefix) to a journal.
fn resolve_journal(storage: &Storage, reference: &str) -> Result<Journal, String> {
    // Try full UUID first.
    if let Ok(id) = reference.parse::<Uuid>() {
        return storage
            .load_journal(id)
            .map_err(|e| format!("journal not found: {e}"));
    }

    let journals = list_journals(storage)?;
    let matches: Vec<&Journal> = journals
        .iter()
        .filter(|j| j.id.to_string().starts_with(reference))
        .collect();

    match matches.len() {
        0 => Err(format!("no journal matching '{reference}'")),
        1 => Ok(matches[0].clone()),
        n => {
            let ids: Vec<String> = matches.iter().map(|j| format::short_id(j.id)).collect();
            Err(format!(
                "'{reference}' is ambiguous: matches {n} journals: {}",
                ids.join(", ")
            ))
        }
    }
}
