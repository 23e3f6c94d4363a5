//! Journal lifecycle commands: new, list, show, delete, pin, publish.

use clap::Subcommand;
use jiff::Timestamp;
use uuid::Uuid;

use crate::{cities, config::Config, model::Journal, storage::Storage};

use super::{
    account, format, list_journals, refresh_achievements, resolve_own_journal,
    resolve_visible_journal,
};

#[derive(Debug, Subcommand)]
pub enum JournalCommand {
    /// Create a new journal. Prints the journal ID.
    New {
        /// Journal title, e.g. "Spring in Paris".
        title: String,

        /// Longer description of the trip.
        #[arg(long, default_value = "")]
        description: String,

        /// Destination city. Known cities fill in their country.
        #[arg(long)]
        city: Option<String>,

        /// Destination country.
        #[arg(long)]
        country: Option<String>,

        /// Cover image path or URL.
        #[arg(long)]
        cover: Option<String>,

        /// Show this journal in other users' feeds.
        #[arg(long)]
        public: bool,
    },

    /// List your journals, pinned first.
    List,

    /// Show a journal and its entries.
    Show {
        /// Journal ID: full UUID or unambiguous prefix (e.g. `a3b`).
        #[arg(long)]
        journal: String,

        /// Print the journal as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Delete a journal and all its entries.
    Delete {
        /// Journal ID: full UUID or unambiguous prefix (e.g. `a3b`).
        #[arg(long)]
        journal: String,
    },

    /// Pin a journal to the top of the list.
    Pin {
        /// Journal ID: full UUID or unambiguous prefix (e.g. `a3b`).
        #[arg(long)]
        journal: String,
    },

    /// Unpin a journal.
    Unpin {
        /// Journal ID: full UUID or unambiguous prefix (e.g. `a3b`).
        #[arg(long)]
        journal: String,
    },

    /// Make a journal visible in other users' feeds.
    Publish {
        /// Journal ID: full UUID or unambiguous prefix (e.g. `a3b`).
        #[arg(long)]
        journal: String,
    },

    /// Hide a journal from other users' feeds.
    Unpublish {
        /// Journal ID: full UUID or unambiguous prefix (e.g. `a3b`).
        #[arg(long)]
        journal: String,
    },
}

pub(super) fn run(config: &Config, storage: &Storage, command: JournalCommand) -> Result<(), String> {
    match command {
        JournalCommand::New {
            title,
            description,
            city,
            country,
            cover,
            public,
        } => {
            let journal = new_journal(storage, title, description, city, country, cover, public)?;
            cmd_new(config, storage, &journal)
        }
        JournalCommand::List => cmd_list(storage),
        JournalCommand::Show { journal, json } => {
            let journal = resolve_visible_journal(storage, &journal)?;
            cmd_show(&journal, json)
        }
        JournalCommand::Delete { journal } => {
            let journal = resolve_own_journal(storage, &journal)?;
            cmd_delete(config, storage, &journal)
        }
        JournalCommand::Pin { journal } => set_flag(storage, &journal, |j| j.pinned = true),
        JournalCommand::Unpin { journal } => set_flag(storage, &journal, |j| j.pinned = false),
        JournalCommand::Publish { journal } => set_flag(storage, &journal, |j| j.public = true),
        JournalCommand::Unpublish { journal } => {
            set_flag(storage, &journal, |j| j.public = false)
        }
    }
}

fn new_journal(
    storage: &Storage,
    title: String,
    description: String,
    city: Option<String>,
    country: Option<String>,
    cover: Option<String>,
    public: bool,
) -> Result<Journal, String> {
    if title.trim().is_empty() {
        return Err("journal title is required".to_string());
    }

    let known = city.as_deref().and_then(cities::find);
    let country = country.or_else(|| known.map(|c| c.country.to_string()));
    let city = known.map(|c| c.name.to_string()).or(city);

    Ok(Journal {
        id: Uuid::new_v4(),
        title,
        description,
        city,
        country,
        owner: account::current_username(storage)?,
        cover_image: cover,
        public,
        pinned: false,
        created_at: Timestamp::now(),
        items: Vec::new(),
    })
}

fn cmd_new(config: &Config, storage: &Storage, journal: &Journal) -> Result<(), String> {
    storage
        .create_journal(journal)
        .map_err(|e| format!("failed to create journal: {e}"))?;
    tracing::info!(id = %journal.id, title = %journal.title, "created journal");

    println!("{}", journal.id);
    refresh_achievements(config, storage)
}

fn cmd_list(storage: &Storage) -> Result<(), String> {
    let owner = account::current_username(storage)?;
    let journals = own_journals(list_journals(storage)?, owner.as_deref());

    if journals.is_empty() {
        println!("No journals");
        return Ok(());
    }

    for journal in &journals {
        println!("{}", format::format_journal_line(journal));
    }
    Ok(())
}

fn own_journals(journals: Vec<Journal>, owner: Option<&str>) -> Vec<Journal> {
    journals
        .into_iter()
        .filter(|j| j.owner.as_deref() == owner)
        .collect()
}

fn cmd_show(journal: &Journal, json: bool) -> Result<(), String> {
    if json {
        let json = serde_json::to_string_pretty(journal)
            .map_err(|e| format!("failed to serialize journal: {e}"))?;
        println!("{json}");
    } else {
        println!("{}", format::format_journal(journal));
    }
    Ok(())
}

fn cmd_delete(config: &Config, storage: &Storage, journal: &Journal) -> Result<(), String> {
    storage
        .delete_journal(journal.id)
        .map_err(|e| format!("failed to delete journal: {e}"))?;

    eprintln!("Journal {} deleted", format::short_id(journal.id));
    refresh_achievements(config, storage)
}

/// Flags don't feed any achievement, so no refresh.
fn set_flag(storage: &Storage, reference: &str, apply: impl FnOnce(&mut Journal)) -> Result<(), String> {
    let mut journal = resolve_own_journal(storage, reference)?;
    apply(&mut journal);
    storage
        .update_journal(&journal)
        .map_err(|e| format!("failed to update journal: {e}"))?;
    eprintln!("{}", format::format_journal_line(&journal));
    Ok(())
}
