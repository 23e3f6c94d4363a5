//! Entry commands: add photos, notes, and itineraries; remove entries.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Subcommand;
use jiff::Timestamp;
use uuid::Uuid;

use crate::{
    config::Config,
    itinerary,
    model::{Activity, Item, ItineraryDay, Journal},
    storage::Storage,
};

use super::{format, refresh_achievements, resolve_own_journal};

#[derive(Debug, Subcommand)]
pub enum EntryCommand {
    /// Add a photo.
    Photo {
        /// Journal ID: full UUID or unambiguous prefix (e.g. `a3b`).
        #[arg(long)]
        journal: String,

        /// Image path or URL.
        image: String,

        /// Three words or fewer, e.g. "Sunset at Eiffel".
        #[arg(long)]
        caption: String,

        /// Where the photo was taken.
        #[arg(long)]
        location: Option<String>,

        /// When the photo was taken (RFC 3339, e.g. `2024-03-14T10:00:00Z`).
        /// Defaults to now.
        #[arg(long)]
        taken_at: Option<Timestamp>,
    },

    /// Add a note.
    Note {
        /// Journal ID: full UUID or unambiguous prefix (e.g. `a3b`).
        #[arg(long)]
        journal: String,

        text: String,
    },

    /// Add a one-day itinerary, or several days from a JSON file.
    ///
    /// Activities are `TIME|NAME|LOCATION`; time and location may be empty
    /// (`|Dinner`, `10:00|Museum`). A bare `NAME` is an untimed activity.
    Itinerary {
        /// Journal ID: full UUID or unambiguous prefix (e.g. `a3b`).
        #[arg(long)]
        journal: String,

        /// The day's date as it should be displayed, e.g. `03/14/2024`.
        #[arg(long, required_unless_present = "from")]
        date: Option<String>,

        /// An activity for the day. Can be specified multiple times.
        #[arg(long, conflicts_with = "from")]
        activity: Vec<String>,

        /// JSON file holding an array of `{"date", "activities"}` days.
        #[arg(long, conflicts_with = "date")]
        from: Option<PathBuf>,
    },

    /// Remove an entry.
    Remove {
        /// Journal ID: full UUID or unambiguous prefix (e.g. `a3b`).
        #[arg(long)]
        journal: String,

        /// Entry ID: full UUID or unambiguous prefix.
        entry: String,
    },
}

pub(super) fn run(config: &Config, storage: &Storage, command: EntryCommand) -> Result<(), String> {
    match command {
        EntryCommand::Photo {
            journal,
            image,
            caption,
            location,
            taken_at,
        } => {
            if image.trim().is_empty() {
                return Err("photo image is required".to_string());
            }
            let item = Item::Photo {
                id: Uuid::new_v4(),
                timestamp: Some(taken_at.unwrap_or_else(Timestamp::now)),
                image,
                caption: Some(check_caption(&caption)?),
                location,
            };
            cmd_add(config, storage, &journal, item)
        }
        EntryCommand::Note { journal, text } => {
            let item = Item::Note {
                id: Uuid::new_v4(),
                timestamp: Some(Timestamp::now()),
                text,
            };
            cmd_add(config, storage, &journal, item)
        }
        EntryCommand::Itinerary {
            journal,
            date,
            activity,
            from,
        } => {
            let days = match (from, date) {
                (Some(path), _) => read_days(&path)?,
                (None, Some(date)) => vec![ItineraryDay {
                    date,
                    activities: activity.iter().map(|s| parse_activity(s)).collect::<Result<_, _>>()?,
                }],
                (None, None) => return Err("specify --date or --from".to_string()),
            };
            let item = Item::Itinerary {
                id: Uuid::new_v4(),
                timestamp: Some(Timestamp::now()),
                content: itinerary::encode(&days),
            };
            cmd_add(config, storage, &journal, item)
        }
        EntryCommand::Remove { journal, entry } => cmd_remove(config, storage, &journal, &entry),
    }
}

fn cmd_add(config: &Config, storage: &Storage, reference: &str, item: Item) -> Result<(), String> {
    let mut journal = resolve_own_journal(storage, reference)?;
    let id = item.id();
    journal.items.push(item);
    save(storage, &journal)?;

    if let Some(id) = id {
        println!("{id}");
    }
    refresh_achievements(config, storage)
}

fn cmd_remove(
    config: &Config,
    storage: &Storage,
    reference: &str,
    entry: &str,
) -> Result<(), String> {
    let mut journal = resolve_own_journal(storage, reference)?;
    let index = find_entry(&journal, entry)?;
    journal.items.remove(index);
    save(storage, &journal)?;

    eprintln!("Entry removed from {}", format::short_id(journal.id));
    refresh_achievements(config, storage)
}

fn save(storage: &Storage, journal: &Journal) -> Result<(), String> {
    storage
        .update_journal(journal)
        .map_err(|e| format!("failed to update journal: {e}"))
}

/// Index of the entry whose id is `reference` or starts with it.
fn find_entry(journal: &Journal, reference: &str) -> Result<usize, String> {
    let matches: Vec<usize> = journal
        .items
        .iter()
        .enumerate()
        .filter(|(_, item)| {
            item.id().is_some_and(|id| {
                id.to_string().starts_with(reference) || id.simple().to_string().starts_with(reference)
            })
        })
        .map(|(i, _)| i)
        .collect();

    match matches.as_slice() {
        [] => Err(format!("no entry matching '{reference}'")),
        [index] => Ok(*index),
        many => Err(format!(
            "'{reference}' is ambiguous: matches {} entries",
            many.len()
        )),
    }
}

/// Parses `TIME|NAME|LOCATION`, `TIME|NAME`, or `NAME`.
fn parse_activity(spec: &str) -> Result<Activity, String> {
    let parts: Vec<&str> = spec.splitn(3, '|').collect();
    let (time, name, location) = match parts.as_slice() {
        [name] => (None, *name, None),
        [time, name] => (non_empty(time), *name, None),
        [time, name, location] => (non_empty(time), *name, non_empty(location)),
        _ => unreachable!("splitn(3) yields one to three parts"),
    };

    let name = non_empty(name).ok_or_else(|| format!("activity '{spec}' has no name"))?;
    Ok(Activity {
        name,
        time,
        location,
    })
}

const MAX_CAPTION_WORDS: usize = 3;

/// Captions are required and at most three words.
fn check_caption(caption: &str) -> Result<String, String> {
    let words = caption.split_whitespace().count();
    if words == 0 {
        return Err("photo caption is required".to_string());
    }
    if words > MAX_CAPTION_WORDS {
        return Err(format!(
            "caption must be three words or less (got {words}): '{caption}'"
        ));
    }
    Ok(caption.trim().to_string())
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn read_days(path: &Path) -> Result<Vec<ItineraryDay>, String> {
    let json = fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&json).map_err(|e| format!("invalid itinerary in {}: {e}", path.display()))
}
