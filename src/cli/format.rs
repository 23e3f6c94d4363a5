//! Output formatting for CLI display.

use uuid::Uuid;

use crate::itinerary;
use crate::model::{AchievementDefinition, AchievementState, Item, Journal};

const BAR_WIDTH: u32 = 10;

/// First eight hex digits of an id.
pub(super) fn short_id(id: Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

/// One line per journal for listings.
pub(super) fn format_journal_line(journal: &Journal) -> String {
    let mut line = format!("{}  {}", short_id(journal.id), journal.title);
    if let Some(place) = format_place(journal) {
        line.push_str(&format!(" ({place})"));
    }
    let mut tags = Vec::new();
    if journal.pinned {
        tags.push("pinned");
    }
    if journal.public {
        tags.push("public");
    }
    if !tags.is_empty() {
        line.push_str(&format!(" [{}]", tags.join(", ")));
    }
    if let Some(owner) = &journal.owner {
        line.push_str(&format!(" by {owner}"));
    }
    line.push_str(&format!(" · {} entries", journal.items.len()));
    line
}

fn format_place(journal: &Journal) -> Option<String> {
    match (journal.city.as_deref(), journal.country.as_deref()) {
        (Some(city), Some(country)) => Some(format!("{city}, {country}")),
        (Some(place), None) | (None, Some(place)) => Some(place.to_string()),
        (None, None) => None,
    }
}

/// A journal's header and every entry, itineraries decoded.
pub(super) fn format_journal(journal: &Journal) -> String {
    let mut out = format_journal_line(journal);
    if !journal.description.is_empty() {
        out.push('\n');
        out.push_str(&journal.description);
    }
    for item in &journal.items {
        out.push_str("\n\n");
        out.push_str(&format_item(item));
    }
    out
}

fn format_item(item: &Item) -> String {
    let id = item.id().map(short_id).unwrap_or_default();
    let when = item
        .timestamp()
        .map(|ts| format!(" @ {}", ts.strftime("%Y-%m-%d %H:%M")))
        .unwrap_or_default();
    match item {
        Item::Photo {
            image,
            caption,
            location,
            ..
        } => {
            let mut out = format!("{id}  photo{when}: {image}");
            if let Some(caption) = caption {
                out.push_str(&format!("\n  {caption}"));
            }
            if let Some(location) = location {
                out.push_str(&format!("\n  at {location}"));
            }
            out
        }
        Item::Note { text, .. } => format!("{id}  note{when}\n  {text}"),
        Item::Itinerary { content, .. } => {
            let mut out = format!("{id}  itinerary{when}");
            for day in itinerary::decode(content) {
                out.push_str(&format!("\n  {}", day.date));
                for activity in &day.activities {
                    let time = activity.time.as_deref().unwrap_or("--:--");
                    out.push_str(&format!("\n    {time}  {}", activity.name));
                    if let Some(location) = &activity.location {
                        out.push_str(&format!(" ({location})"));
                    }
                }
            }
            out
        }
        Item::Other => "(unsupported entry)".to_string(),
    }
}

/// `[#####-----]  5/10 Photo Enthusiast: Upload 10 photos`
pub(super) fn format_achievement(def: &AchievementDefinition, state: &AchievementState) -> String {
    let filled = (state.progress.min(def.max_progress) * BAR_WIDTH) / def.max_progress;
    let bar: String = (0..BAR_WIDTH)
        .map(|i| if i < filled { '#' } else { '-' })
        .collect();
    let mark = if state.completed { " ✓" } else { "" };
    format!(
        "[{bar}] {:>2}/{:<2} {}: {}{mark}",
        state.progress, def.max_progress, def.title, def.description
    )
}
