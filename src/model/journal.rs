//! Journal types: a trip's worth of photos, notes, and itineraries.

use jiff::Timestamp;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// A user-created collection of entries for one destination or trip.
///
/// Records are read permissively: everything except `id` and `created_at`
/// may be missing and falls back to empty, and a malformed item drops only
/// itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Journal {
    pub id: Uuid,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    pub city: Option<String>,

    pub country: Option<String>,

    /// Username of the author, if the journal was created while logged in.
    pub owner: Option<String>,

    pub cover_image: Option<String>,

    /// Visible in other users' feeds.
    #[serde(default)]
    pub public: bool,

    /// Listed ahead of unpinned journals.
    #[serde(default)]
    pub pinned: bool,

    pub created_at: Timestamp,

    #[serde(default, deserialize_with = "items_skipping_malformed")]
    pub items: Vec<Item>,
}

fn items_skipping_malformed<'de, D>(deserializer: D) -> Result<Vec<Item>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed journal item");
                None
            }
        })
        .collect())
}

impl Journal {
    /// Number of photo items in this journal.
    pub fn photo_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_photo()).count()
    }

    /// Lowercased `"<title> <description>"`, the text location keywords are matched against.
    pub fn location_text(&self) -> String {
        format!("{} {}", self.title, self.description).to_lowercase()
    }
}

/// One entry within a journal.
///
/// Tagged by `type` so each stored record is self-describing.
/// Unrecognized tags load as [`Item::Other`] rather than failing the journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Item {
    /// A photo with the moment it was taken.
    Photo {
        #[serde(default)]
        id: Uuid,
        timestamp: Option<Timestamp>,
        /// Image reference: a path or URL, never the bytes.
        #[serde(default)]
        image: String,
        caption: Option<String>,
        location: Option<String>,
    },

    /// Free-form text.
    Note {
        #[serde(default)]
        id: Uuid,
        timestamp: Option<Timestamp>,
        #[serde(default)]
        text: String,
    },

    /// A day-by-day plan, encoded by [`crate::itinerary::encode`].
    Itinerary {
        #[serde(default)]
        id: Uuid,
        timestamp: Option<Timestamp>,
        #[serde(default)]
        content: String,
    },

    #[serde(other)]
    Other,
}

impl Item {
    pub fn is_photo(&self) -> bool {
        matches!(self, Self::Photo { .. })
    }

    pub fn id(&self) -> Option<Uuid> {
        match self {
            Self::Photo { id, .. } | Self::Note { id, .. } | Self::Itinerary { id, .. } => Some(*id),
            Self::Other => None,
        }
    }

    pub fn timestamp(&self) -> Option<Timestamp> {
        match self {
            Self::Photo { timestamp, .. }
            | Self::Note { timestamp, .. }
            | Self::Itinerary { timestamp, .. } => *timestamp,
            Self::Other => None,
        }
    }
}
