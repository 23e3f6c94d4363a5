//! Achievement types: the fixed catalog entries and their per-user progress.

use serde::{Deserialize, Serialize};

/// What an achievement counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Photos,
    Journals,
    Time,
    Location,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Self::Photos => "photos",
            Self::Journals => "journals",
            Self::Time => "time",
            Self::Location => "location",
        }
    }
}

/// An immutable catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementDefinition {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub category: Category,
    pub max_progress: u32,
    /// Icon name for whatever front end renders the badge.
    pub icon: &'static str,
}

/// Progress towards one [`AchievementDefinition`].
///
/// After evaluation, `completed == (progress >= max_progress)` and
/// `progress <= max_progress`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementState {
    pub id: String,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub completed: bool,
}

impl AchievementState {
    /// A fresh, zeroed state for a definition.
    pub fn new(definition: &AchievementDefinition) -> Self {
        Self {
            id: definition.id.to_string(),
            progress: 0,
            completed: false,
        }
    }
}
