//! Itinerary types: days of planned activities.

use serde::{Deserialize, Serialize};

/// One day of a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItineraryDay {
    /// Display-formatted date, e.g. `03/14/2024`. Not parsed.
    pub date: String,
    pub activities: Vec<Activity>,
}

/// Something planned for a day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub name: String,
    /// Free-form time of day (`10:00`, `morning`). Ordered as text.
    pub time: Option<String>,
    pub location: Option<String>,
}

#[cfg(test)]
impl Activity {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            time: None,
            location: None,
        }
    }

    #[must_use]
    pub fn at(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    #[must_use]
    pub fn in_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}
