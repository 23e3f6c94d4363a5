//! User types for the local account provider.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user as shown to the rest of the app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub profile_image: Option<String>,
    pub created_at: Timestamp,
}

/// Partial profile update. `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub profile_image: Option<String>,
}

impl User {
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.display_name {
            self.display_name = name;
        }
        if let Some(bio) = update.bio {
            self.bio = Some(bio);
        }
        if let Some(image) = update.profile_image {
            self.profile_image = Some(image);
        }
    }
}
