//! Core data model for Wayfarer.
//!
//! Journals and their items, itinerary days, achievement catalog entries
//! and progress, and local users.

mod achievement;
mod itinerary;
mod journal;
mod user;

pub use achievement::{AchievementDefinition, AchievementState, Category};
pub use itinerary::{Activity, ItineraryDay};
pub use journal::{Item, Journal};
pub use user::{ProfileUpdate, User};
