//! Achievements: a fixed catalog of travel milestones, recomputed from journals.
//!
//! [`Evaluator::evaluate`] is pure: journals and the current states in,
//! updated states and a `changed` flag out. [`AchievementTracker`] wires
//! that to a [`KeyValueStore`] for one owner's journals, writing only when
//! something changed.

use std::collections::{BTreeSet, HashSet};

use jiff::tz::TimeZone;

use crate::model::{AchievementDefinition, AchievementState, Category, Item, Journal};
use crate::storage::{self, KeyValueStore};

/// Store key holding the JSON array of [`AchievementState`] for journals
/// with no owner. Users get `achievements:<username>`.
pub const STATE_KEY: &str = "achievements";

/// Photos a single journal needs for `photo_collection`.
const COLLECTION_SIZE: usize = 5;

const CITY_KEYWORDS: &[&str] = &["city", "town", "downtown", "urban"];
const NATURE_KEYWORDS: &[&str] = &[
    "mountain", "beach", "forest", "lake", "park", "trail", "hiking",
];

/// Every achievement, in display order.
pub const CATALOG: &[AchievementDefinition] = &[
    AchievementDefinition {
        id: "first_photo",
        title: "First Memory",
        description: "Upload your first photo",
        category: Category::Photos,
        max_progress: 1,
        icon: "camera",
    },
    AchievementDefinition {
        id: "photo_enthusiast",
        title: "Photo Enthusiast",
        description: "Upload 10 photos",
        category: Category::Photos,
        max_progress: 10,
        icon: "images",
    },
    AchievementDefinition {
        id: "photography_pro",
        title: "Photography Pro",
        description: "Upload 50 photos",
        category: Category::Photos,
        max_progress: 50,
        icon: "camera",
    },
    AchievementDefinition {
        id: "journal_creator",
        title: "Journal Creator",
        description: "Create your first journal",
        category: Category::Journals,
        max_progress: 1,
        icon: "book",
    },
    AchievementDefinition {
        id: "active_traveler",
        title: "Active Traveler",
        description: "Create 5 journals with photos",
        category: Category::Journals,
        max_progress: 5,
        icon: "airplane",
    },
    AchievementDefinition {
        id: "photo_collection",
        title: "Photo Collection",
        description: "Create a journal with 5+ photos",
        category: Category::Journals,
        max_progress: 1,
        icon: "images",
    },
    AchievementDefinition {
        id: "consistent_photographer",
        title: "Consistent Photographer",
        description: "Upload photos in 3 consecutive months",
        category: Category::Time,
        max_progress: 3,
        icon: "calendar",
    },
    AchievementDefinition {
        id: "year_in_review",
        title: "Year in Review",
        description: "Upload photos in all four seasons",
        category: Category::Time,
        max_progress: 4,
        icon: "time",
    },
    AchievementDefinition {
        id: "city_explorer",
        title: "City Explorer",
        description: "Visit 3 different cities",
        category: Category::Location,
        max_progress: 3,
        icon: "business",
    },
    AchievementDefinition {
        id: "nature_lover",
        title: "Nature Lover",
        description: "Visit 3 nature locations",
        category: Category::Location,
        max_progress: 3,
        icon: "leaf",
    },
];

/// Zeroed states for the whole catalog.
pub fn initial_states() -> Vec<AchievementState> {
    CATALOG.iter().map(AchievementState::new).collect()
}

/// Result of one evaluation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// One state per catalog entry, in catalog order.
    pub states: Vec<AchievementState>,

    /// Whether `states` differs from the states passed in.
    pub changed: bool,
}

/// Recomputes achievement progress from a journal collection.
#[derive(Debug, Clone)]
pub struct Evaluator {
    /// Zone used to place photo timestamps in a calendar month.
    tz: TimeZone,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(TimeZone::UTC)
    }
}

impl Evaluator {
    pub fn new(tz: TimeZone) -> Self {
        Self { tz }
    }

    /// Recomputes every catalog entry from `journals`.
    ///
    /// `current` is reconciled against the catalog: missing entries start
    /// at zero and unknown ids are dropped. Any reconciliation or progress
    /// change sets `changed`.
    pub fn evaluate(&self, journals: &[Journal], current: &[AchievementState]) -> Evaluation {
        let tally = Tally::collect(journals, &self.tz);

        let states: Vec<AchievementState> = CATALOG
            .iter()
            .map(|def| {
                let mut state = current
                    .iter()
                    .find(|s| s.id == def.id)
                    .cloned()
                    .unwrap_or_else(|| AchievementState::new(def));
                state.progress = tally.progress(def);
                state.completed = state.progress >= def.max_progress;
                state
            })
            .collect();

        let changed = states.as_slice() != current;
        Evaluation { states, changed }
    }
}

/// Aggregates gathered in a single pass over the journals.
#[derive(Debug, Default)]
struct Tally {
    photos: usize,
    journals: usize,
    journals_with_photos: usize,
    has_collection: bool,
    /// Calendar months, 0-11.
    months: BTreeSet<i8>,
    /// `month / 3`, 0-3.
    seasons: BTreeSet<i8>,
    /// Distinct journal texts mentioning a city keyword.
    city_texts: HashSet<String>,
    /// Distinct journal texts mentioning a nature keyword.
    nature_texts: HashSet<String>,
}

impl Tally {
    fn collect(journals: &[Journal], tz: &TimeZone) -> Self {
        let mut tally = Self {
            journals: journals.len(),
            ..Self::default()
        };

        for journal in journals {
            let photos = journal.photo_count();
            tally.photos += photos;
            if photos > 0 {
                tally.journals_with_photos += 1;
            }
            if photos >= COLLECTION_SIZE {
                tally.has_collection = true;
            }

            for ts in journal
                .items
                .iter()
                .filter(|i| i.is_photo())
                .filter_map(Item::timestamp)
            {
                let month = ts.to_zoned(tz.clone()).month() - 1;
                tally.months.insert(month);
                tally.seasons.insert(month / 3);
            }

            // Counts distinct texts, not distinct places: two journals that
            // both say "beach" count twice, one journal saying "beach" and
            // "lake" counts once.
            let text = journal.location_text();
            if CITY_KEYWORDS.iter().any(|k| text.contains(k)) {
                tally.city_texts.insert(text.clone());
            }
            if NATURE_KEYWORDS.iter().any(|k| text.contains(k)) {
                tally.nature_texts.insert(text);
            }
        }

        tally
    }

    /// Progress for one definition, capped at its maximum.
    fn progress(&self, def: &AchievementDefinition) -> u32 {
        let count = match def.category {
            Category::Photos => self.photos,
            Category::Journals => match def.id {
                "journal_creator" => usize::from(self.journals > 0),
                "active_traveler" => self.journals_with_photos,
                "photo_collection" => usize::from(self.has_collection),
                _ => 0,
            },
            // Distinct months, not consecutive ones.
            Category::Time => match def.id {
                "consistent_photographer" => self.months.len(),
                "year_in_review" => self.seasons.len(),
                _ => 0,
            },
            Category::Location => match def.id {
                "city_explorer" => self.city_texts.len(),
                "nature_lover" => self.nature_texts.len(),
                _ => 0,
            },
        };
        u32::try_from(count).map_or(def.max_progress, |c| c.min(def.max_progress))
    }
}

/// Store key for `owner`'s achievement states.
fn state_key(owner: Option<&str>) -> String {
    match owner {
        Some(owner) => format!("{STATE_KEY}:{owner}"),
        None => STATE_KEY.to_string(),
    }
}

/// One owner's achievement states, bound to the store that persists them.
pub struct AchievementTracker<'a, S: KeyValueStore + ?Sized> {
    store: &'a S,
    owner: Option<String>,
    key: String,
    evaluator: Evaluator,
    states: Vec<AchievementState>,
}

impl<'a, S: KeyValueStore + ?Sized> AchievementTracker<'a, S> {
    /// Loads `owner`'s saved states, falling back to a zeroed catalog when
    /// none are stored or the stored value can't be parsed.
    pub fn load(store: &'a S, owner: Option<&str>, evaluator: Evaluator) -> storage::Result<Self> {
        let key = state_key(owner);
        let states = match store.get(&key)? {
            Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "discarding unreadable achievement state");
                initial_states()
            }),
            None => initial_states(),
        };
        Ok(Self {
            store,
            owner: owner.map(str::to_string),
            key,
            evaluator,
            states,
        })
    }

    /// Current in-memory states, as loaded or last evaluated.
    pub fn states(&self) -> &[AchievementState] {
        &self.states
    }

    /// Each catalog entry paired with its state, in catalog order.
    pub fn progress(&self) -> Vec<(&'static AchievementDefinition, AchievementState)> {
        CATALOG
            .iter()
            .map(|def| {
                let state = self
                    .states
                    .iter()
                    .find(|s| s.id == def.id)
                    .cloned()
                    .unwrap_or_else(|| AchievementState::new(def));
                (def, state)
            })
            .collect()
    }

    /// Re-evaluates against the owner's journals and saves if anything
    /// changed. Journals belonging to anyone else are ignored.
    ///
    /// Returns whether anything changed. On a failed save the new states
    /// are still held in memory; call [`Self::save`] to retry.
    pub fn update(&mut self, journals: &[Journal]) -> storage::Result<bool> {
        let own: Vec<Journal> = journals
            .iter()
            .filter(|j| j.owner == self.owner)
            .cloned()
            .collect();
        let evaluation = self.evaluator.evaluate(&own, &self.states);
        self.states = evaluation.states;
        if evaluation.changed {
            tracing::debug!("achievement progress changed, saving");
            self.save()?;
        }
        Ok(evaluation.changed)
    }

    /// Writes the full state array to the store.
    pub fn save(&self) -> storage::Result<()> {
        self.store
            .set(&self.key, &serde_json::to_string(&self.states)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::Cell;

    use jiff::Timestamp;
    use uuid::Uuid;

    use crate::storage::{StorageError, memory::MemoryStore};

    fn journal(title: &str, description: &str, items: Vec<Item>) -> Journal {
        Journal {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            city: None,
            country: None,
            owner: None,
            cover_image: None,
            public: false,
            pinned: false,
            created_at: Timestamp::UNIX_EPOCH,
            items,
        }
    }

    fn photo_at(timestamp: &str) -> Item {
        Item::Photo {
            id: Uuid::new_v4(),
            timestamp: Some(timestamp.parse().unwrap()),
            image: "photo.jpg".into(),
            caption: None,
            location: None,
        }
    }

    fn photos(n: usize) -> Vec<Item> {
        (0..n).map(|_| photo_at("2024-03-14T10:00:00Z")).collect()
    }

    fn note() -> Item {
        Item::Note {
            id: Uuid::new_v4(),
            timestamp: None,
            text: "Ate a croissant".into(),
        }
    }

    fn state<'s>(states: &'s [AchievementState], id: &str) -> &'s AchievementState {
        states.iter().find(|s| s.id == id).unwrap()
    }

    fn evaluate(journals: &[Journal]) -> Vec<AchievementState> {
        Evaluator::default()
            .evaluate(journals, &initial_states())
            .states
    }

    #[test]
    fn catalog_ids_are_unique() {
        let ids: HashSet<_> = CATALOG.iter().map(|d| d.id).collect();
        assert_eq!(ids.len(), CATALOG.len());
        assert!(CATALOG.iter().all(|d| d.max_progress > 0));
    }

    #[test]
    fn no_journals_leaves_everything_at_zero() {
        let evaluation = Evaluator::default().evaluate(&[], &initial_states());

        assert!(!evaluation.changed);
        assert!(evaluation.states.iter().all(|s| s.progress == 0 && !s.completed));
    }

    #[test]
    fn one_journal_with_five_photos() {
        let states = evaluate(&[journal("Paris", "", photos(5))]);

        assert_eq!(state(&states, "first_photo").progress, 1);
        assert!(state(&states, "first_photo").completed);
        assert_eq!(state(&states, "photo_enthusiast").progress, 5);
        assert!(!state(&states, "photo_enthusiast").completed);
        assert_eq!(state(&states, "photo_collection").progress, 1);
        assert!(state(&states, "photo_collection").completed);
        assert_eq!(state(&states, "journal_creator").progress, 1);
        assert!(state(&states, "journal_creator").completed);
        assert_eq!(state(&states, "active_traveler").progress, 1);
    }

    #[test]
    fn notes_are_not_photos() {
        let states = evaluate(&[journal("Paris", "", vec![note(), note()])]);

        assert_eq!(state(&states, "first_photo").progress, 0);
        assert_eq!(state(&states, "active_traveler").progress, 0);
        assert_eq!(state(&states, "journal_creator").progress, 1);
    }

    #[test]
    fn photo_collection_needs_five_in_one_journal() {
        let states = evaluate(&[
            journal("Paris", "", photos(3)),
            journal("Rome", "", photos(3)),
        ]);

        assert_eq!(state(&states, "photo_enthusiast").progress, 6);
        assert_eq!(state(&states, "active_traveler").progress, 2);
        assert_eq!(state(&states, "photo_collection").progress, 0);
    }

    #[test]
    fn progress_is_capped_at_max() {
        let journals: Vec<Journal> = (0..7).map(|_| journal("Trip", "", photos(10))).collect();
        let states = evaluate(&journals);

        for def in CATALOG {
            let s = state(&states, def.id);
            assert!(s.progress <= def.max_progress, "{} over max", def.id);
            assert_eq!(s.completed, s.progress >= def.max_progress);
        }
        assert_eq!(state(&states, "photography_pro").progress, 50);
        assert_eq!(state(&states, "active_traveler").progress, 5);
    }

    #[test]
    fn adding_a_photo_never_lowers_photo_progress() {
        let mut journals = vec![journal("Paris", "", photos(3)), journal("Rome", "", vec![])];
        let before = evaluate(&journals);

        journals[1].items.push(photo_at("2024-07-01T00:00:00Z"));
        let after = evaluate(&journals);

        for def in CATALOG.iter().filter(|d| d.category == Category::Photos) {
            assert!(state(&after, def.id).progress >= state(&before, def.id).progress);
        }
    }

    #[test]
    fn second_evaluation_reports_no_change() {
        let journals = vec![journal("Mountain town", "", photos(2))];
        let evaluator = Evaluator::default();

        let first = evaluator.evaluate(&journals, &initial_states());
        assert!(first.changed);

        let second = evaluator.evaluate(&journals, &first.states);
        assert!(!second.changed);
        assert_eq!(second.states, first.states);
    }

    #[test]
    fn months_are_counted_distinct_not_consecutive() {
        // January, June, November: nothing consecutive, still completes.
        let items = vec![
            photo_at("2024-01-10T12:00:00Z"),
            photo_at("2024-06-10T12:00:00Z"),
            photo_at("2023-11-10T12:00:00Z"),
            photo_at("2024-06-20T12:00:00Z"),
        ];
        let states = evaluate(&[journal("Trip", "", items)]);

        let consistent = state(&states, "consistent_photographer");
        assert_eq!(consistent.progress, 3);
        assert!(consistent.completed);
        // Jan -> 0, Jun -> 1, Nov -> 3.
        assert_eq!(state(&states, "year_in_review").progress, 3);
    }

    #[test]
    fn seasons_follow_month_buckets() {
        let items = vec![
            photo_at("2024-02-01T12:00:00Z"),
            photo_at("2024-05-01T12:00:00Z"),
            photo_at("2024-08-01T12:00:00Z"),
            photo_at("2024-12-01T12:00:00Z"),
        ];
        let states = evaluate(&[journal("Trip", "", items)]);

        let year = state(&states, "year_in_review");
        assert_eq!(year.progress, 4);
        assert!(year.completed);
    }

    #[test]
    fn months_use_the_evaluator_time_zone() {
        // 23:30 UTC on Jan 31 is already February in Tokyo.
        let items = vec![
            photo_at("2024-01-31T23:30:00Z"),
            photo_at("2024-01-15T12:00:00Z"),
        ];
        let journals = [journal("Trip", "", items)];

        let utc = Evaluator::default().evaluate(&journals, &initial_states());
        assert_eq!(state(&utc.states, "consistent_photographer").progress, 1);

        let tokyo = Evaluator::new(TimeZone::fixed(jiff::tz::offset(9)))
            .evaluate(&journals, &initial_states());
        assert_eq!(state(&tokyo.states, "consistent_photographer").progress, 2);
    }

    #[test]
    fn untimestamped_photos_count_but_have_no_month() {
        let items = vec![Item::Photo {
            id: Uuid::new_v4(),
            timestamp: None,
            image: "photo.jpg".into(),
            caption: None,
            location: None,
        }];
        let states = evaluate(&[journal("Trip", "", items)]);

        assert_eq!(state(&states, "first_photo").progress, 1);
        assert_eq!(state(&states, "consistent_photographer").progress, 0);
    }

    #[test]
    fn nature_counts_distinct_journal_texts() {
        let states = evaluate(&[
            journal("Alps", "mountain hut", vec![]),
            journal("Coast", "beach days", vec![]),
        ]);

        assert_eq!(state(&states, "nature_lover").progress, 2);
        assert_eq!(state(&states, "city_explorer").progress, 0);
    }

    #[test]
    fn one_text_with_several_keywords_counts_once() {
        let states = evaluate(&[journal("Lake", "forest trail hiking", vec![])]);

        assert_eq!(state(&states, "nature_lover").progress, 1);
    }

    #[test]
    fn identical_texts_count_once() {
        let states = evaluate(&[
            journal("Downtown", "", vec![]),
            journal("downtown", "", vec![]),
            journal("Old Town", "urban walk", vec![]),
        ]);

        assert_eq!(state(&states, "city_explorer").progress, 2);
    }

    #[test]
    fn keyword_match_is_substring() {
        // "park" inside "parking" still counts.
        let states = evaluate(&[journal("Parking garage", "", vec![])]);

        assert_eq!(state(&states, "nature_lover").progress, 1);
    }

    #[test]
    fn stale_completed_flag_is_repaired() {
        let mut current = initial_states();
        current[0].completed = true;

        let evaluation = Evaluator::default().evaluate(&[], &current);

        assert!(evaluation.changed);
        assert!(!evaluation.states[0].completed);
    }

    #[test]
    fn states_are_reconciled_with_catalog() {
        let current = vec![
            AchievementState {
                id: "retired".into(),
                progress: 7,
                completed: true,
            },
            AchievementState {
                id: "journal_creator".into(),
                progress: 1,
                completed: true,
            },
        ];
        let journals = [journal("Paris", "", vec![])];

        let evaluation = Evaluator::default().evaluate(&journals, &current);

        assert!(evaluation.changed);
        assert_eq!(evaluation.states.len(), CATALOG.len());
        assert!(
            evaluation
                .states
                .iter()
                .all(|s| CATALOG.iter().any(|d| d.id == s.id))
        );
        assert_eq!(state(&evaluation.states, "journal_creator").progress, 1);
    }

    #[test]
    fn tracker_loads_zeroed_catalog_when_empty() {
        let store = MemoryStore::default();
        let tracker = AchievementTracker::load(&store, None, Evaluator::default()).unwrap();

        assert_eq!(tracker.states(), initial_states().as_slice());
    }

    #[test]
    fn tracker_saves_only_on_change() {
        let store = MemoryStore::default();
        let journals = [journal("Paris", "", photos(1))];

        let mut tracker = AchievementTracker::load(&store, None, Evaluator::default()).unwrap();
        assert!(tracker.update(&journals).unwrap());
        assert!(store.get(STATE_KEY).unwrap().is_some());

        store.remove(STATE_KEY).unwrap();
        assert!(!tracker.update(&journals).unwrap());
        assert_eq!(store.get(STATE_KEY).unwrap(), None);
    }

    #[test]
    fn tracker_round_trips_through_store() {
        let store = MemoryStore::default();
        let journals = [journal("Paris", "", photos(5))];

        let mut tracker = AchievementTracker::load(&store, None, Evaluator::default()).unwrap();
        tracker.update(&journals).unwrap();

        let reloaded = AchievementTracker::load(&store, None, Evaluator::default()).unwrap();
        assert_eq!(reloaded.states(), tracker.states());
    }

    #[test]
    fn tracker_ignores_unreadable_state() {
        let store = MemoryStore::default();
        store.set(STATE_KEY, "not json").unwrap();

        let tracker = AchievementTracker::load(&store, None, Evaluator::default()).unwrap();
        assert_eq!(tracker.states(), initial_states().as_slice());
    }

    #[test]
    fn tracker_counts_only_the_owners_journals() {
        let store = MemoryStore::default();
        let mut graces = journal("Paris", "", photos(1));
        graces.owner = Some("grace".into());
        graces.public = true;
        let journals = [graces];

        let mut ada = AchievementTracker::load(&store, Some("ada"), Evaluator::default()).unwrap();
        ada.update(&journals).unwrap();
        assert_eq!(state(ada.states(), "first_photo").progress, 0);
        assert_eq!(state(ada.states(), "journal_creator").progress, 0);

        let mut grace =
            AchievementTracker::load(&store, Some("grace"), Evaluator::default()).unwrap();
        assert!(grace.update(&journals).unwrap());
        assert!(state(grace.states(), "first_photo").completed);
        assert!(store.get("achievements:grace").unwrap().is_some());
        assert_eq!(store.get("achievements:ada").unwrap(), None);
        assert_eq!(store.get(STATE_KEY).unwrap(), None);
    }

    /// Store whose writes fail until told otherwise.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        failing: Cell<bool>,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> storage::Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> storage::Result<()> {
            if self.failing.get() {
                return Err(StorageError::Io(std::io::Error::other("disk full")));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> storage::Result<bool> {
            self.inner.remove(key)
        }

        fn keys(&self, prefix: &str) -> storage::Result<Vec<String>> {
            self.inner.keys(prefix)
        }
    }

    #[test]
    fn failed_save_keeps_computed_states() {
        let store = FlakyStore::default();
        store.failing.set(true);
        let journals = [journal("Paris", "", photos(1))];

        let mut tracker = AchievementTracker::load(&store, None, Evaluator::default()).unwrap();
        assert!(tracker.update(&journals).is_err());
        assert_eq!(state(tracker.states(), "first_photo").progress, 1);

        store.failing.set(false);
        tracker.save().unwrap();
        let reloaded = AchievementTracker::load(&store, None, Evaluator::default()).unwrap();
        assert_eq!(state(reloaded.states(), "first_photo").progress, 1);
    }
}
