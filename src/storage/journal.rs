//! Journal storage: create, load, update, delete, and list journals.

use uuid::Uuid;

use crate::model::Journal;

use super::{KeyValueStore, Result, Storage, StorageError};

const PREFIX: &str = "journal:";

fn journal_key(id: Uuid) -> String {
    format!("{PREFIX}{id}")
}

impl Storage {
    /// Stores a new journal.
    pub fn create_journal(&self, journal: &Journal) -> Result<()> {
        let key = journal_key(journal.id);
        if self.get(&key)?.is_some() {
            return Err(StorageError::JournalAlreadyExists(journal.id));
        }
        self.set(&key, &serde_json::to_string(journal)?)
    }

    /// Replaces an existing journal.
    pub fn update_journal(&self, journal: &Journal) -> Result<()> {
        let key = journal_key(journal.id);
        if self.get(&key)?.is_none() {
            return Err(StorageError::JournalNotFound(journal.id));
        }
        self.set(&key, &serde_json::to_string(journal)?)
    }

    /// Loads a single journal.
    pub fn load_journal(&self, id: Uuid) -> Result<Journal> {
        let json = self
            .get(&journal_key(id))?
            .ok_or(StorageError::JournalNotFound(id))?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Deletes a journal and all of its items.
    pub fn delete_journal(&self, id: Uuid) -> Result<()> {
        if !self.remove(&journal_key(id))? {
            return Err(StorageError::JournalNotFound(id));
        }
        Ok(())
    }

    /// Lists all journals: pinned first, then newest first.
    ///
    /// Malformed records are skipped with a warning.
    pub fn list_journals(&self) -> Result<Vec<Journal>> {
        let mut journals = Vec::new();
        for key in self.keys(PREFIX)? {
            let Some(json) = self.get(&key)? else {
                continue;
            };
            match serde_json::from_str::<Journal>(&json) {
                Ok(j) => journals.push(j),
                Err(e) => tracing::warn!(%key, error = %e, "skipping malformed journal"),
            }
        }
        journals.sort_by(|a, b| {
            b.pinned
                .cmp(&a.pinned)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(journals)
    }
}
