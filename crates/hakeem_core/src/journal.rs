//! crates/hakeem_core/src/journal.rs
//!
//! The user's reflection journal, one entry per distinct reference, most recent first.

use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::domain::{HydratedVerse, JournalEntry, Reference, DEFAULT_MOOD_LABEL};
use crate::ports::{KeyValueStore, PortError};
use crate::store::{self, JOURNAL_KEY};

/// Notice shown after a successful add.
pub const SAVED_NOTICE: &str = "Saved to Journal";

#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    /// Expected condition, shown to the user as a transient notice.
    #[error("Already in your journal")]
    AlreadyExists(Reference),
    #[error("Failed to persist the journal: {0}")]
    Storage(#[from] PortError),
}

/// Journal entries, loaded once and kept in step with storage.
///
/// Every mutation persists the complete new list before it becomes visible.
pub struct JournalStore {
    store: Arc<dyn KeyValueStore>,
    entries: RwLock<Vec<JournalEntry>>,
}

impl JournalStore {
    /// Loads the persisted journal. Missing or corrupted state yields an empty journal.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let entries = store::load_json::<Vec<JournalEntry>>(store.as_ref(), JOURNAL_KEY)
            .await
            .unwrap_or_default();
        info!("Loaded {} journal entries", entries.len());
        Self {
            store,
            entries: RwLock::new(entries),
        }
    }

    pub async fn entries(&self) -> Vec<JournalEntry> {
        self.entries.read().await.clone()
    }

    /// Saves `verse` with an empty note. Without a mood label the entry is filed
    /// under `DEFAULT_MOOD_LABEL`.
    pub async fn add(
        &self,
        verse: HydratedVerse,
        mood_label: Option<&str>,
    ) -> Result<JournalEntry, JournalError> {
        let mut entries = self.entries.write().await;

        if entries
            .iter()
            .any(|entry| entry.verse.reference == verse.reference)
        {
            return Err(JournalError::AlreadyExists(verse.reference));
        }

        let mood_label = mood_label
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .unwrap_or(DEFAULT_MOOD_LABEL)
            .to_string();
        let entry = JournalEntry {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            verse,
            note: String::new(),
            mood_label,
        };

        let mut updated = Vec::with_capacity(entries.len() + 1);
        updated.push(entry.clone());
        updated.extend(entries.iter().cloned());

        store::save_json(self.store.as_ref(), JOURNAL_KEY, &updated).await?;
        *entries = updated;
        Ok(entry)
    }

    /// Replaces the note of entry `id`. Unknown ids are ignored.
    pub async fn update_note(&self, id: Uuid, note: &str) -> Result<(), JournalError> {
        let mut entries = self.entries.write().await;
        if !entries.iter().any(|entry| entry.id == id) {
            return Ok(());
        }

        let updated: Vec<JournalEntry> = entries
            .iter()
            .map(|entry| {
                if entry.id == id {
                    JournalEntry {
                        note: note.to_string(),
                        ..entry.clone()
                    }
                } else {
                    entry.clone()
                }
            })
            .collect();

        store::save_json(self.store.as_ref(), JOURNAL_KEY, &updated).await?;
        *entries = updated;
        Ok(())
    }

    /// Deletes entry `id`. Unknown ids are ignored.
    pub async fn remove(&self, id: Uuid) -> Result<(), JournalError> {
        let mut entries = self.entries.write().await;
        if !entries.iter().any(|entry| entry.id == id) {
            return Ok(());
        }

        let updated: Vec<JournalEntry> = entries
            .iter()
            .filter(|entry| entry.id != id)
            .cloned()
            .collect();

        store::save_json(self.store.as_ref(), JOURNAL_KEY, &updated).await?;
        *entries = updated;
        Ok(())
    }

    /// References of every saved verse, as of the latest committed state.
    pub async fn saved_keys(&self) -> HashSet<Reference> {
        self.entries
            .read()
            .await
            .iter()
            .map(|entry| entry.verse.reference)
            .collect()
    }
}
