mod common;

use common::{reference, verse};
use hakeem_core::{
    domain::{DEFAULT_MOOD_LABEL, DEFAULT_TRANSLATION_ID},
    store::{JOURNAL_KEY, PREFERENCES_KEY},
    DisplayPreferences, JournalEntry, JournalError, JournalStore, KeyValueStore, MemoryStore,
    PreferencesStore,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

#[tokio::test]
async fn duplicate_add_is_rejected_with_notice() {
    let journal = JournalStore::load(Arc::new(MemoryStore::new())).await;

    journal.add(verse(2, 286), Some("I feel anxious")).await.unwrap();
    let err = journal
        .add(verse(2, 286), Some("I feel anxious"))
        .await
        .unwrap_err();

    assert!(matches!(err, JournalError::AlreadyExists(r) if r == reference(2, 286)));
    assert_eq!(err.to_string(), "Already in your journal");
    assert_eq!(journal.entries().await.len(), 1);
}

#[tokio::test]
async fn entries_are_most_recent_first_and_persisted() {
    let store = Arc::new(MemoryStore::new());
    let journal = JournalStore::load(store.clone()).await;

    let first = journal.add(verse(94, 5), Some("I need motivation")).await.unwrap();
    let second = journal.add(verse(13, 28), None).await.unwrap();

    assert_eq!(first.note, "");
    assert_eq!(first.mood_label, "I need motivation");
    assert_eq!(second.mood_label, DEFAULT_MOOD_LABEL);

    let persisted: Vec<JournalEntry> =
        serde_json::from_value(store.get(JOURNAL_KEY).await.unwrap().unwrap()).unwrap();
    let ids: Vec<Uuid> = persisted.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    // A fresh store sees the same journal.
    let reloaded = JournalStore::load(store).await;
    assert_eq!(reloaded.entries().await, persisted);
}

#[tokio::test]
async fn update_note_and_remove() {
    let journal = JournalStore::load(Arc::new(MemoryStore::new())).await;
    let entry = journal.add(verse(65, 3), None).await.unwrap();
    let other = journal.add(verse(39, 53), None).await.unwrap();

    journal.update_note(entry.id, "Trust the plan.").await.unwrap();
    journal.update_note(Uuid::new_v4(), "ignored").await.unwrap();

    let entries = journal.entries().await;
    let updated = entries.iter().find(|e| e.id == entry.id).unwrap();
    assert_eq!(updated.note, "Trust the plan.");
    assert_eq!(entries.iter().find(|e| e.id == other.id).unwrap().note, "");

    journal.remove(entry.id).await.unwrap();
    journal.remove(Uuid::new_v4()).await.unwrap();
    assert_eq!(journal.entries().await.len(), 1);
    assert!(!journal.saved_keys().await.contains(&reference(65, 3)));
}

#[tokio::test]
async fn saved_keys_track_latest_state() {
    let journal = JournalStore::load(Arc::new(MemoryStore::new())).await;
    journal.add(verse(1, 1), None).await.unwrap();
    journal.add(verse(2, 255), None).await.unwrap();

    let keys = journal.saved_keys().await;
    assert_eq!(keys, journal.saved_keys().await);
    assert!(keys.contains(&reference(1, 1)) && keys.contains(&reference(2, 255)));

    journal.add(verse(112, 1), None).await.unwrap();
    assert_eq!(journal.saved_keys().await.len(), 3);
}

#[tokio::test]
async fn corrupted_journal_loads_empty() {
    let store = Arc::new(MemoryStore::with_entries([(JOURNAL_KEY, json!({"not": "a list"}))]));
    let journal = JournalStore::load(store).await;
    assert!(journal.entries().await.is_empty());
}

#[tokio::test]
async fn preferences_never_store_zero_ids() {
    let store = Arc::new(MemoryStore::new());
    let preferences = PreferencesStore::load(store.clone()).await;
    assert_eq!(preferences.current().await, DisplayPreferences::default());

    let saved = preferences
        .save(DisplayPreferences {
            translation_id: 0,
            reciter_id: 5,
            tafsir_id: 170,
            show_tafsir: true,
        })
        .await
        .unwrap();

    assert_eq!(saved.translation_id, DEFAULT_TRANSLATION_ID);
    assert_eq!(preferences.current().await, saved);
    assert_eq!(
        store.get(PREFERENCES_KEY).await.unwrap(),
        Some(json!({
            "translationId": DEFAULT_TRANSLATION_ID,
            "reciterId": 5,
            "tafsirId": 170,
            "showTafsir": true
        }))
    );
}

#[tokio::test]
async fn stored_preferences_are_merged_over_defaults() {
    let store = Arc::new(MemoryStore::with_entries([(
        PREFERENCES_KEY,
        json!({ "translationId": 0, "reciterId": 9 }),
    )]));
    let preferences = PreferencesStore::load(store).await;

    let current = preferences.current().await;
    assert_eq!(current.translation_id, DEFAULT_TRANSLATION_ID);
    assert_eq!(current.reciter_id, 9);
}
