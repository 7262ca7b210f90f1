//! crates/hakeem_core/src/preferences.rs
//!
//! Display preferences, persisted across restarts. Stored values are merged over the
//! defaults field by field, so a zero, missing or malformed id never reaches a caller.

use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::domain::{
    DisplayPreferences, DEFAULT_RECITER_ID, DEFAULT_TAFSIR_ID, DEFAULT_TRANSLATION_ID,
};
use crate::ports::{KeyValueStore, PortResult};
use crate::store::{self, PREFERENCES_KEY};

/// Builds preferences from a stored JSON value, falling back to the default for every
/// field that is not a positive id (or a boolean, for `showTafsir`).
pub fn coerce_preferences(value: &Value) -> DisplayPreferences {
    coerce_with(value, false)
}

/// Applies a preferences update over `current`.
///
/// Ids are coerced as in `coerce_preferences`; `showTafsir` keeps its current value
/// when the update does not carry a boolean for it.
pub fn merge_preferences(current: &DisplayPreferences, update: &Value) -> DisplayPreferences {
    coerce_with(update, current.show_tafsir)
}

fn coerce_with(value: &Value, show_tafsir: bool) -> DisplayPreferences {
    let Some(fields) = value.as_object() else {
        warn!("Preferences are not an object, resetting to defaults");
        return DisplayPreferences {
            show_tafsir,
            ..DisplayPreferences::default()
        };
    };

    let id = |name: &str, default: u32| {
        fields
            .get(name)
            .and_then(Value::as_u64)
            .filter(|id| *id > 0)
            .and_then(|id| u32::try_from(id).ok())
            .unwrap_or(default)
    };

    DisplayPreferences {
        translation_id: id("translationId", DEFAULT_TRANSLATION_ID),
        reciter_id: id("reciterId", DEFAULT_RECITER_ID),
        tafsir_id: id("tafsirId", DEFAULT_TAFSIR_ID),
        show_tafsir: fields
            .get("showTafsir")
            .and_then(Value::as_bool)
            .unwrap_or(show_tafsir),
    }
}

pub struct PreferencesStore {
    store: Arc<dyn KeyValueStore>,
    current: RwLock<DisplayPreferences>,
}

impl PreferencesStore {
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let current = match store.get(PREFERENCES_KEY).await {
            Ok(Some(value)) => coerce_preferences(&value),
            Ok(None) => DisplayPreferences::default(),
            Err(e) => {
                warn!("Failed to read preferences, using defaults: {:?}", e);
                DisplayPreferences::default()
            }
        };
        info!("Display preferences: {:?}", current);
        Self {
            store,
            current: RwLock::new(current),
        }
    }

    pub async fn current(&self) -> DisplayPreferences {
        *self.current.read().await
    }

    /// Overwrites the preferences wholesale and returns what was actually stored.
    pub async fn save(&self, prefs: DisplayPreferences) -> PortResult<DisplayPreferences> {
        let prefs = prefs.sanitized();
        let mut current = self.current.write().await;
        store::save_json(self.store.as_ref(), PREFERENCES_KEY, &prefs).await?;
        *current = prefs;
        Ok(prefs)
    }
}
