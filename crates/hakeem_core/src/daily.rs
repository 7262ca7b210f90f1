//! crates/hakeem_core/src/daily.rs
//!
//! The verse of the day. At most one AI call per calendar day; the date is the
//! local device date in `YYYY-MM-DD` form.

use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::{DailyPick, DisplayPreferences, HydratedVerse, DEFAULT_RECITER_ID};
use crate::pipeline::ResolutionPipeline;
use crate::ports::KeyValueStore;
use crate::store::{self, DAILY_PICK_KEY};

pub struct DailyPickStore {
    store: Arc<dyn KeyValueStore>,
    pipeline: Arc<ResolutionPipeline>,
    /// Held while a new pick is chosen, so concurrent callers share one AI call.
    refresh: Mutex<()>,
}

impl DailyPickStore {
    pub fn new(store: Arc<dyn KeyValueStore>, pipeline: Arc<ResolutionPipeline>) -> Self {
        Self {
            store,
            pipeline,
            refresh: Mutex::new(()),
        }
    }

    /// The stored verse, if it was picked for `iso_date`.
    async fn stored_pick(&self, iso_date: &str) -> Option<HydratedVerse> {
        match store::load_json::<DailyPick>(self.store.as_ref(), DAILY_PICK_KEY).await {
            Some(DailyPick {
                iso_date: stored_date,
                verse: Some(verse),
            }) if stored_date == iso_date => Some(verse),
            _ => None,
        }
    }

    /// Today's verse, choosing and persisting a new one if the stored pick is stale.
    pub async fn get_or_refresh(&self, prefs: &DisplayPreferences) -> Option<HydratedVerse> {
        self.get_or_refresh_on(Local::now().date_naive(), prefs)
            .await
    }

    /// Same as `get_or_refresh`, for an explicit calendar date.
    ///
    /// Failures are soft: the stored pick is left untouched and `None` is returned.
    pub async fn get_or_refresh_on(
        &self,
        today: NaiveDate,
        prefs: &DisplayPreferences,
    ) -> Option<HydratedVerse> {
        let iso_date = today.format("%Y-%m-%d").to_string();

        if let Some(verse) = self.stored_pick(&iso_date).await {
            return Some(verse);
        }

        let _refresh = self.refresh.lock().await;
        // Another caller may have picked today's verse while we waited.
        if let Some(verse) = self.stored_pick(&iso_date).await {
            debug!("Daily verse for {} was chosen concurrently", iso_date);
            return Some(verse);
        }

        let suggestion = match self.pipeline.guidance().suggest_for_today().await {
            Ok(Some(suggestion)) => suggestion,
            Ok(None) => {
                warn!("AI layer returned no daily verse");
                return None;
            }
            Err(e) => {
                warn!("Could not fetch daily verse: {:?}", e);
                return None;
            }
        };

        let verse = self
            .pipeline
            .resolve_by_references(&[suggestion], prefs.translation_id, DEFAULT_RECITER_ID)
            .await
            .into_iter()
            .next()?;

        let pick = DailyPick {
            iso_date,
            verse: Some(verse.clone()),
        };
        match store::save_json(self.store.as_ref(), DAILY_PICK_KEY, &pick).await {
            Ok(()) => info!("Daily verse for {} is {}", pick.iso_date, verse.reference),
            Err(e) => warn!("Failed to persist daily verse: {:?}", e),
        }
        Some(verse)
    }
}
