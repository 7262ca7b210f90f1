//! crates/hakeem_core/src/refetch.rs
//!
//! Tracks what the user is currently looking at and re-renders it when the display
//! preferences change.
//!
//! A preference change never goes back to the AI layer: guided results are replayed
//! from the `ReferenceCache`, keyword results by repeating the literal search.

use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::domain::{DisplayPreferences, HydratedVerse, SearchMode};
use crate::pipeline::{Resolution, ResolutionPipeline, ResolveError};

/// The search currently on screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchView {
    pub mode: SearchMode,
    pub query: String,
    pub results: Vec<HydratedVerse>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefetchOutcome {
    /// Nothing is shown, or there is nothing to replay.
    Skipped,
    /// The shown results were re-hydrated with the new preferences.
    Refreshed(Vec<HydratedVerse>),
    /// The refetch produced nothing; the previous results stay visible.
    Failed,
}

/// Re-hydrates `view` with `prefs`. Does not touch any state.
pub async fn refetch(
    pipeline: &ResolutionPipeline,
    view: &SearchView,
    prefs: &DisplayPreferences,
) -> RefetchOutcome {
    if view.results.is_empty() {
        return RefetchOutcome::Skipped;
    }

    let verses = match view.mode {
        SearchMode::Guided => {
            let cached = pipeline.cache().snapshot().await;
            if cached.is_empty() {
                return RefetchOutcome::Skipped;
            }
            pipeline
                .resolve_by_references(&cached, prefs.translation_id, prefs.reciter_id)
                .await
        }
        SearchMode::Keyword if !view.query.trim().is_empty() => {
            match pipeline
                .resolve_by_keyword(&view.query, prefs.translation_id, prefs.reciter_id)
                .await
            {
                Ok(resolution) => resolution.into_verses(),
                Err(e) => {
                    error!("Error refreshing results with new settings: {}", e);
                    return RefetchOutcome::Failed;
                }
            }
        }
        SearchMode::Keyword => return RefetchOutcome::Skipped,
    };

    if verses.is_empty() {
        warn!("Refetch with new settings produced no verses, keeping previous results");
        return RefetchOutcome::Failed;
    }
    RefetchOutcome::Refreshed(verses)
}

/// Owns the on-screen search state.
///
/// Overlapping searches are not serialised: whichever finishes last is what the view
/// shows. Every commit replaces the whole view.
#[derive(Debug, Default)]
pub struct SearchSession {
    view: RwLock<SearchView>,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn view(&self) -> SearchView {
        self.view.read().await.clone()
    }

    /// Runs a new search. The previous results are cleared before the first remote call.
    pub async fn search(
        &self,
        pipeline: &ResolutionPipeline,
        mode: SearchMode,
        query: &str,
        prefs: &DisplayPreferences,
    ) -> Result<Resolution, ResolveError> {
        let query = query.trim().to_string();
        *self.view.write().await = SearchView {
            mode,
            query: query.clone(),
            results: Vec::new(),
        };

        let outcome = match mode {
            SearchMode::Guided => {
                pipeline
                    .resolve_by_text(&query, prefs.translation_id, prefs.reciter_id)
                    .await
            }
            SearchMode::Keyword => {
                pipeline
                    .resolve_by_keyword(&query, prefs.translation_id, prefs.reciter_id)
                    .await
            }
        };

        if let Ok(resolution) = &outcome {
            *self.view.write().await = SearchView {
                mode,
                query,
                results: resolution.verses().to_vec(),
            };
        }
        outcome
    }

    /// Called after preferences are saved. Replaces the shown results only on success.
    pub async fn apply_preferences(
        &self,
        pipeline: &ResolutionPipeline,
        prefs: &DisplayPreferences,
    ) -> RefetchOutcome {
        let current = self.view().await;
        let outcome = refetch(pipeline, &current, prefs).await;

        if let RefetchOutcome::Refreshed(verses) = &outcome {
            info!("Refreshed {} verses with new settings", verses.len());
            *self.view.write().await = SearchView {
                mode: current.mode,
                query: current.query,
                results: verses.clone(),
            };
        }
        outcome
    }
}
