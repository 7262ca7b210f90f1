//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use hakeem_core::{
    ports::{GuidanceService, KeyValueStore, ScriptureService},
    DailyPickStore, JournalStore, PreferencesStore, ReferenceCache, ResolutionPipeline,
    SearchSession,
};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
///
/// The service is a single-user backend, so the on-screen search and the reference
/// cache are process-wide.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ResolutionPipeline>,
    pub search: Arc<SearchSession>,
    pub journal: Arc<JournalStore>,
    pub preferences: Arc<PreferencesStore>,
    pub daily: Arc<DailyPickStore>,
}

impl AppState {
    /// Wires the core around the given adapters and loads the persisted user state.
    pub async fn new(
        guidance: Arc<dyn GuidanceService>,
        scripture: Arc<dyn ScriptureService>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let pipeline = Arc::new(ResolutionPipeline::new(
            guidance,
            scripture,
            Arc::new(ReferenceCache::new()),
        ));

        Self {
            search: Arc::new(SearchSession::new()),
            journal: Arc::new(JournalStore::load(store.clone()).await),
            preferences: Arc::new(PreferencesStore::load(store.clone()).await),
            daily: Arc::new(DailyPickStore::new(store, pipeline.clone())),
            pipeline,
        }
    }
}
