pub mod journal;
pub mod reading;
pub mod rest;
pub mod state;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use state::AppState;

// Re-export the handlers to make them easily accessible.
pub use journal::{
    add_journal_handler, list_journal_handler, remove_journal_handler, saved_keys_handler,
    update_note_handler,
};
pub use rest::{
    current_results_handler, daily_handler, get_preferences_handler, guidance_handler,
    keyword_search_handler, save_preferences_handler,
};

/// Builds the API router over the shared state.
pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/guidance", post(guidance_handler))
        .route("/search", post(keyword_search_handler))
        .route("/results", get(current_results_handler))
        .route("/daily", get(daily_handler))
        .route(
            "/preferences",
            get(get_preferences_handler).put(save_preferences_handler),
        )
        .route(
            "/journal",
            get(list_journal_handler).post(add_journal_handler),
        )
        .route("/journal/keys", get(saved_keys_handler))
        .route("/journal/{id}/note", put(update_note_handler))
        .route("/journal/{id}", axum::routing::delete(remove_journal_handler))
        .route("/chapters", get(reading::list_chapters_handler))
        .route("/chapters/{id}/verses", get(reading::chapter_verses_handler))
        .route(
            "/verses/{chapter}/{verse}/commentary",
            get(reading::commentary_handler),
        )
        .route("/resources/translations", get(reading::translations_handler))
        .route("/resources/reciters", get(reading::reciters_handler))
        .route("/resources/tafsirs", get(reading::tafsirs_handler))
        .with_state(app_state)
}
