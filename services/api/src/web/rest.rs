//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for guided and keyword search, the daily verse and the
//! display preferences, and the master definition for the OpenAPI specification.

use crate::web::{journal, reading, state::AppState};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use hakeem_core::{
    preferences::merge_preferences, DisplayPreferences, HydratedVerse, RefetchOutcome,
    Resolution, ResolveError, SearchMode,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        guidance_handler,
        keyword_search_handler,
        current_results_handler,
        daily_handler,
        get_preferences_handler,
        save_preferences_handler,
        journal::list_journal_handler,
        journal::add_journal_handler,
        journal::update_note_handler,
        journal::remove_journal_handler,
        journal::saved_keys_handler,
        reading::list_chapters_handler,
        reading::chapter_verses_handler,
        reading::commentary_handler,
        reading::translations_handler,
        reading::reciters_handler,
        reading::tafsirs_handler,
    ),
    components(
        schemas(
            SearchRequest,
            SearchResponse,
            DailyResponse,
            PreferencesResponse,
            journal::AddJournalRequest,
            journal::AddJournalResponse,
            journal::NoteRequest,
            reading::CommentaryResponse,
        )
    ),
    tags(
        (name = "Hakeem API", description = "Verse guidance, keyword search, reading and journaling.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SearchRequest {
    pub query: String,
}

/// Verses for a search. `notice` is set when the search succeeded without results.
#[derive(Serialize, ToSchema)]
pub struct SearchResponse {
    #[schema(value_type = Vec<Object>)]
    pub verses: Vec<HydratedVerse>,
    pub notice: Option<String>,
}

impl From<Resolution> for SearchResponse {
    fn from(resolution: Resolution) -> Self {
        let notice = resolution.notice().map(str::to_string);
        Self {
            verses: resolution.into_verses(),
            notice,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct DailyResponse {
    #[schema(value_type = Option<Object>)]
    pub verse: Option<HydratedVerse>,
}

#[derive(Serialize, ToSchema)]
pub struct PreferencesResponse {
    #[schema(value_type = Object)]
    pub preferences: DisplayPreferences,
    /// The re-rendered results, when results were on screen and the refetch succeeded.
    #[schema(value_type = Option<Vec<Object>>)]
    pub refreshed: Option<Vec<HydratedVerse>>,
}

fn resolve_failure(e: ResolveError) -> (StatusCode, String) {
    let status = match &e {
        ResolveError::EmptyQuery => StatusCode::BAD_REQUEST,
        ResolveError::GuidanceUnavailable(_) | ResolveError::SearchUnavailable(_) => {
            error!("Search failed: {}", e);
            StatusCode::BAD_GATEWAY
        }
    };
    (status, e.user_message().to_string())
}

async fn run_search(
    app_state: &AppState,
    mode: SearchMode,
    query: &str,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let prefs = app_state.preferences.current().await;
    let resolution = app_state
        .search
        .search(&app_state.pipeline, mode, query, &prefs)
        .await
        .map_err(resolve_failure)?;
    Ok(Json(resolution.into()))
}

//=========================================================================================
// Search Handlers
//=========================================================================================

/// Find verses for a feeling or situation.
#[utoipa::path(
    post,
    path = "/guidance",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Verses, or a notice when nothing fits", body = SearchResponse),
        (status = 400, description = "Empty query"),
        (status = 502, description = "The AI layer is unavailable")
    )
)]
pub async fn guidance_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    run_search(&app_state, SearchMode::Guided, &req.query).await
}

/// Literal keyword search.
#[utoipa::path(
    post,
    path = "/search",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Up to five matching verses, or a notice", body = SearchResponse),
        (status = 400, description = "Empty query"),
        (status = 502, description = "The search backend is unavailable")
    )
)]
pub async fn keyword_search_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    run_search(&app_state, SearchMode::Keyword, &req.query).await
}

/// The results currently on screen.
#[utoipa::path(
    get,
    path = "/results",
    responses((status = 200, description = "Current results", body = SearchResponse))
)]
pub async fn current_results_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let view = app_state.search.view().await;
    Json(SearchResponse {
        verses: view.results,
        notice: None,
    })
}

//=========================================================================================
// Daily Verse Handler
//=========================================================================================

/// Today's verse. Absent when it could not be produced; this is never an error.
#[utoipa::path(
    get,
    path = "/daily",
    responses((status = 200, description = "Today's verse, if any", body = DailyResponse))
)]
pub async fn daily_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let prefs = app_state.preferences.current().await;
    let verse = app_state.daily.get_or_refresh(&prefs).await;
    Json(DailyResponse { verse })
}

//=========================================================================================
// Preferences Handlers
//=========================================================================================

#[utoipa::path(
    get,
    path = "/preferences",
    responses((status = 200, description = "Current display preferences", body = Object))
)]
pub async fn get_preferences_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(app_state.preferences.current().await)
}

/// Save display preferences and re-render the results on screen.
///
/// Ids that are missing, zero or not numbers are replaced by their defaults.
/// `showTafsir` is left as it was unless the body sets it.
#[utoipa::path(
    put,
    path = "/preferences",
    request_body = Object,
    responses(
        (status = 200, description = "Stored preferences and refreshed results", body = PreferencesResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn save_preferences_handler(
    State(app_state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let current = app_state.preferences.current().await;
    let preferences = app_state
        .preferences
        .save(merge_preferences(&current, &body))
        .await
        .map_err(|e| {
            error!("Failed to save preferences: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to save preferences".to_string(),
            )
        })?;
    info!("Preferences saved: {:?}", preferences);

    let refreshed = match app_state
        .search
        .apply_preferences(&app_state.pipeline, &preferences)
        .await
    {
        RefetchOutcome::Refreshed(verses) => Some(verses),
        RefetchOutcome::Skipped => None,
        RefetchOutcome::Failed => {
            warn!("Keeping previous results after failed refetch");
            None
        }
    };

    Ok(Json(PreferencesResponse {
        preferences,
        refreshed,
    }))
}
