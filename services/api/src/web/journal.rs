//! services/api/src/web/journal.rs
//!
//! Journal endpoints: list, add, annotate and delete saved verses.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use hakeem_core::{journal::SAVED_NOTICE, HydratedVerse, JournalEntry, JournalError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct AddJournalRequest {
    #[schema(value_type = Object)]
    pub verse: HydratedVerse,
    /// Defaults to the active search query.
    pub mood: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct AddJournalResponse {
    #[schema(value_type = Object)]
    pub entry: JournalEntry,
    pub notice: String,
}

#[derive(Deserialize, ToSchema)]
pub struct NoteRequest {
    pub note: String,
}

fn storage_failure(e: JournalError) -> (StatusCode, String) {
    error!("Journal update failed: {:?}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Failed to update the journal".to_string(),
    )
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /journal - Saved verses, most recent first
#[utoipa::path(
    get,
    path = "/journal",
    responses((status = 200, description = "Journal entries", body = Vec<Object>))
)]
pub async fn list_journal_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.journal.entries().await)
}

/// POST /journal - Save a verse
#[utoipa::path(
    post,
    path = "/journal",
    request_body = AddJournalRequest,
    responses(
        (status = 201, description = "Saved", body = AddJournalResponse),
        (status = 409, description = "Already in your journal"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn add_journal_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddJournalRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mood = match req.mood {
        Some(mood) => mood,
        None => state.search.view().await.query,
    };

    match state.journal.add(req.verse, Some(&mood)).await {
        Ok(entry) => {
            info!("Saved {} to the journal", entry.verse.reference);
            Ok((
                StatusCode::CREATED,
                Json(AddJournalResponse {
                    entry,
                    notice: SAVED_NOTICE.to_string(),
                }),
            ))
        }
        Err(e @ JournalError::AlreadyExists(_)) => Err((StatusCode::CONFLICT, e.to_string())),
        Err(e) => Err(storage_failure(e)),
    }
}

/// PUT /journal/{id}/note - Replace the note of an entry
#[utoipa::path(
    put,
    path = "/journal/{id}/note",
    request_body = NoteRequest,
    params(("id" = Uuid, Path, description = "Journal entry id")),
    responses(
        (status = 204, description = "Updated (or no such entry)"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn update_note_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<NoteRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state
        .journal
        .update_note(id, &req.note)
        .await
        .map_err(storage_failure)?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /journal/{id} - Remove an entry
#[utoipa::path(
    delete,
    path = "/journal/{id}",
    params(("id" = Uuid, Path, description = "Journal entry id")),
    responses(
        (status = 204, description = "Removed (or no such entry)"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn remove_journal_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state.journal.remove(id).await.map_err(storage_failure)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /journal/keys - `chapter:verse` keys of all saved verses, sorted
#[utoipa::path(
    get,
    path = "/journal/keys",
    responses((status = 200, description = "Saved verse keys", body = Vec<String>))
)]
pub async fn saved_keys_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut keys: Vec<_> = state.journal.saved_keys().await.into_iter().collect();
    keys.sort();
    Json(keys.iter().map(|r| r.key()).collect::<Vec<_>>())
}
