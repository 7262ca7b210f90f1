//! services/api/src/web/reading.rs
//!
//! Sequential reading: chapter list, chapter pages, commentary, and the resource
//! listings the settings screen offers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use hakeem_core::{PortError, Reference};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use crate::web::state::AppState;

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct CommentaryResponse {
    pub reference: String,
    pub tafsir_id: u32,
    /// Rich text (HTML), absent when the tafsir has nothing for this verse.
    pub text: Option<String>,
}

fn port_failure(context: &'static str) -> impl Fn(PortError) -> (StatusCode, String) {
    move |e| match e {
        PortError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found", what)),
        other => {
            error!("{}: {:?}", context, other);
            (StatusCode::BAD_GATEWAY, context.to_string())
        }
    }
}

/// GET /chapters - All chapters
#[utoipa::path(
    get,
    path = "/chapters",
    responses(
        (status = 200, description = "Chapter list", body = Vec<Object>),
        (status = 502, description = "Content service unavailable")
    )
)]
pub async fn list_chapters_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let chapters = state
        .pipeline
        .list_chapters()
        .await
        .map_err(port_failure("Failed to fetch chapters"))?;
    Ok(Json(chapters))
}

/// GET /chapters/{id}/verses - One page of a chapter, rendered with the current preferences
#[utoipa::path(
    get,
    path = "/chapters/{id}/verses",
    params(
        ("id" = u16, Path, description = "Chapter number (1-114)"),
        ("page" = Option<u32>, Query, description = "Page number, 50 verses per page")
    ),
    responses(
        (status = 200, description = "Verses", body = Vec<Object>),
        (status = 404, description = "No such chapter"),
        (status = 502, description = "Content service unavailable")
    )
)]
pub async fn chapter_verses_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u16>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let prefs = state.preferences.current().await;
    let verses = state
        .pipeline
        .read_chapter(
            id,
            prefs.translation_id,
            prefs.reciter_id,
            query.page.unwrap_or(1),
        )
        .await
        .map_err(port_failure("Failed to fetch chapter verses"))?;
    Ok(Json(verses))
}

/// GET /verses/{chapter}/{verse}/commentary - Commentary from the preferred tafsir
#[utoipa::path(
    get,
    path = "/verses/{chapter}/{verse}/commentary",
    params(
        ("chapter" = i64, Path, description = "Chapter number"),
        ("verse" = i64, Path, description = "Verse number")
    ),
    responses(
        (status = 200, description = "Commentary", body = CommentaryResponse),
        (status = 400, description = "Invalid reference"),
        (status = 502, description = "Content service unavailable")
    )
)]
pub async fn commentary_handler(
    State(state): State<Arc<AppState>>,
    Path((chapter, verse)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let reference =
        Reference::new(chapter, verse).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let tafsir_id = state.preferences.current().await.tafsir_id;

    let text = state
        .pipeline
        .commentary(reference, tafsir_id)
        .await
        .map_err(port_failure("Failed to fetch commentary"))?;

    Ok(Json(CommentaryResponse {
        reference: reference.key(),
        tafsir_id,
        text,
    }))
}

/// GET /resources/translations
#[utoipa::path(
    get,
    path = "/resources/translations",
    responses((status = 200, description = "Available translations", body = Vec<Object>))
)]
pub async fn translations_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let translations = state
        .pipeline
        .scripture()
        .list_translations()
        .await
        .map_err(port_failure("Failed to fetch translations"))?;
    Ok(Json(translations))
}

/// GET /resources/reciters
#[utoipa::path(
    get,
    path = "/resources/reciters",
    responses((status = 200, description = "Available reciters", body = Vec<Object>))
)]
pub async fn reciters_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let reciters = state
        .pipeline
        .scripture()
        .list_reciters()
        .await
        .map_err(port_failure("Failed to fetch reciters"))?;
    Ok(Json(reciters))
}

/// GET /resources/tafsirs
#[utoipa::path(
    get,
    path = "/resources/tafsirs",
    responses((status = 200, description = "Available tafsirs", body = Vec<Object>))
)]
pub async fn tafsirs_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let tafsirs = state
        .pipeline
        .scripture()
        .list_tafsirs()
        .await
        .map_err(port_failure("Failed to fetch tafsirs"))?;
    Ok(Json(tafsirs))
}
