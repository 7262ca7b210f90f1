//! crates/hakeem_core/src/pipeline.rs
//!
//! The resolution pipeline: turns a free-text query, a keyword or a list of known
//! references into display-ready verses.
//!
//! Guided resolution is two-staged. The AI layer maps the query to suggestions, which
//! are written to the `ReferenceCache`, and then every suggestion is hydrated against
//! the content service concurrently. Only a failure of the first stage is an error;
//! a reference that fails to hydrate is dropped from the result.

use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::ReferenceCache;
use crate::domain::{
    Chapter, HydratedVerse, Reference, Suggestion, CHAPTER_COUNT, DEFAULT_TAFSIR_ID,
};
use crate::ports::{GuidanceService, PortError, PortResult, ScriptureService};

/// Maximum number of keyword hits that get hydrated.
pub const KEYWORD_RESULT_LIMIT: usize = 5;

//=========================================================================================
// Outcome and Error Types
//=========================================================================================

/// A successful resolution. The two empty conditions are distinct from an empty
/// `Verses` list, which only happens when every hydration failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Verses(Vec<HydratedVerse>),
    /// The AI layer answered with no suggestions.
    NoMatches,
    /// The literal search found nothing.
    NoKeywordMatches,
}

impl Resolution {
    pub fn verses(&self) -> &[HydratedVerse] {
        match self {
            Resolution::Verses(verses) => verses,
            _ => &[],
        }
    }

    pub fn into_verses(self) -> Vec<HydratedVerse> {
        match self {
            Resolution::Verses(verses) => verses,
            _ => Vec::new(),
        }
    }

    /// The message shown to the user for an empty condition.
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            Resolution::Verses(_) => None,
            Resolution::NoMatches => Some(
                "I couldn't find a direct connection in the Quran for that specific query. Try rephrasing.",
            ),
            Resolution::NoKeywordMatches => Some("No verses found matching your keyword."),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The AI layer was unreachable or answered with a malformed payload.
    #[error("Guidance unavailable: {0}")]
    GuidanceUnavailable(#[source] PortError),
    /// The content service's literal search failed.
    #[error("Keyword search unavailable: {0}")]
    SearchUnavailable(#[source] PortError),
    #[error("The query is empty")]
    EmptyQuery,
}

impl ResolveError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ResolveError::GuidanceUnavailable(_) => {
                "Unable to retrieve spiritual guidance at this moment."
            }
            ResolveError::SearchUnavailable(_) => {
                "Something went wrong while searching. Please check your connection."
            }
            ResolveError::EmptyQuery => "Please describe your situation or enter a keyword.",
        }
    }
}

//=========================================================================================
// The Pipeline
//=========================================================================================

/// Orchestrates the AI layer and the content service.
///
/// The pipeline is the only writer of the `ReferenceCache` it is constructed with.
pub struct ResolutionPipeline {
    guidance: Arc<dyn GuidanceService>,
    scripture: Arc<dyn ScriptureService>,
    cache: Arc<ReferenceCache>,
}

impl ResolutionPipeline {
    pub fn new(
        guidance: Arc<dyn GuidanceService>,
        scripture: Arc<dyn ScriptureService>,
        cache: Arc<ReferenceCache>,
    ) -> Self {
        Self {
            guidance,
            scripture,
            cache,
        }
    }

    pub fn cache(&self) -> &ReferenceCache {
        &self.cache
    }

    pub fn guidance(&self) -> &Arc<dyn GuidanceService> {
        &self.guidance
    }

    pub fn scripture(&self) -> &Arc<dyn ScriptureService> {
        &self.scripture
    }

    /// Resolves a description of a feeling or situation into verses.
    ///
    /// The previous suggestion set is discarded before the AI layer is called, and a
    /// non-empty answer is cached before hydration starts.
    pub async fn resolve_by_text(
        &self,
        query: &str,
        translation_id: u32,
        reciter_id: u32,
    ) -> Result<Resolution, ResolveError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ResolveError::EmptyQuery);
        }

        self.cache.clear().await;

        let suggestions = self
            .guidance
            .suggest_for_query(query)
            .await
            .map_err(ResolveError::GuidanceUnavailable)?;

        if suggestions.is_empty() {
            info!("No suggestions for query '{}'", query);
            return Ok(Resolution::NoMatches);
        }

        info!("AI layer suggested {} references", suggestions.len());
        self.cache.replace(suggestions.clone()).await;

        let verses = self
            .resolve_by_references(&suggestions, translation_id, reciter_id)
            .await;
        Ok(Resolution::Verses(verses))
    }

    /// Hydrates known suggestions. No AI call, no cache write.
    ///
    /// All hydrations run concurrently and are joined once every one has settled;
    /// the result keeps the input order with failed references left out.
    pub async fn resolve_by_references(
        &self,
        suggestions: &[Suggestion],
        translation_id: u32,
        reciter_id: u32,
    ) -> Vec<HydratedVerse> {
        let hydrations = suggestions
            .iter()
            .map(|suggestion| self.hydrate(suggestion, translation_id, reciter_id));

        join_all(hydrations).await.into_iter().flatten().collect()
    }

    /// Literal keyword search, hydrating at most `KEYWORD_RESULT_LIMIT` hits.
    pub async fn resolve_by_keyword(
        &self,
        query: &str,
        translation_id: u32,
        reciter_id: u32,
    ) -> Result<Resolution, ResolveError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ResolveError::EmptyQuery);
        }

        let hits = self
            .scripture
            .search_text(query)
            .await
            .map_err(ResolveError::SearchUnavailable)?;

        if hits.is_empty() {
            info!("No keyword matches for '{}'", query);
            return Ok(Resolution::NoKeywordMatches);
        }

        let suggestions: Vec<Suggestion> = hits
            .into_iter()
            .take(KEYWORD_RESULT_LIMIT)
            .map(Suggestion::bare)
            .collect();

        let verses = self
            .resolve_by_references(&suggestions, translation_id, reciter_id)
            .await;
        Ok(Resolution::Verses(verses))
    }

    async fn hydrate(
        &self,
        suggestion: &Suggestion,
        translation_id: u32,
        reciter_id: u32,
    ) -> Option<HydratedVerse> {
        let reference = suggestion.reference;
        match self
            .scripture
            .get_verse(reference, translation_id, reciter_id)
            .await
        {
            Ok(Some(mut verse)) if verse.is_displayable() => {
                verse.rationale = suggestion.rationale.clone();
                Some(verse)
            }
            Ok(Some(_)) => {
                warn!("Content service returned an empty verse for {}", reference);
                None
            }
            Ok(None) => {
                debug!("Content service has no verse {}", reference);
                None
            }
            Err(e) => {
                warn!("Failed to hydrate {}: {:?}", reference, e);
                None
            }
        }
    }

    //-------------------------------------------------------------------------------------
    // Chapter browsing and commentary
    //-------------------------------------------------------------------------------------

    pub async fn list_chapters(&self) -> PortResult<Vec<Chapter>> {
        self.scripture.list_chapters().await
    }

    /// One page of a chapter. Verses carry no rationale.
    pub async fn read_chapter(
        &self,
        chapter_id: u16,
        translation_id: u32,
        reciter_id: u32,
        page: u32,
    ) -> PortResult<Vec<HydratedVerse>> {
        if !(1..=CHAPTER_COUNT).contains(&chapter_id) {
            return Err(PortError::NotFound(format!("Chapter {}", chapter_id)));
        }

        let verses = self
            .scripture
            .get_chapter_verses(chapter_id, translation_id, reciter_id, page.max(1))
            .await?;

        Ok(verses
            .into_iter()
            .map(|mut verse| {
                verse.rationale.clear();
                verse
            })
            .collect())
    }

    /// Commentary for a verse; a zero tafsir id falls back to the default.
    /// Blank commentary counts as absent.
    pub async fn commentary(
        &self,
        reference: Reference,
        tafsir_id: u32,
    ) -> PortResult<Option<String>> {
        let tafsir_id = if tafsir_id == 0 {
            DEFAULT_TAFSIR_ID
        } else {
            tafsir_id
        };

        let text = self.scripture.get_commentary(reference, tafsir_id).await?;
        Ok(text.filter(|t| !t.trim().is_empty()))
    }
}
