//! crates/hakeem_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the AI provider, the scripture API and the storage backend.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{Chapter, HydratedVerse, Reference, ResourceDescriptor, Suggestion};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Malformed payload: {0}")]
    Malformed(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The AI layer: maps free text to candidate references.
#[async_trait]
pub trait GuidanceService: Send + Sync {
    /// Returns references relevant to the user's feeling or situation, in relevance order.
    ///
    /// Any transport failure or payload that does not match the expected schema is an error;
    /// a well-formed empty list is not.
    async fn suggest_for_query(&self, text: &str) -> PortResult<Vec<Suggestion>>;

    /// Returns a single verse for today's reflection, if the model produced one.
    async fn suggest_for_today(&self) -> PortResult<Option<Suggestion>>;
}

/// The scripture content service.
#[async_trait]
pub trait ScriptureService: Send + Sync {
    /// Fetches one verse with the requested translation and recitation.
    /// `Ok(None)` means the service has no such verse.
    async fn get_verse(
        &self,
        reference: Reference,
        translation_id: u32,
        reciter_id: u32,
    ) -> PortResult<Option<HydratedVerse>>;

    /// Fetches one page of a chapter, in verse order.
    async fn get_chapter_verses(
        &self,
        chapter_id: u16,
        translation_id: u32,
        reciter_id: u32,
        page: u32,
    ) -> PortResult<Vec<HydratedVerse>>;

    /// Literal text search. Truncation is the caller's job.
    async fn search_text(&self, query: &str) -> PortResult<Vec<Reference>>;

    async fn list_chapters(&self) -> PortResult<Vec<Chapter>>;

    async fn list_translations(&self) -> PortResult<Vec<ResourceDescriptor>>;

    async fn list_reciters(&self) -> PortResult<Vec<ResourceDescriptor>>;

    async fn list_tafsirs(&self) -> PortResult<Vec<ResourceDescriptor>>;

    /// Fetches commentary (rich text) for a verse.
    async fn get_commentary(&self, reference: Reference, tafsir_id: u32)
        -> PortResult<Option<String>>;
}

/// Durable key-value storage for user-owned state.
///
/// Writers always hand over the full value for a key; there is no partial update.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> PortResult<Option<Value>>;

    async fn put(&self, key: &str, value: Value) -> PortResult<()>;
}
