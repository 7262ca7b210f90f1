//! crates/hakeem_core/src/cache.rs
//!
//! Holds the suggestion set produced by the most recent guided search, so that a
//! change of display preferences can re-hydrate it without asking the AI layer again.

use tokio::sync::RwLock;

use crate::domain::Suggestion;

/// The last AI-produced suggestion list. Empty until the first guided search.
#[derive(Debug, Default)]
pub struct ReferenceCache {
    last: RwLock<Vec<Suggestion>>,
}

impl ReferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the cached set with `suggestions`. Never merges.
    pub async fn replace(&self, suggestions: Vec<Suggestion>) {
        *self.last.write().await = suggestions;
    }

    pub async fn clear(&self) {
        self.replace(Vec::new()).await;
    }

    /// A copy of the cached set.
    pub async fn snapshot(&self) -> Vec<Suggestion> {
        self.last.read().await.clone()
    }

    pub async fn is_empty(&self) -> bool {
        self.last.read().await.is_empty()
    }
}
