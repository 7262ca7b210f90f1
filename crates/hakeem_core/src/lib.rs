pub mod cache;
pub mod daily;
pub mod domain;
pub mod journal;
pub mod pipeline;
pub mod ports;
pub mod preferences;
pub mod refetch;
pub mod store;

pub use cache::ReferenceCache;
pub use daily::DailyPickStore;
pub use domain::{
    Chapter, DailyPick, DisplayPreferences, HydratedVerse, JournalEntry, Reference,
    ReferenceError, ResourceDescriptor, SearchMode, Suggestion, WordGloss,
};
pub use journal::{JournalError, JournalStore};
pub use pipeline::{Resolution, ResolutionPipeline, ResolveError};
pub use ports::{GuidanceService, KeyValueStore, PortError, PortResult, ScriptureService};
pub use preferences::PreferencesStore;
pub use refetch::{RefetchOutcome, SearchSession, SearchView};
pub use store::MemoryStore;
