//! crates/hakeem_core/src/domain.rs
//!
//! Defines the core data structures for the application.
//! These structs carry serde derives only because the key-value contract persists
//! them as JSON; they know nothing about any particular storage backend or API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Number of chapters in the scripture; valid chapter numbers are `1..=CHAPTER_COUNT`.
pub const CHAPTER_COUNT: u16 = 114;

pub const DEFAULT_TRANSLATION_ID: u32 = 131; // The Clear Quran
pub const DEFAULT_RECITER_ID: u32 = 7; // Mishary Rashid Alafasy
pub const DEFAULT_TAFSIR_ID: u32 = 169; // Ibn Kathir (English)

/// Mood label used for journal entries saved while no query is active.
pub const DEFAULT_MOOD_LABEL: &str = "Daily Reflection";

//=========================================================================================
// Reference
//=========================================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("Chapter {0} is outside 1..=114")]
    ChapterOutOfRange(i64),
    #[error("Verse {0} must be a positive number")]
    VerseOutOfRange(i64),
    #[error("'{0}' is not a chapter:verse key")]
    InvalidKey(String),
}

/// A (chapter, verse) address. The natural key for a verse throughout the system.
///
/// The upper bound of the verse number depends on the chapter length, which only the
/// content service knows; here we only reject values that can never be valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ReferenceParts")]
pub struct Reference {
    chapter_number: u16,
    verse_number: u16,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReferenceParts {
    chapter_number: i64,
    verse_number: i64,
}

impl TryFrom<ReferenceParts> for Reference {
    type Error = ReferenceError;

    fn try_from(parts: ReferenceParts) -> Result<Self, Self::Error> {
        Self::new(parts.chapter_number, parts.verse_number)
    }
}

impl Reference {
    pub fn new(chapter: i64, verse: i64) -> Result<Self, ReferenceError> {
        if !(1..=i64::from(CHAPTER_COUNT)).contains(&chapter) {
            return Err(ReferenceError::ChapterOutOfRange(chapter));
        }
        if !(1..=i64::from(u16::MAX)).contains(&verse) {
            return Err(ReferenceError::VerseOutOfRange(verse));
        }
        Ok(Self {
            chapter_number: chapter as u16,
            verse_number: verse as u16,
        })
    }

    /// Parses a `"chapter:verse"` key such as `"2:255"`.
    pub fn parse_key(key: &str) -> Result<Self, ReferenceError> {
        let (chapter, verse) = key
            .split_once(':')
            .ok_or_else(|| ReferenceError::InvalidKey(key.to_string()))?;
        let chapter = chapter
            .trim()
            .parse::<i64>()
            .map_err(|_| ReferenceError::InvalidKey(key.to_string()))?;
        let verse = verse
            .trim()
            .parse::<i64>()
            .map_err(|_| ReferenceError::InvalidKey(key.to_string()))?;
        Self::new(chapter, verse)
    }

    pub fn chapter(&self) -> u16 {
        self.chapter_number
    }

    pub fn verse(&self) -> u16 {
        self.verse_number
    }

    /// The `"chapter:verse"` form used by the content service.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chapter_number, self.verse_number)
    }
}

//=========================================================================================
// Suggestion and Hydrated Verse
//=========================================================================================

/// A reference proposed by the AI layer, together with its short rationale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub reference: Reference,
    pub rationale: String,
}

impl Suggestion {
    pub fn new(reference: Reference, rationale: impl Into<String>) -> Self {
        Self {
            reference,
            rationale: rationale.into(),
        }
    }

    /// A suggestion without rationale, as produced by literal keyword search.
    pub fn bare(reference: Reference) -> Self {
        Self::new(reference, String::new())
    }
}

/// One word of a verse with its gloss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordGloss {
    pub text: String,
    pub gloss: String,
    pub transliteration: String,
}

/// The display-ready unit produced by hydration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HydratedVerse {
    pub reference: Reference,
    pub source_text: String,
    pub translation: String,
    pub audio_url: Option<String>,
    /// Empty when the verse came from literal search or chapter browsing.
    pub rationale: String,
    pub chapter_name_english: String,
    pub chapter_name_arabic: String,
    #[serde(default)]
    pub words: Vec<WordGloss>,
}

impl HydratedVerse {
    /// A verse is only worth showing if it carries some text.
    pub fn is_displayable(&self) -> bool {
        !(self.source_text.trim().is_empty() && self.translation.trim().is_empty())
    }
}

//=========================================================================================
// Persisted Records
//=========================================================================================

/// The verse chosen for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPick {
    /// `YYYY-MM-DD`
    pub iso_date: String,
    pub verse: Option<HydratedVerse>,
}

/// A verse the user saved to their journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub verse: HydratedVerse,
    pub note: String,
    pub mood_label: String,
}

/// Rendering preferences chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayPreferences {
    pub translation_id: u32,
    pub reciter_id: u32,
    pub tafsir_id: u32,
    pub show_tafsir: bool,
}

impl Default for DisplayPreferences {
    fn default() -> Self {
        Self {
            translation_id: DEFAULT_TRANSLATION_ID,
            reciter_id: DEFAULT_RECITER_ID,
            tafsir_id: DEFAULT_TAFSIR_ID,
            show_tafsir: false,
        }
    }
}

impl DisplayPreferences {
    /// Replaces any zero id with its default.
    pub fn sanitized(self) -> Self {
        let or_default = |id: u32, default: u32| if id == 0 { default } else { id };
        Self {
            translation_id: or_default(self.translation_id, DEFAULT_TRANSLATION_ID),
            reciter_id: or_default(self.reciter_id, DEFAULT_RECITER_ID),
            tafsir_id: or_default(self.tafsir_id, DEFAULT_TAFSIR_ID),
            show_tafsir: self.show_tafsir,
        }
    }
}

/// Which entry point produced the results currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    #[default]
    Guided,
    Keyword,
}

//=========================================================================================
// Content Service Descriptors
//=========================================================================================

/// Chapter metadata as listed by the content service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: u16,
    pub name_english: String,
    pub name_arabic: String,
    pub translated_name: String,
    pub verse_count: u16,
    pub revelation_place: String,
}

/// A translation, reciter or tafsir offered by the content service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    pub id: u32,
    pub name: String,
    pub author_name: Option<String>,
    pub language_name: Option<String>,
    /// Recitation style, only set for reciters.
    pub style: Option<String>,
}
