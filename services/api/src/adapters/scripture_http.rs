//! services/api/src/adapters/scripture_http.rs
//!
//! This module contains the adapter for the quran.com v4 REST API.
//! It implements the `ScriptureService` port from the `core` crate.

use async_trait::async_trait;
use hakeem_core::{
    domain::{Chapter, HydratedVerse, Reference, ResourceDescriptor, WordGloss},
    ports::{PortError, PortResult, ScriptureService},
};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, warn};

/// Verses per page when reading a chapter.
pub const CHAPTER_PAGE_SIZE: u32 = 50;

/// Hits requested from the search endpoint. The pipeline only hydrates the first few.
const SEARCH_PAGE_SIZE: u32 = 20;

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Deserialize)]
struct VerseEnvelope {
    verse: Option<VerseDto>,
}

#[derive(Deserialize)]
struct VersesEnvelope {
    #[serde(default)]
    verses: Vec<VerseDto>,
}

#[derive(Deserialize)]
struct VerseDto {
    verse_key: String,
    text_uthmani: Option<String>,
    #[serde(default)]
    words: Vec<WordDto>,
    #[serde(default)]
    translations: Vec<TextDto>,
    audio: Option<AudioDto>,
}

#[derive(Deserialize)]
struct WordDto {
    char_type_name: Option<String>,
    text_uthmani: Option<String>,
    text: Option<String>,
    translation: Option<TextDto>,
    transliteration: Option<TextDto>,
}

#[derive(Deserialize)]
struct TextDto {
    text: Option<String>,
}

#[derive(Deserialize)]
struct AudioDto {
    url: Option<String>,
}

#[derive(Deserialize)]
struct ChapterEnvelope {
    chapter: ChapterDto,
}

#[derive(Deserialize)]
struct ChaptersEnvelope {
    #[serde(default)]
    chapters: Vec<ChapterDto>,
}

#[derive(Deserialize)]
struct ChapterDto {
    id: u16,
    name_simple: String,
    #[serde(default)]
    name_arabic: String,
    #[serde(default)]
    verses_count: u16,
    #[serde(default)]
    revelation_place: String,
    translated_name: Option<TranslatedNameDto>,
}

#[derive(Deserialize)]
struct TranslatedNameDto {
    name: String,
}

#[derive(Deserialize)]
struct SearchEnvelope {
    search: SearchDto,
}

#[derive(Deserialize)]
struct SearchDto {
    #[serde(default)]
    results: Vec<SearchHitDto>,
}

#[derive(Deserialize)]
struct SearchHitDto {
    verse_key: String,
}

#[derive(Deserialize)]
struct ResourceDto {
    id: u32,
    name: Option<String>,
    reciter_name: Option<String>,
    author_name: Option<String>,
    language_name: Option<String>,
    style: Option<String>,
}

#[derive(Deserialize)]
struct TranslationsEnvelope {
    #[serde(default)]
    translations: Vec<ResourceDto>,
}

#[derive(Deserialize)]
struct RecitationsEnvelope {
    #[serde(default)]
    recitations: Vec<ResourceDto>,
}

#[derive(Deserialize)]
struct TafsirsEnvelope {
    #[serde(default)]
    tafsirs: Vec<ResourceDto>,
}

#[derive(Deserialize)]
struct CommentaryEnvelope {
    #[serde(default)]
    tafsirs: Vec<TextDto>,
}

//=========================================================================================
// Wire -> Domain Conversion
//=========================================================================================

/// Display names of a chapter, with a fallback when the chapter lookup failed.
struct ChapterNames {
    english: String,
    arabic: String,
}

impl ChapterNames {
    fn fallback(chapter: u16) -> Self {
        Self {
            english: format!("Surah {}", chapter),
            arabic: String::new(),
        }
    }
}

impl From<&ChapterDto> for ChapterNames {
    fn from(dto: &ChapterDto) -> Self {
        Self {
            english: dto.name_simple.clone(),
            arabic: dto.name_arabic.clone(),
        }
    }
}

/// Joins a relative audio path onto `audio_base`. Absolute and protocol-relative
/// URLs are kept as they are.
fn audio_locator(url: &str, audio_base: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else if let Some(rest) = url.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        format!("{}/{}", audio_base, url.trim_start_matches('/'))
    }
}

fn text_of(dto: Option<TextDto>) -> String {
    dto.and_then(|t| t.text).unwrap_or_default()
}

fn verse_from_dto(
    dto: VerseDto,
    names: &ChapterNames,
    audio_base: &str,
) -> PortResult<HydratedVerse> {
    let reference =
        Reference::parse_key(&dto.verse_key).map_err(|e| PortError::Malformed(e.to_string()))?;

    let words = dto
        .words
        .into_iter()
        // "end" entries are verse-number markers, not words.
        .filter(|w| w.char_type_name.as_deref() != Some("end"))
        .map(|w| WordGloss {
            text: w.text_uthmani.or(w.text).unwrap_or_default(),
            gloss: text_of(w.translation),
            transliteration: text_of(w.transliteration),
        })
        .collect();

    Ok(HydratedVerse {
        reference,
        source_text: dto.text_uthmani.unwrap_or_default(),
        translation: text_of(dto.translations.into_iter().next()),
        audio_url: dto
            .audio
            .and_then(|a| a.url)
            .filter(|url| !url.is_empty())
            .map(|url| audio_locator(&url, audio_base)),
        rationale: String::new(),
        chapter_name_english: names.english.clone(),
        chapter_name_arabic: names.arabic.clone(),
        words,
    })
}

impl From<ChapterDto> for Chapter {
    fn from(dto: ChapterDto) -> Self {
        Chapter {
            id: dto.id,
            translated_name: dto
                .translated_name
                .map(|t| t.name)
                .unwrap_or_else(|| dto.name_simple.clone()),
            name_english: dto.name_simple,
            name_arabic: dto.name_arabic,
            verse_count: dto.verses_count,
            revelation_place: dto.revelation_place,
        }
    }
}

impl From<ResourceDto> for ResourceDescriptor {
    fn from(dto: ResourceDto) -> Self {
        ResourceDescriptor {
            id: dto.id,
            name: dto
                .name
                .or(dto.reciter_name)
                .unwrap_or_else(|| format!("#{}", dto.id)),
            author_name: dto.author_name,
            language_name: dto.language_name,
            style: dto.style,
        }
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ScriptureService` against the quran.com v4 API.
#[derive(Clone)]
pub struct QuranComAdapter {
    http: Client,
    base_url: String,
    audio_base_url: String,
}

impl QuranComAdapter {
    /// Creates a new `QuranComAdapter`. Both URLs are expected without a trailing slash.
    pub fn new(http: Client, base_url: String, audio_base_url: String) -> Self {
        Self {
            http,
            base_url,
            audio_base_url,
        }
    }

    /// GETs `path` and decodes the body. A 404 is `Ok(None)`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> PortResult<Option<T>> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if !status.is_success() => Err(PortError::Unexpected(format!(
                "{} answered {}",
                url, status
            ))),
            _ => response
                .json::<T>()
                .await
                .map(Some)
                .map_err(|e| PortError::Malformed(e.to_string())),
        }
    }

    /// Chapter names for decorating verses. Failure is not fatal.
    async fn chapter_names(&self, chapter: u16) -> ChapterNames {
        match self
            .get_json::<ChapterEnvelope>(
                &format!("/chapters/{}", chapter),
                &[("language", "en".to_string())],
            )
            .await
        {
            Ok(Some(envelope)) => ChapterNames::from(&envelope.chapter),
            Ok(None) => ChapterNames::fallback(chapter),
            Err(e) => {
                warn!("Failed to fetch chapter {} info: {:?}", chapter, e);
                ChapterNames::fallback(chapter)
            }
        }
    }

    fn verse_query(translation_id: u32, reciter_id: u32) -> Vec<(&'static str, String)> {
        vec![
            ("language", "en".to_string()),
            ("words", "true".to_string()),
            ("translations", translation_id.to_string()),
            ("fields", "text_uthmani".to_string()),
            ("audio", reciter_id.to_string()),
        ]
    }
}

//=========================================================================================
// `ScriptureService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ScriptureService for QuranComAdapter {
    async fn get_verse(
        &self,
        reference: Reference,
        translation_id: u32,
        reciter_id: u32,
    ) -> PortResult<Option<HydratedVerse>> {
        let envelope = self
            .get_json::<VerseEnvelope>(
                &format!("/verses/by_key/{}", reference.key()),
                &Self::verse_query(translation_id, reciter_id),
            )
            .await?;

        let Some(dto) = envelope.and_then(|e| e.verse) else {
            return Ok(None);
        };

        let names = self.chapter_names(reference.chapter()).await;
        verse_from_dto(dto, &names, &self.audio_base_url).map(Some)
    }

    async fn get_chapter_verses(
        &self,
        chapter_id: u16,
        translation_id: u32,
        reciter_id: u32,
        page: u32,
    ) -> PortResult<Vec<HydratedVerse>> {
        let mut query = Self::verse_query(translation_id, reciter_id);
        query.push(("per_page", CHAPTER_PAGE_SIZE.to_string()));
        query.push(("page", page.to_string()));

        let envelope = self
            .get_json::<VersesEnvelope>(&format!("/verses/by_chapter/{}", chapter_id), &query)
            .await?
            .ok_or_else(|| PortError::NotFound(format!("Chapter {}", chapter_id)))?;

        let names = self.chapter_names(chapter_id).await;
        envelope
            .verses
            .into_iter()
            .map(|dto| verse_from_dto(dto, &names, &self.audio_base_url))
            .collect()
    }

    async fn search_text(&self, query: &str) -> PortResult<Vec<Reference>> {
        let envelope = self
            .get_json::<SearchEnvelope>(
                "/search",
                &[
                    ("q", query.to_string()),
                    ("size", SEARCH_PAGE_SIZE.to_string()),
                    ("page", "1".to_string()),
                    ("language", "en".to_string()),
                ],
            )
            .await?;

        let Some(envelope) = envelope else {
            return Ok(Vec::new());
        };

        // Hits with keys we cannot read are skipped rather than failing the search.
        Ok(envelope
            .search
            .results
            .into_iter()
            .filter_map(|hit| match Reference::parse_key(&hit.verse_key) {
                Ok(reference) => Some(reference),
                Err(e) => {
                    warn!("Skipping search hit: {}", e);
                    None
                }
            })
            .collect())
    }

    async fn list_chapters(&self) -> PortResult<Vec<Chapter>> {
        let envelope = self
            .get_json::<ChaptersEnvelope>("/chapters", &[("language", "en".to_string())])
            .await?;
        Ok(envelope
            .map(|e| e.chapters.into_iter().map(Chapter::from).collect())
            .unwrap_or_default())
    }

    async fn list_translations(&self) -> PortResult<Vec<ResourceDescriptor>> {
        let envelope = self
            .get_json::<TranslationsEnvelope>(
                "/resources/translations",
                &[("language", "en".to_string())],
            )
            .await?;
        Ok(envelope
            .map(|e| e.translations.into_iter().map(Into::into).collect())
            .unwrap_or_default())
    }

    async fn list_reciters(&self) -> PortResult<Vec<ResourceDescriptor>> {
        let envelope = self
            .get_json::<RecitationsEnvelope>(
                "/resources/recitations",
                &[("language", "en".to_string())],
            )
            .await?;
        Ok(envelope
            .map(|e| e.recitations.into_iter().map(Into::into).collect())
            .unwrap_or_default())
    }

    async fn list_tafsirs(&self) -> PortResult<Vec<ResourceDescriptor>> {
        let envelope = self
            .get_json::<TafsirsEnvelope>("/resources/tafsirs", &[])
            .await?;
        Ok(envelope
            .map(|e| e.tafsirs.into_iter().map(Into::into).collect())
            .unwrap_or_default())
    }

    async fn get_commentary(
        &self,
        reference: Reference,
        tafsir_id: u32,
    ) -> PortResult<Option<String>> {
        let envelope = self
            .get_json::<CommentaryEnvelope>(
                &format!("/quran/tafsirs/{}", tafsir_id),
                &[("verse_key", reference.key())],
            )
            .await?;

        Ok(envelope
            .and_then(|e| e.tafsirs.into_iter().next())
            .and_then(|t| t.text))
    }
}
