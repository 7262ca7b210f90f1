//! Hand-written fakes for the core ports.

#![allow(dead_code)]

use async_trait::async_trait;
use hakeem_core::{
    Chapter, GuidanceService, HydratedVerse, PortError, PortResult, Reference,
    ResolutionPipeline, ReferenceCache, ResourceDescriptor, ScriptureService, Suggestion,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn reference(chapter: i64, verse: i64) -> Reference {
    Reference::new(chapter, verse).unwrap()
}

pub fn suggestion(chapter: i64, verse: i64, rationale: &str) -> Suggestion {
    Suggestion::new(reference(chapter, verse), rationale)
}

pub fn verse(chapter: i64, verse_number: i64) -> HydratedVerse {
    HydratedVerse {
        reference: reference(chapter, verse_number),
        source_text: format!("arabic {}:{}", chapter, verse_number),
        translation: format!("translation {}:{}", chapter, verse_number),
        audio_url: Some(format!("https://audio.test/{}/{}.mp3", chapter, verse_number)),
        rationale: String::new(),
        chapter_name_english: format!("Surah {}", chapter),
        chapter_name_arabic: String::new(),
        words: vec![],
    }
}

//=========================================================================================
// Guidance fake
//=========================================================================================

#[derive(Default)]
pub struct FakeGuidance {
    pub query_response: Mutex<Option<Vec<Suggestion>>>,
    pub today_response: Mutex<Option<Option<Suggestion>>>,
    pub query_calls: AtomicUsize,
    pub today_calls: AtomicUsize,
    /// How long `suggest_for_today` takes to answer.
    pub today_delay: Duration,
}

impl FakeGuidance {
    /// Answers every query with `suggestions`.
    pub fn answering(suggestions: Vec<Suggestion>) -> Self {
        let fake = Self::default();
        *fake.query_response.lock().unwrap() = Some(suggestions);
        fake
    }

    /// Fails every call.
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn with_today(self, today: Option<Suggestion>) -> Self {
        *self.today_response.lock().unwrap() = Some(today);
        self
    }

    pub fn with_today_delay(mut self, delay: Duration) -> Self {
        self.today_delay = delay;
        self
    }

    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    pub fn today_calls(&self) -> usize {
        self.today_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GuidanceService for FakeGuidance {
    async fn suggest_for_query(&self, _text: &str) -> PortResult<Vec<Suggestion>> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        self.query_response
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| PortError::Unexpected("model unreachable".into()))
    }

    async fn suggest_for_today(&self) -> PortResult<Option<Suggestion>> {
        self.today_calls.fetch_add(1, Ordering::SeqCst);
        if !self.today_delay.is_zero() {
            tokio::time::sleep(self.today_delay).await;
        }
        self.today_response
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| PortError::Unexpected("model unreachable".into()))
    }
}

//=========================================================================================
// Scripture fake
//=========================================================================================

/// Serves every reference it is asked for, except the `missing` and `broken` ones.
#[derive(Default)]
pub struct FakeScripture {
    pub missing: HashSet<Reference>,
    pub broken: HashSet<Reference>,
    pub search_hits: Option<Vec<Reference>>,
    pub commentary: HashMap<Reference, String>,
    pub verse_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
    /// (reference, translation_id, reciter_id) of every `get_verse` call.
    pub requests: Mutex<Vec<(Reference, u32, u32)>>,
}

impl FakeScripture {
    pub fn new() -> Self {
        Self {
            search_hits: Some(Vec::new()),
            ..Self::default()
        }
    }

    pub fn verse_calls(&self) -> usize {
        self.verse_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<(Reference, u32, u32)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScriptureService for FakeScripture {
    async fn get_verse(
        &self,
        reference: Reference,
        translation_id: u32,
        reciter_id: u32,
    ) -> PortResult<Option<HydratedVerse>> {
        self.verse_calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((reference, translation_id, reciter_id));

        if self.broken.contains(&reference) {
            return Err(PortError::Unexpected("503".into()));
        }
        if self.missing.contains(&reference) {
            return Ok(None);
        }
        let mut hydrated = verse(reference.chapter().into(), reference.verse().into());
        hydrated.translation = format!("{} [t{}]", hydrated.translation, translation_id);
        // The content service never knows the rationale.
        hydrated.rationale = "should be overwritten".into();
        Ok(Some(hydrated))
    }

    async fn get_chapter_verses(
        &self,
        chapter_id: u16,
        _translation_id: u32,
        _reciter_id: u32,
        page: u32,
    ) -> PortResult<Vec<HydratedVerse>> {
        let first = i64::from((page - 1) * 2 + 1);
        Ok((first..first + 2)
            .map(|n| verse(chapter_id.into(), n))
            .collect())
    }

    async fn search_text(&self, _query: &str) -> PortResult<Vec<Reference>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.search_hits
            .clone()
            .ok_or_else(|| PortError::Unexpected("search down".into()))
    }

    async fn list_chapters(&self) -> PortResult<Vec<Chapter>> {
        Ok(vec![Chapter {
            id: 1,
            name_english: "Al-Fatihah".into(),
            name_arabic: "الفاتحة".into(),
            translated_name: "The Opener".into(),
            verse_count: 7,
            revelation_place: "makkah".into(),
        }])
    }

    async fn list_translations(&self) -> PortResult<Vec<ResourceDescriptor>> {
        Ok(vec![])
    }

    async fn list_reciters(&self) -> PortResult<Vec<ResourceDescriptor>> {
        Ok(vec![])
    }

    async fn list_tafsirs(&self) -> PortResult<Vec<ResourceDescriptor>> {
        Ok(vec![])
    }

    async fn get_commentary(
        &self,
        reference: Reference,
        _tafsir_id: u32,
    ) -> PortResult<Option<String>> {
        Ok(self.commentary.get(&reference).cloned())
    }
}

//=========================================================================================
// Cache-observing scripture fake
//=========================================================================================

/// Wraps `FakeScripture` and records the reference cache each time a verse is hydrated.
pub struct CacheWatchingScripture {
    pub inner: FakeScripture,
    pub cache: Arc<ReferenceCache>,
    pub seen: tokio::sync::Mutex<Vec<Vec<Suggestion>>>,
}

impl CacheWatchingScripture {
    pub fn new(cache: Arc<ReferenceCache>) -> Self {
        Self {
            inner: FakeScripture::new(),
            cache,
            seen: tokio::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ScriptureService for CacheWatchingScripture {
    async fn get_verse(
        &self,
        reference: Reference,
        translation_id: u32,
        reciter_id: u32,
    ) -> PortResult<Option<HydratedVerse>> {
        let snapshot = self.cache.snapshot().await;
        self.seen.lock().await.push(snapshot);
        self.inner.get_verse(reference, translation_id, reciter_id).await
    }

    async fn get_chapter_verses(
        &self,
        chapter_id: u16,
        translation_id: u32,
        reciter_id: u32,
        page: u32,
    ) -> PortResult<Vec<HydratedVerse>> {
        self.inner
            .get_chapter_verses(chapter_id, translation_id, reciter_id, page)
            .await
    }

    async fn search_text(&self, query: &str) -> PortResult<Vec<Reference>> {
        self.inner.search_text(query).await
    }

    async fn list_chapters(&self) -> PortResult<Vec<Chapter>> {
        self.inner.list_chapters().await
    }

    async fn list_translations(&self) -> PortResult<Vec<ResourceDescriptor>> {
        self.inner.list_translations().await
    }

    async fn list_reciters(&self) -> PortResult<Vec<ResourceDescriptor>> {
        self.inner.list_reciters().await
    }

    async fn list_tafsirs(&self) -> PortResult<Vec<ResourceDescriptor>> {
        self.inner.list_tafsirs().await
    }

    async fn get_commentary(
        &self,
        reference: Reference,
        tafsir_id: u32,
    ) -> PortResult<Option<String>> {
        self.inner.get_commentary(reference, tafsir_id).await
    }
}

pub fn pipeline(
    guidance: Arc<FakeGuidance>,
    scripture: Arc<FakeScripture>,
) -> Arc<ResolutionPipeline> {
    Arc::new(ResolutionPipeline::new(
        guidance,
        scripture,
        Arc::new(ReferenceCache::new()),
    ))
}
