mod common;

use common::{
    pipeline, reference, suggestion, CacheWatchingScripture, FakeGuidance, FakeScripture,
};
use hakeem_core::{PortError, ReferenceCache, Resolution, ResolutionPipeline, ResolveError};
use std::sync::Arc;

#[tokio::test]
async fn anxious_query_hydrates_all_suggestions_in_order() {
    let suggestions = vec![
        suggestion(2, 286, "Allah does not burden a soul beyond its capacity."),
        suggestion(94, 1, "Relief follows hardship."),
        suggestion(65, 3, "Trust brings sufficiency."),
    ];
    let guidance = Arc::new(FakeGuidance::answering(suggestions.clone()));
    let scripture = Arc::new(FakeScripture::new());
    let pipeline = pipeline(guidance.clone(), scripture.clone());

    let resolution = pipeline
        .resolve_by_text("I feel anxious", 131, 7)
        .await
        .unwrap();

    let verses = resolution.verses();
    assert_eq!(verses.len(), 3);
    let refs: Vec<_> = verses.iter().map(|v| v.reference).collect();
    assert_eq!(refs, vec![reference(2, 286), reference(94, 1), reference(65, 3)]);
    assert_eq!(verses[1].rationale, "Relief follows hardship.");
    assert_eq!(resolution.notice(), None);
    assert_eq!(pipeline.cache().snapshot().await, suggestions);
    assert!(scripture
        .requests()
        .iter()
        .all(|(_, translation, reciter)| (*translation, *reciter) == (131, 7)));
}

#[tokio::test]
async fn cache_is_replaced_not_appended() {
    let guidance = Arc::new(FakeGuidance::answering(vec![suggestion(1, 1, "a")]));
    let pipeline = pipeline(guidance.clone(), Arc::new(FakeScripture::new()));

    pipeline.resolve_by_text("first", 131, 7).await.unwrap();
    *guidance.query_response.lock().unwrap() =
        Some(vec![suggestion(3, 2, "b"), suggestion(4, 5, "c")]);
    pipeline.resolve_by_text("second", 131, 7).await.unwrap();

    assert_eq!(
        pipeline.cache().snapshot().await,
        vec![suggestion(3, 2, "b"), suggestion(4, 5, "c")]
    );
}

#[tokio::test]
async fn empty_suggestions_is_no_matches_without_content_calls() {
    let guidance = Arc::new(FakeGuidance::answering(vec![]));
    let scripture = Arc::new(FakeScripture::new());
    let pipeline = pipeline(guidance, scripture.clone());

    let resolution = pipeline.resolve_by_text("asdkjasd", 131, 7).await.unwrap();

    assert_eq!(resolution, Resolution::NoMatches);
    assert!(resolution.verses().is_empty());
    assert!(resolution.notice().unwrap().contains("Try rephrasing"));
    assert_eq!(scripture.verse_calls(), 0);
}

#[tokio::test]
async fn guidance_failure_skips_content_service() {
    let scripture = Arc::new(FakeScripture::new());
    let pipeline = pipeline(Arc::new(FakeGuidance::failing()), scripture.clone());

    let err = pipeline
        .resolve_by_text("I feel lost", 131, 7)
        .await
        .unwrap_err();

    assert!(matches!(err, ResolveError::GuidanceUnavailable(PortError::Unexpected(_))));
    assert_eq!(
        err.user_message(),
        "Unable to retrieve spiritual guidance at this moment."
    );
    assert_eq!(scripture.verse_calls(), 0);
    assert!(pipeline.cache().is_empty().await);
}

#[tokio::test]
async fn failed_hydrations_are_dropped() {
    let guidance = Arc::new(FakeGuidance::answering(vec![
        suggestion(2, 286, "a"),
        suggestion(94, 1, "b"),
        suggestion(65, 3, "c"),
        suggestion(13, 28, "d"),
    ]));
    let mut scripture = FakeScripture::new();
    scripture.missing.insert(reference(2, 286));
    scripture.broken.insert(reference(13, 28));
    let scripture = Arc::new(scripture);
    let pipeline = pipeline(guidance, scripture.clone());

    let verses = pipeline
        .resolve_by_text("I feel anxious", 131, 7)
        .await
        .unwrap()
        .into_verses();

    let refs: Vec<_> = verses.iter().map(|v| v.reference).collect();
    assert_eq!(refs, vec![reference(94, 1), reference(65, 3)]);
    assert_eq!(scripture.verse_calls(), 4);
}

#[tokio::test]
async fn resolve_by_references_does_not_touch_guidance_or_cache() {
    let guidance = Arc::new(FakeGuidance::answering(vec![suggestion(1, 1, "x")]));
    let pipeline = pipeline(guidance.clone(), Arc::new(FakeScripture::new()));

    let verses = pipeline
        .resolve_by_references(&[suggestion(112, 1, "oneness")], 20, 3)
        .await;

    assert_eq!(verses.len(), 1);
    assert_eq!(verses[0].rationale, "oneness");
    assert!(verses[0].translation.ends_with("[t20]"));
    assert_eq!(guidance.query_calls(), 0);
    assert!(pipeline.cache().is_empty().await);
}

#[tokio::test]
async fn keyword_search_hydrates_first_five_hits_without_rationale() {
    let mut scripture = FakeScripture::new();
    scripture.search_hits = Some((1..=8).map(|n| reference(2, n)).collect());
    let scripture = Arc::new(scripture);
    let guidance = Arc::new(FakeGuidance::answering(vec![suggestion(9, 9, "cached")]));
    let pipeline = pipeline(guidance.clone(), scripture.clone());

    let verses = pipeline
        .resolve_by_keyword("paradise", 131, 7)
        .await
        .unwrap()
        .into_verses();

    assert_eq!(verses.len(), 5);
    assert!(verses.iter().all(|v| v.rationale.is_empty()));
    assert_eq!(verses[4].reference, reference(2, 5));
    assert_eq!(scripture.verse_calls(), 5);
    assert_eq!(guidance.query_calls(), 0);
    assert!(pipeline.cache().is_empty().await);
}

#[tokio::test]
async fn keyword_without_hits_is_no_keyword_matches() {
    let scripture = Arc::new(FakeScripture::new());
    let pipeline = pipeline(Arc::new(FakeGuidance::failing()), scripture.clone());

    let resolution = pipeline.resolve_by_keyword("zzzz", 131, 7).await.unwrap();

    assert_eq!(resolution, Resolution::NoKeywordMatches);
    assert_eq!(
        resolution.notice(),
        Some("No verses found matching your keyword.")
    );
    assert_eq!(scripture.verse_calls(), 0);
}

#[tokio::test]
async fn keyword_search_failure_is_an_error() {
    let mut scripture = FakeScripture::new();
    scripture.search_hits = None;
    let pipeline = pipeline(Arc::new(FakeGuidance::failing()), Arc::new(scripture));

    let err = pipeline.resolve_by_keyword("musa", 131, 7).await.unwrap_err();
    assert!(matches!(err, ResolveError::SearchUnavailable(_)));
}

#[tokio::test]
async fn blank_queries_are_rejected() {
    let guidance = Arc::new(FakeGuidance::answering(vec![]));
    let pipeline = pipeline(guidance.clone(), Arc::new(FakeScripture::new()));

    assert!(matches!(
        pipeline.resolve_by_text("   ", 131, 7).await,
        Err(ResolveError::EmptyQuery)
    ));
    assert_eq!(guidance.query_calls(), 0);
}

#[tokio::test]
async fn chapter_pages_and_commentary() {
    let mut scripture = FakeScripture::new();
    scripture
        .commentary
        .insert(reference(1, 1), "<p>In the name of Allah</p>".into());
    scripture.commentary.insert(reference(1, 2), "   ".into());
    let pipeline = pipeline(Arc::new(FakeGuidance::failing()), Arc::new(scripture));

    let page = pipeline.read_chapter(1, 131, 7, 2).await.unwrap();
    let refs: Vec<_> = page.iter().map(|v| v.reference).collect();
    assert_eq!(refs, vec![reference(1, 3), reference(1, 4)]);

    assert!(matches!(
        pipeline.read_chapter(115, 131, 7, 1).await,
        Err(PortError::NotFound(_))
    ));

    assert_eq!(
        pipeline.commentary(reference(1, 1), 0).await.unwrap().as_deref(),
        Some("<p>In the name of Allah</p>")
    );
    assert_eq!(pipeline.commentary(reference(1, 2), 169).await.unwrap(), None);
    assert_eq!(pipeline.list_chapters().await.unwrap().len(), 1);
}

#[tokio::test]
async fn cache_holds_the_new_suggestions_while_hydrating() {
    let suggestions = vec![suggestion(39, 53, "mercy"), suggestion(2, 186, "nearness")];
    let cache = Arc::new(ReferenceCache::new());
    cache.replace(vec![suggestion(1, 1, "stale")]).await;
    let scripture = Arc::new(CacheWatchingScripture::new(cache.clone()));
    let pipeline = ResolutionPipeline::new(
        Arc::new(FakeGuidance::answering(suggestions.clone())),
        scripture.clone(),
        cache,
    );

    pipeline.resolve_by_text("hopeless", 131, 7).await.unwrap();

    let seen = scripture.seen.lock().await;
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|snapshot| *snapshot == suggestions));
}
