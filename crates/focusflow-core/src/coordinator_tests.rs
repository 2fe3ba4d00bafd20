use super::*;
use crate::testing::{coordinator, grade, memory_cache, ScriptedRemote};
use async_trait::async_trait;
use focusflow_protocols::error::CacheError;
use focusflow_protocols::OutcomeSource;

const TEXT: &str = "The industrial revolution transformed manufacturing processes.";

fn items(texts: &[(&str, &str)]) -> Vec<BatchItem> {
    texts.iter().map(|(id, text)| BatchItem::new(*id, *text)).collect()
}

/// Store whose every call fails.
struct BrokenCache;

#[async_trait]
impl CacheStore for BrokenCache {
    fn id(&self) -> &str {
        "broken"
    }

    async fn get(&self, _key: &CacheKey) -> Result<Option<String>, CacheError> {
        Err(CacheError::Connection("disk gone".to_string()))
    }

    async fn put(&self, _key: &CacheKey, _text: &str) -> Result<(), CacheError> {
        Err(CacheError::Query("read-only".to_string()))
    }

    async fn len(&self) -> Result<usize, CacheError> {
        Err(CacheError::Connection("disk gone".to_string()))
    }

    async fn clear(&self) -> Result<(), CacheError> {
        Err(CacheError::Connection("disk gone".to_string()))
    }
}

#[tokio::test]
async fn test_simplify_one_miss_then_hit() {
    let cache = memory_cache();
    let remote = ScriptedRemote::new();
    let coord = coordinator(cache.clone(), remote.clone());

    let first = coord.simplify_one(TEXT, grade(3), "page_1").await;
    assert_eq!(first.source, OutcomeSource::Remote);
    assert!(!first.from_cache);
    assert_eq!(first.text, ScriptedRemote::answer(TEXT, grade(3)));

    let second = coord.simplify_one(TEXT, grade(3), "page_1").await;
    assert_eq!(second.source, OutcomeSource::Cache);
    assert!(second.from_cache);
    assert_eq!(second.text, first.text);

    assert_eq!(remote.one_call_count(), 1);
    assert_eq!(cache.len().await.unwrap(), 1);
}

#[tokio::test]
async fn test_simplify_one_grades_are_separate() {
    let remote = ScriptedRemote::new();
    let coord = coordinator(memory_cache(), remote.clone());

    coord.simplify_one(TEXT, grade(3), "p").await;
    let other = coord.simplify_one(TEXT, grade(8), "p").await;
    assert_eq!(other.source, OutcomeSource::Remote);
    assert_eq!(remote.one_call_count(), 2);
}

#[tokio::test]
async fn test_simplify_one_remote_failure_uses_fallback() {
    let cache = memory_cache();
    let remote = ScriptedRemote::failing();
    let coord = coordinator(cache.clone(), remote);

    let text = "We utilize numerous tools. They help.";
    let outcome = coord.simplify_one(text, grade(5), "p").await;
    assert_eq!(outcome.source, OutcomeSource::Fallback);
    assert!(!outcome.from_cache);
    assert_eq!(outcome.text, FallbackSimplifier::new().simplify(text, grade(5)));
    assert_eq!(cache.len().await.unwrap(), 0);
}

#[tokio::test]
async fn test_broken_cache_never_surfaces() {
    let remote = ScriptedRemote::new();
    let coord = coordinator(Arc::new(BrokenCache), remote.clone());

    let outcome = coord.simplify_one(TEXT, grade(3), "p").await;
    assert_eq!(outcome.source, OutcomeSource::Remote);
    assert!(!coord.check_cache(TEXT, grade(3)).await);

    let batch = items(&[("a", "Alpha text here."), ("b", "Beta text here.")]);
    let results = coord.simplify_batch(&batch, grade(3), "p").await;
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| !r.from_cache));
}

#[tokio::test]
async fn test_simplify_batch_correlates_by_id() {
    let cache = memory_cache();
    let remote = ScriptedRemote::new();
    let coord = coordinator(cache.clone(), remote.clone());

    let batch = items(&[
        ("a", "First paragraph text."),
        ("b", "Second paragraph text."),
        ("c", "Third one."),
    ]);
    let results = coord.simplify_batch(&batch, grade(4), "p").await;

    assert_eq!(remote.batch_call_count(), 1);
    let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    for (result, item) in results.iter().zip(&batch) {
        assert_eq!(result.text, ScriptedRemote::answer(&item.text, grade(4)));
        assert!(!result.from_cache);
    }
    assert_eq!(cache.len().await.unwrap(), 3);
}

#[tokio::test]
async fn test_simplify_batch_mixes_hits_and_misses() {
    let cache = memory_cache();
    let remote = ScriptedRemote::new();
    let coord = coordinator(cache.clone(), remote.clone());

    cache
        .put(&CacheKey::new("Cached text.", grade(3)), "from before")
        .await
        .unwrap();

    let batch = items(&[("hit", "Cached text."), ("miss", "Fresh text.")]);
    let results = coord.simplify_batch(&batch, grade(3), "p").await;

    assert_eq!(results[0].text, "from before");
    assert!(results[0].from_cache);
    assert!(!results[1].from_cache);

    let sent = remote.batch_calls.lock()[0].clone();
    assert_eq!(sent, vec![BatchItem::new("0", "Fresh text.")]);
}

#[tokio::test]
async fn test_simplify_batch_all_hits_skips_remote() {
    let cache = memory_cache();
    let remote = ScriptedRemote::new();
    let coord = coordinator(cache.clone(), remote.clone());

    cache.put(&CacheKey::new("One.", grade(2)), "1").await.unwrap();
    cache.put(&CacheKey::new("Two.", grade(2)), "2").await.unwrap();

    let results = coord
        .simplify_batch(&items(&[("x", "One."), ("y", "Two.")]), grade(2), "p")
        .await;
    assert_eq!(remote.batch_call_count(), 0);
    assert!(results.iter().all(|r| r.from_cache));
}

#[tokio::test]
async fn test_simplify_batch_dedups_identical_texts() {
    let remote = ScriptedRemote::new();
    let coord = coordinator(memory_cache(), remote.clone());

    let batch = items(&[
        ("a", "Repeated   sentence here."),
        ("b", "Something else entirely."),
        ("c", "Repeated sentence here."),
    ]);
    let results = coord.simplify_batch(&batch, grade(6), "p").await;

    let sent = remote.batch_calls.lock()[0].clone();
    assert_eq!(sent.len(), 2);
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].id, "a");
    assert_eq!(results[2].id, "c");
    assert_eq!(results[0].text, results[2].text);
}

#[tokio::test]
async fn test_simplify_batch_missing_ids_fall_back() {
    let cache = memory_cache();
    let remote = ScriptedRemote::new();
    // Misses go out under their position in the request.
    remote.drop_ids.lock().insert("1".to_string());
    let coord = coordinator(cache.clone(), remote);

    let text_b = "Additionally, we require help.";
    let batch = items(&[("a", "Covered text."), ("b", text_b)]);
    let results = coord.simplify_batch(&batch, grade(8), "p").await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].text, ScriptedRemote::answer("Covered text.", grade(8)));
    assert_eq!(results[1].id, "b");
    assert_eq!(results[1].text, FallbackSimplifier::new().simplify(text_b, grade(8)));
    assert_eq!(cache.len().await.unwrap(), 1);
    assert!(!coord.check_cache(text_b, grade(8)).await);
}

#[tokio::test]
async fn test_simplify_batch_repeated_ids_keep_their_own_text() {
    let cache = memory_cache();
    let remote = ScriptedRemote::new();
    let coord = coordinator(cache.clone(), remote.clone());

    let batch = items(&[
        ("dup", "First distinct paragraph."),
        ("dup", "Second distinct paragraph."),
    ]);
    let results = coord.simplify_batch(&batch, grade(4), "p").await;

    assert_eq!(results.len(), 2);
    for (result, item) in results.iter().zip(&batch) {
        assert_eq!(result.id, "dup");
        assert_eq!(result.text, ScriptedRemote::answer(&item.text, grade(4)));
        assert_eq!(
            cache.get(&CacheKey::new(&item.text, grade(4))).await.unwrap(),
            Some(ScriptedRemote::answer(&item.text, grade(4)))
        );
    }
}

#[tokio::test]
async fn test_pre_cache_batch_repeated_ids_keep_their_own_text() {
    let cache = memory_cache();
    let coord = coordinator(cache.clone(), ScriptedRemote::new());

    let batch = items(&[("x", "One paragraph of text."), ("x", "Another paragraph of text.")]);
    assert_eq!(coord.pre_cache_batch(&batch, grade(6), "p").await, 2);
    for item in &batch {
        assert_eq!(
            cache.get(&CacheKey::new(&item.text, grade(6))).await.unwrap(),
            Some(ScriptedRemote::answer(&item.text, grade(6)))
        );
    }
}

#[tokio::test]
async fn test_simplify_one_offline_keeps_first_middle_last_sentences() {
    let cache = memory_cache();
    let coord = coordinator(cache.clone(), ScriptedRemote::failing());

    let outcome = coord.simplify_one("A. B. C. D.", grade(8), "p").await;
    assert_eq!(outcome.source, OutcomeSource::Fallback);
    assert_eq!(outcome.text, "A. C. D.");
    assert_eq!(cache.len().await.unwrap(), 0);
}

#[tokio::test]
async fn test_simplify_batch_remote_failure_falls_back_for_all() {
    let cache = memory_cache();
    let coord = coordinator(cache.clone(), ScriptedRemote::failing());

    let batch = items(&[("a", "However it rained."), ("b", "Therefore we stayed.")]);
    let results = coord.simplify_batch(&batch, grade(3), "p").await;

    assert_eq!(results[0].text, "but it rained.");
    assert_eq!(results[1].text, "so we stayed.");
    assert!(results.iter().all(|r| !r.from_cache));
    assert_eq!(cache.len().await.unwrap(), 0);
}

#[tokio::test]
async fn test_simplify_batch_empty() {
    let remote = ScriptedRemote::new();
    let coord = coordinator(memory_cache(), remote.clone());
    assert!(coord.simplify_batch(&[], grade(3), "p").await.is_empty());
    assert_eq!(remote.batch_call_count(), 0);
}

#[tokio::test]
async fn test_check_cache() {
    let cache = memory_cache();
    let coord = coordinator(cache.clone(), ScriptedRemote::new());

    assert!(!coord.check_cache(TEXT, grade(3)).await);
    cache.put(&CacheKey::new(TEXT, grade(3)), "x").await.unwrap();
    assert!(coord.check_cache(TEXT, grade(3)).await);
    assert!(!coord.check_cache(TEXT, grade(4)).await);
}

#[tokio::test]
async fn test_pre_cache_batch_skips_cached_items() {
    let cache = memory_cache();
    let remote = ScriptedRemote::new();
    let coord = coordinator(cache.clone(), remote.clone());
    cache.put(&CacheKey::new("Known.", grade(5)), "k").await.unwrap();

    let batch = items(&[("1", "Known."), ("2", "New one."), ("3", "New two.")]);
    let written = coord.pre_cache_batch(&batch, grade(5), "p").await;

    assert_eq!(written, 2);
    assert_eq!(remote.batch_calls.lock()[0].len(), 2);
    assert_eq!(cache.len().await.unwrap(), 3);

    let again = coord
        .pre_cache_batch(&items(&[("1", "Known."), ("2", "New one.")]), grade(5), "p")
        .await;
    assert_eq!(again, 0);
    assert_eq!(remote.batch_call_count(), 1);
}

#[tokio::test]
async fn test_pre_cache_batch_failure_is_swallowed() {
    let cache = memory_cache();
    let coord = coordinator(cache.clone(), ScriptedRemote::failing());
    let written = coord.pre_cache_batch(&items(&[("1", "Text.")]), grade(5), "p").await;
    assert_eq!(written, 0);
    assert_eq!(cache.len().await.unwrap(), 0);
}

#[tokio::test]
async fn test_pre_cache_chunks_by_batch_size() {
    let cache = memory_cache();
    let remote = ScriptedRemote::new();
    let coord = coordinator(cache.clone(), remote.clone());

    let batch: Vec<BatchItem> = (0..25)
        .map(|i| BatchItem::new(format!("p_{i}"), format!("Paragraph number {i} of the page.")))
        .collect();
    let report = coord.pre_cache(&batch, grade(3), "p").await;

    assert!(report.available);
    assert_eq!(report.chunks, 3);
    assert_eq!(report.written, 25);
    assert_eq!(remote.batch_call_count(), 3);
    assert!(remote.batch_calls.lock().iter().all(|call| call.len() <= 10));
    assert_eq!(cache.len().await.unwrap(), 25);
}

#[tokio::test]
async fn test_pre_cache_unavailable_does_nothing() {
    let remote = ScriptedRemote::new();
    *remote.available.lock() = false;
    let coord = coordinator(memory_cache(), remote.clone());

    let report = coord
        .pre_cache(&items(&[("1", "Some text to warm.")]), grade(3), "p")
        .await;
    assert_eq!(report, PreCacheReport::default());
    assert_eq!(*remote.probes.lock(), 1);
    assert_eq!(remote.batch_call_count(), 0);
}

#[test]
fn test_options_from_config() {
    let config = SimplifierConfig {
        batch_size: 0,
        precompute_pacing_ms: 250,
        ..Default::default()
    };
    let options = CoordinatorOptions::from(&config);
    assert_eq!(options.batch_size, 1);
    assert_eq!(options.precompute_pacing, Duration::from_millis(250));
}
