/*!
 * Tests for the translation client and its per-language handle cache
 */

use anyhow::Result;
use futures::future::join_all;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use questlate::TranslationClient;
use questlate::errors::{ProviderError, TranslationError};
use questlate::providers::mock::MockBackend;

/// Many concurrent first requests for one language share a single load
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_translate_withConcurrentFirstRequests_shouldLoadOnce() -> Result<()> {
    let backend = MockBackend::tagged().with_load_delay(Duration::from_millis(50));
    let loads = backend.load_counter();
    let translations = backend.translation_counter();
    let client = Arc::new(TranslationClient::new(Arc::new(backend), 4));

    let requests = (0..16).map(|i| {
        let client = Arc::clone(&client);
        tokio::spawn(async move { client.translate(&format!("line {}", i), "de").await })
    });

    for (i, outcome) in join_all(requests).await.into_iter().enumerate() {
        assert_eq!(outcome??, format!("[de] line {}", i));
    }

    assert_eq!(client.constructions(), 1);
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert_eq!(translations.load(Ordering::SeqCst), 16);
    Ok(())
}

/// Each language gets its own handle
#[tokio::test]
async fn test_translate_withTwoLanguages_shouldLoadEach() -> Result<()> {
    let client = TranslationClient::new(Arc::new(MockBackend::tagged()), 4);

    assert_eq!(client.translate("Hello", "de").await?, "[de] Hello");
    assert_eq!(client.translate("Hello", "fr").await?, "[fr] Hello");
    assert_eq!(client.translate("Bye", "de").await?, "[de] Bye");

    assert_eq!(client.constructions(), 2);
    assert_eq!(client.cached_languages(), 2);
    Ok(())
}

/// A failed load reaches every waiting request and is retried later
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_get_handle_withFailingLoad_shouldFailAllWaiters() {
    let backend = MockBackend::failing_load().with_load_delay(Duration::from_millis(30));
    let loads = backend.load_counter();
    let client = Arc::new(TranslationClient::new(Arc::new(backend), 4));

    let waiters = (0..4).map(|_| {
        let client = Arc::clone(&client);
        tokio::spawn(async move { client.translate("Hello", "xx").await })
    });

    for outcome in join_all(waiters).await {
        let result = outcome.expect("task should not panic");
        assert!(matches!(
            result,
            Err(TranslationError::Provider(ProviderError::ModelUnavailable(_)))
        ));
    }
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert_eq!(client.cached_languages(), 0);

    assert!(client.translate("Hello", "xx").await.is_err());
    assert_eq!(loads.load(Ordering::SeqCst), 2);
}

/// Shutdown releases every loaded handle and empties the cache
#[tokio::test]
async fn test_shutdown_withLoadedHandles_shouldReleaseEach() -> Result<()> {
    let backend = MockBackend::identity();
    let releases = backend.release_counter();
    let client = TranslationClient::new(Arc::new(backend), 4);

    client.translate("a", "de").await?;
    client.translate("b", "ru").await?;
    client.shutdown().await;

    assert_eq!(releases.load(Ordering::SeqCst), 2);
    assert_eq!(client.cached_languages(), 0);
    Ok(())
}

/// The cache never holds more languages than its capacity
#[tokio::test]
async fn test_translate_withMoreLanguagesThanCapacity_shouldEvict() -> Result<()> {
    let client = TranslationClient::new(Arc::new(MockBackend::identity()), 2);

    for language in ["de", "fr", "es", "de"] {
        client.translate("x", language).await?;
    }

    assert_eq!(client.cached_languages(), 2);
    // "de" was evicted by "es" and had to be loaded again
    assert_eq!(client.constructions(), 4);
    Ok(())
}

/// Model control tokens never reach the caller
#[tokio::test]
async fn test_translate_withLeakedTokens_shouldStripThem() -> Result<()> {
    fn chatty(text: &str) -> String {
        format!("<think>easy</think>\n{}<|eot_id|>", text)
    }
    let client = TranslationClient::new(Arc::new(MockBackend::custom(chatty)), 4);

    assert_eq!(client.translate("<<<1>>>Hola", "es").await?, "<<<1>>>Hola");
    assert_eq!(client.backend_name(), "mock");
    Ok(())
}
