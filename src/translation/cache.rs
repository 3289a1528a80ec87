/*!
 * Translator handle caching.
 *
 * Loading a model is slow, so handles are kept in a small LRU keyed by target
 * language. Each entry is a shared construction future: concurrent misses for
 * the same language all await one load instead of starting their own.
 */

use futures::future::{BoxFuture, FutureExt, Shared};
use log::{debug, warn};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::{TranslationBackend, TranslatorHandle};

/// Default number of languages kept loaded
pub const DEFAULT_CACHE_CAPACITY: usize = 4;

type HandleResult = Result<Arc<dyn TranslatorHandle>, ProviderError>;
type HandleFuture = Shared<BoxFuture<'static, HandleResult>>;

/// Bounded, concurrency-safe cache of translator handles
pub struct HandleCache {
    /// Pending or finished loads, most recently used first
    entries: Mutex<LruCache<String, HandleFuture>>,

    /// Number of loads started
    constructions: AtomicUsize,
}

impl HandleCache {
    /// Create a cache holding at most `capacity` languages
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            constructions: AtomicUsize::new(0),
        }
    }

    /// Return the handle for a language, loading it through `backend` on a miss
    pub async fn get_or_load(
        &self,
        target_language: &str,
        backend: &Arc<dyn TranslationBackend>,
    ) -> HandleResult {
        let pending = {
            let mut entries = self.entries.lock();
            match entries.get(target_language) {
                Some(pending) => pending.clone(),
                None => {
                    self.constructions.fetch_add(1, Ordering::SeqCst);
                    debug!("Loading {} model for '{}'", backend.name(), target_language);

                    let backend = Arc::clone(backend);
                    let language = target_language.to_string();
                    let pending = async move { backend.load(&language).await }.boxed().shared();

                    if let Some((evicted, _)) = entries.push(target_language.to_string(), pending.clone()) {
                        debug!("Evicted translator for '{}' from cache", evicted);
                    }
                    pending
                }
            }
        };

        let result = pending.clone().await;

        if let Err(e) = &result {
            let mut entries = self.entries.lock();
            let same_entry = entries
                .peek(target_language)
                .is_some_and(|current| current.ptr_eq(&pending));
            if same_entry {
                warn!("Failed to load translator for '{}': {}", target_language, e);
                entries.pop(target_language);
            }
        }

        result
    }

    /// Number of loads started since creation
    pub fn constructions(&self) -> usize {
        self.constructions.load(Ordering::SeqCst)
    }

    /// Number of cached languages, including loads still in flight
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Whether a language is currently cached
    pub fn contains(&self, target_language: &str) -> bool {
        self.entries.lock().contains(target_language)
    }

    /// Empty the cache, returning every handle that finished loading
    pub fn drain(&self) -> Vec<Arc<dyn TranslatorHandle>> {
        let mut entries = self.entries.lock();
        let mut handles = Vec::with_capacity(entries.len());
        while let Some((_, pending)) = entries.pop_lru() {
            if let Some(Ok(handle)) = pending.peek() {
                handles.push(Arc::clone(handle));
            }
        }
        handles
    }
}

impl Default for HandleCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
