/*!
 * Core translation client.
 *
 * `TranslationClient` is the only entry point to the model: it owns the
 * backend and the handle cache, and turns raw model output into clean text.
 */

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use crate::app_config::TranslationConfig;
use crate::errors::TranslationError;
use crate::providers::ollama::OllamaBackend;
use crate::providers::{TranslationBackend, TranslatorHandle};

use super::cache::HandleCache;

/// Tokens some models leak into their decoded output
static CONTROL_TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<think>.*?</think>|<\|[A-Za-z0-9_]+\|>|</s>|<s>|<pad>|<unk>").unwrap()
});

/// Strip model-internal control tokens and surrounding whitespace
pub fn strip_control_tokens(text: &str) -> String {
    CONTROL_TOKEN_REGEX.replace_all(text, "").trim().to_string()
}

/// Translation client with a per-language handle cache
pub struct TranslationClient {
    backend: Arc<dyn TranslationBackend>,
    handles: HandleCache,
}

impl TranslationClient {
    /// Create a client over any backend, keeping at most `cache_capacity` languages loaded
    pub fn new(backend: Arc<dyn TranslationBackend>, cache_capacity: usize) -> Self {
        Self {
            backend,
            handles: HandleCache::new(cache_capacity),
        }
    }

    /// Create a client backed by Ollama
    pub fn from_config(config: &TranslationConfig) -> Self {
        Self::new(
            Arc::new(OllamaBackend::from_config(config)),
            config.handle_cache_size,
        )
    }

    /// Name of the backend in use
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Get the handle for a target language, loading it on first use
    pub async fn get_handle(&self, target_language: &str) -> Result<Arc<dyn TranslatorHandle>, TranslationError> {
        Ok(self.handles.get_or_load(target_language, &self.backend).await?)
    }

    /// Translate a whole text into the target language
    pub async fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslationError> {
        let handle = self.get_handle(target_language).await?;
        let raw = handle.translate(text).await?;
        let translated = strip_control_tokens(&raw);

        debug!("Translated into '{}': '{}' -> '{}'", target_language, text, translated);
        Ok(translated)
    }

    /// Number of model loads this client has started
    pub fn constructions(&self) -> usize {
        self.handles.constructions()
    }

    /// Number of languages currently cached
    pub fn cached_languages(&self) -> usize {
        self.handles.len()
    }

    /// Release every loaded model and empty the cache
    pub async fn shutdown(&self) {
        for handle in self.handles.drain() {
            if let Err(e) = handle.release().await {
                warn!("Failed to release translator for '{}': {}", handle.target_language(), e);
            }
        }
    }
}
