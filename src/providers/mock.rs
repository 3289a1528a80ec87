/*!
 * Mock backend implementation for testing.
 *
 * This module provides a mock backend that simulates different behaviors:
 * - `MockBackend::identity()` - Returns the text unchanged
 * - `MockBackend::tagged()` - Prefixes the text with the target language
 * - `MockBackend::failing_load()` - Every model load fails
 * - `MockBackend::failing_translate()` - Loads fine, every translation fails
 */

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{TranslationBackend, TranslatorHandle};

/// Behavior mode for the mock backend
#[derive(Debug, Clone, Copy)]
pub enum MockBehavior {
    /// Returns the input unchanged
    Identity,
    /// Returns `[lang] input`
    Tagged,
    /// Applies a custom function to the input
    Custom(fn(&str) -> String),
    /// Model loading always fails
    FailingLoad,
    /// Translation always fails
    FailingTranslate,
}

/// Mock backend for testing translation behavior
#[derive(Debug)]
pub struct MockBackend {
    /// Behavior mode
    behavior: MockBehavior,
    /// Simulated model load time
    load_delay: Duration,
    /// Simulated generation time
    translate_delay: Duration,
    /// Number of `load` calls
    loads: Arc<AtomicUsize>,
    /// Number of `translate` calls across all handles
    translations: Arc<AtomicUsize>,
    /// Number of `release` calls across all handles
    releases: Arc<AtomicUsize>,
}

impl MockBackend {
    /// Create a new mock backend with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            load_delay: Duration::ZERO,
            translate_delay: Duration::ZERO,
            loads: Arc::new(AtomicUsize::new(0)),
            translations: Arc::new(AtomicUsize::new(0)),
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A backend whose translation is the identity
    pub fn identity() -> Self {
        Self::new(MockBehavior::Identity)
    }

    /// A backend that marks its output with the target language
    pub fn tagged() -> Self {
        Self::new(MockBehavior::Tagged)
    }

    /// A backend driven by a custom translation function
    pub fn custom(translate: fn(&str) -> String) -> Self {
        Self::new(MockBehavior::Custom(translate))
    }

    /// A backend that cannot load any model
    pub fn failing_load() -> Self {
        Self::new(MockBehavior::FailingLoad)
    }

    /// A backend whose translations always fail
    pub fn failing_translate() -> Self {
        Self::new(MockBehavior::FailingTranslate)
    }

    /// Make every load take this long
    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    /// Make every translation take this long
    pub fn with_translate_delay(mut self, delay: Duration) -> Self {
        self.translate_delay = delay;
        self
    }

    /// Number of model loads performed
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Shared load counter, usable after the backend moved into a client
    pub fn load_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.loads)
    }

    /// Shared translation counter
    pub fn translation_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.translations)
    }

    /// Shared release counter
    pub fn release_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.releases)
    }
}

#[async_trait]
impl TranslationBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn load(&self, target_language: &str) -> Result<Arc<dyn TranslatorHandle>, ProviderError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if !self.load_delay.is_zero() {
            tokio::time::sleep(self.load_delay).await;
        }

        if let MockBehavior::FailingLoad = self.behavior {
            return Err(ProviderError::ModelUnavailable(format!(
                "no mock model for '{}'",
                target_language
            )));
        }

        Ok(Arc::new(MockTranslator {
            target_language: target_language.to_string(),
            behavior: self.behavior,
            translate_delay: self.translate_delay,
            translations: Arc::clone(&self.translations),
            releases: Arc::clone(&self.releases),
        }))
    }
}

/// Handle produced by [`MockBackend`]
#[derive(Debug)]
pub struct MockTranslator {
    target_language: String,
    behavior: MockBehavior,
    translate_delay: Duration,
    translations: Arc<AtomicUsize>,
    releases: Arc<AtomicUsize>,
}

#[async_trait]
impl TranslatorHandle for MockTranslator {
    fn target_language(&self) -> &str {
        &self.target_language
    }

    async fn translate(&self, text: &str) -> Result<String, ProviderError> {
        self.translations.fetch_add(1, Ordering::SeqCst);
        if !self.translate_delay.is_zero() {
            tokio::time::sleep(self.translate_delay).await;
        }

        match self.behavior {
            MockBehavior::Identity => Ok(text.to_string()),
            MockBehavior::Tagged => Ok(format!("[{}] {}", self.target_language, text)),
            MockBehavior::Custom(translate) => Ok(translate(text)),
            MockBehavior::FailingLoad | MockBehavior::FailingTranslate => Err(ProviderError::ApiError {
                status_code: 500,
                message: "mock generation failure".to_string(),
            }),
        }
    }

    async fn release(&self) -> Result<(), ProviderError> {
        self.releases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
