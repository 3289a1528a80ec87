/*!
 * Backend implementations for the translation model.
 *
 * The model itself is external. This module defines the seam it is reached
 * through and ships two implementations:
 * - Ollama: local model server over HTTP
 * - Mock: deterministic in-process backend for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

use crate::errors::ProviderError;

/// A loaded model bound to one target language
///
/// Handles are cheap to share and are reused for every text translated into
/// their language.
#[async_trait]
pub trait TranslatorHandle: Send + Sync + Debug {
    /// Language code this handle translates into
    fn target_language(&self) -> &str;

    /// Translate a whole text as one unit
    ///
    /// # Arguments
    /// * `text` - The text to translate
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The raw decoded model output
    async fn translate(&self, text: &str) -> Result<String, ProviderError>;

    /// Free whatever the backend holds for this handle
    async fn release(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

/// Common trait for all translation backends
///
/// Loading is the expensive step; callers are expected to cache the handle.
#[async_trait]
pub trait TranslationBackend: Send + Sync + Debug {
    /// Short backend name for logs
    fn name(&self) -> &str;

    /// Load the model for a target language
    ///
    /// # Arguments
    /// * `target_language` - ISO language code to translate into
    ///
    /// # Returns
    /// * `Result<Arc<dyn TranslatorHandle>, ProviderError>` - A reusable handle or an error
    async fn load(&self, target_language: &str) -> Result<Arc<dyn TranslatorHandle>, ProviderError>;
}

pub mod mock;
pub mod ollama;
