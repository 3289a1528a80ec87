/*!
 * Formatting-preserving translation.
 *
 * - `core`: the translation client, the single entry point to the model
 * - `cache`: bounded per-language cache of loaded translators
 * - `formatting`: control code extraction and restoration
 */

// Re-export main types for easier usage
pub use self::core::TranslationClient;
pub use self::formatting::{CodeExtractor, ExtractedText, PlaceholderReport};

// Submodules
pub mod cache;
pub mod core;
pub mod formatting;
