/*!
 * # questlate - quest text translation that keeps its formatting
 *
 * A Rust library for batch translation of quest definition files (SNBT)
 * with a local translation model.
 *
 * ## Features
 *
 * - Translate `title`, `subtitle` and `description` fields in place in the text,
 *   leaving every other byte of the file untouched
 * - Preserve inline control codes (`&4`, `&l`, ...) by swapping them for
 *   placeholders around the model call
 * - Translate whole directory trees concurrently into a mirrored output tree
 * - Cache loaded models per target language
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `quest_fields`: Locating and rewriting quest fields
 * - `translation`: Formatting-preserving translation:
 *   - `translation::core`: The translation client
 *   - `translation::cache`: Per-language translator cache
 *   - `translation::formatting`: Control code extraction and restoration
 * - `file_utils`: File system operations
 * - `app_controller`: The concurrent file pipeline
 * - `language_utils`: ISO language code utilities
 * - `providers`: Translation backends:
 *   - `providers::ollama`: Ollama API client
 *   - `providers::mock`: In-process backend for tests
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod quest_fields;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, PipelineSummary};
pub use errors::{AppError, ProviderError, TranslationError};
pub use language_utils::{get_language_name, validate_language_code};
pub use quest_fields::{FieldTransformer, QuestField};
pub use translation::{CodeExtractor, TranslationClient};
