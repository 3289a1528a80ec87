use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::errors::AppError;
use crate::quest_fields::QuestField;
use crate::translation::cache::DEFAULT_CACHE_CAPACITY;
use crate::translation::formatting::{CodeExtractor, DEFAULT_CODE_PATTERN};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Translation backend settings
    #[serde(default)]
    pub translation: TranslationConfig,

    /// File pipeline settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation backend configuration (Ollama)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Service endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name; `{target_language}` is replaced with the language code
    #[serde(default = "default_model")]
    pub model: String,

    /// System prompt; `{target_language}` and `{target_language_name}` are substituted
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Temperature parameter for text generation (0.0 to 2.0)
    #[serde(default)]
    pub temperature: f32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// How long the server keeps a model loaded between requests
    #[serde(default = "default_keep_alive")]
    pub keep_alive: String,

    /// Number of target languages kept loaded at once
    #[serde(default = "default_handle_cache_size")]
    pub handle_cache_size: usize,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            system_prompt: default_system_prompt(),
            temperature: 0.0,
            timeout_secs: default_timeout_secs(),
            keep_alive: default_keep_alive(),
            handle_cache_size: default_handle_cache_size(),
        }
    }
}

/// Where translated files go
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Recursive discovery, output written to a mirrored tree
    #[default]
    Mirror,
    /// Deprecated: flat discovery, sources overwritten without backup
    InPlace,
}

/// Upper bound for `pipeline.max_concurrent_files`
pub const MAX_CONCURRENT_FILES: usize = 1024;

/// File pipeline configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PipelineConfig {
    /// Extension of the files to translate (mirror mode)
    #[serde(default = "default_file_extension")]
    pub file_extension: String,

    /// Path segment naming the source tree
    #[serde(default = "default_source_marker")]
    pub source_marker: String,

    /// Replacement for the source segment; `{target_language}` is substituted
    #[serde(default = "default_output_marker")]
    pub output_marker: String,

    /// Mirror or overwrite
    #[serde(default)]
    pub output_mode: OutputMode,

    /// Fields to translate
    #[serde(default = "default_fields")]
    pub fields: Vec<QuestField>,

    /// Maximum number of files processed at once, at most `MAX_CONCURRENT_FILES`
    #[serde(default = "default_max_concurrent_files")]
    pub max_concurrent_files: usize,

    /// Regex matching one inline control code
    #[serde(default = "default_control_code_pattern")]
    pub control_code_pattern: String,

    /// Fail a file when a translation loses or duplicates placeholders
    #[serde(default)]
    pub strict_placeholders: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            file_extension: default_file_extension(),
            source_marker: default_source_marker(),
            output_marker: default_output_marker(),
            output_mode: OutputMode::default(),
            fields: default_fields(),
            max_concurrent_files: default_max_concurrent_files(),
            control_code_pattern: default_control_code_pattern(),
            strict_placeholders: false,
        }
    }
}

impl PipelineConfig {
    /// Output marker with the target language filled in
    pub fn output_marker_for(&self, target_language: &str) -> String {
        self.output_marker.replace("{target_language}", target_language)
    }

    /// Check that mirroring into `target_language` yields a usable output directory
    pub fn check_markers(&self, target_language: &str) -> Result<()> {
        let output_marker = self.output_marker_for(target_language);
        for (name, marker) in [("source_marker", &self.source_marker), ("output_marker", &output_marker)] {
            if marker.is_empty() || marker.contains(['/', '\\']) {
                return Err(anyhow!("{} must be a single non-empty path segment, got '{}'", name, marker));
            }
        }
        if self.source_marker == output_marker {
            return Err(anyhow!("source_marker and output_marker must differ"));
        }
        Ok(())
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_target_language() -> String {
    "ru".to_string()
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "llama3.2:3b".to_string()
}

fn default_system_prompt() -> String {
    "You are a professional translator for video game quests. Translate the user's text from English to {target_language_name}. \
Keep every token of the form <<<N>>> exactly as it is and in a sensible position. \
Keep quotation marks and line breaks. Reply with the translation only."
        .to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_keep_alive() -> String {
    "30m".to_string()
}

fn default_handle_cache_size() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_file_extension() -> String {
    "snbt".to_string()
}

fn default_source_marker() -> String {
    "chapters".to_string()
}

fn default_output_marker() -> String {
    "chapters-translate".to_string()
}

fn default_fields() -> Vec<QuestField> {
    QuestField::ALL.to_vec()
}

fn default_max_concurrent_files() -> usize {
    4
}

fn default_control_code_pattern() -> String {
    DEFAULT_CODE_PATTERN.to_string()
}

impl Config {
    /// Load a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| anyhow!("Failed to open config file {:?}: {}", path, e))?;
        let config = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| anyhow!("Failed to parse config file {:?}: {}", path, e))?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)
            .map_err(|e| anyhow!("Failed to write config file {:?}: {}", path.as_ref(), e))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), AppError> {
        self.check().map_err(|e| AppError::Config(format!("{:#}", e)))
    }

    fn check(&self) -> Result<()> {
        crate::language_utils::validate_language_code(&self.target_language)?;

        let translation = &self.translation;
        url::Url::parse(&translation.endpoint)
            .map_err(|e| anyhow!("Invalid endpoint '{}': {}", translation.endpoint, e))?;
        if translation.model.trim().is_empty() {
            return Err(anyhow!("Model name must not be empty"));
        }
        if !(0.0..=2.0).contains(&translation.temperature) {
            return Err(anyhow!("Temperature must be between 0.0 and 2.0, got {}", translation.temperature));
        }
        if translation.handle_cache_size == 0 {
            return Err(anyhow!("handle_cache_size must be at least 1"));
        }

        let pipeline = &self.pipeline;
        if !(1..=MAX_CONCURRENT_FILES).contains(&pipeline.max_concurrent_files) {
            return Err(anyhow!(
                "max_concurrent_files must be between 1 and {}, got {}",
                MAX_CONCURRENT_FILES,
                pipeline.max_concurrent_files
            ));
        }
        if pipeline.fields.is_empty() {
            return Err(anyhow!("At least one field must be selected for translation"));
        }

        let extractor = CodeExtractor::new(&pipeline.control_code_pattern)
            .map_err(|e| anyhow!("Invalid control code pattern: {}", e))?;
        if !extractor.extract("").codes.is_empty() {
            return Err(anyhow!(
                "Control code pattern '{}' matches the empty string",
                pipeline.control_code_pattern
            ));
        }

        if pipeline.output_mode == OutputMode::Mirror {
            pipeline.check_markers(&self.target_language)?;
            if pipeline.file_extension.trim_start_matches('.').is_empty() {
                return Err(anyhow!("file_extension must not be empty"));
            }
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            target_language: default_target_language(),
            translation: TranslationConfig::default(),
            pipeline: PipelineConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
