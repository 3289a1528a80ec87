use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

use crate::app_config::{Config, OutputMode};
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::language_utils::validate_language_code;
use crate::quest_fields::FieldTransformer;
use crate::translation::{CodeExtractor, TranslationClient};

// @module: Application controller for quest file translation

/// Outcome of one pipeline run
#[derive(Debug, Default)]
pub struct PipelineSummary {
    /// Output files written, in discovery order
    pub written: Vec<PathBuf>,

    /// Files that failed, with the reason
    pub failures: Vec<(PathBuf, String)>,

    /// Wall-clock time of the run
    pub duration: Duration,
}

impl PipelineSummary {
    /// Number of files discovered
    pub fn total(&self) -> usize {
        self.written.len() + self.failures.len()
    }
}

/// Main application controller for quest translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Shared translation client
    client: Arc<TranslationClient>,
}

impl Controller {
    // @method: Create a new controller with an Ollama-backed client
    pub fn with_config(config: Config) -> Result<Self> {
        let client = Arc::new(TranslationClient::from_config(&config.translation));
        Self::with_client(config, client)
    }

    /// Create a controller around an existing translation client
    pub fn with_client(config: Config, client: Arc<TranslationClient>) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config, client })
    }

    /// The configuration this controller runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The translation client shared by all workers
    pub fn client(&self) -> &Arc<TranslationClient> {
        &self.client
    }

    /// Find the files a run over `root` will process.
    ///
    /// The set is fixed here; files created later are not picked up.
    pub fn discover_files(&self, root: &Path) -> Result<Vec<PathBuf>, AppError> {
        if !FileManager::dir_exists(root) {
            return Err(AppError::Discovery(format!("Input directory does not exist: {:?}", root)));
        }

        let files = match self.config.pipeline.output_mode {
            OutputMode::Mirror => FileManager::find_files(root, &self.config.pipeline.file_extension),
            OutputMode::InPlace => FileManager::list_files(root),
        };

        files.map_err(|e| AppError::Discovery(format!("{:#}", e)))
    }

    /// Check the language a run translates into, including the output directory it names
    pub fn check_target_language(&self, target_language: &str) -> Result<(), AppError> {
        let pipeline = &self.config.pipeline;
        validate_language_code(target_language).map_err(|e| AppError::Config(format!("{:#}", e)))?;
        if pipeline.output_mode == OutputMode::Mirror {
            pipeline
                .check_markers(target_language)
                .map_err(|e| AppError::Config(format!("{:#}", e)))?;
        }
        Ok(())
    }

    /// Where the translation of `input_file` is written
    pub fn output_path_for(&self, input_file: &Path, target_language: &str) -> Result<PathBuf> {
        let pipeline = &self.config.pipeline;
        match pipeline.output_mode {
            OutputMode::Mirror => FileManager::mirrored_output_path(
                input_file,
                &pipeline.source_marker,
                &pipeline.output_marker_for(target_language),
            ),
            OutputMode::InPlace => Ok(input_file.to_path_buf()),
        }
    }

    fn build_transformer(&self) -> Result<FieldTransformer> {
        let pipeline = &self.config.pipeline;
        let extractor = CodeExtractor::new(&pipeline.control_code_pattern)
            .map_err(|e| anyhow!("Invalid control code pattern: {}", e))?;

        Ok(FieldTransformer::new(Arc::clone(&self.client))
            .with_extractor(extractor)
            .with_fields(&pipeline.fields)
            .with_strict_placeholders(pipeline.strict_placeholders))
    }

    /// Translate every discovered file under `root`.
    ///
    /// Files are processed concurrently, bounded by `max_concurrent_files`.
    /// A failing file does not stop the others; once all are done the first
    /// failure is returned.
    pub async fn run_folder(&self, root: &Path, target_language: &str) -> Result<PipelineSummary> {
        let start_time = Instant::now();
        self.check_target_language(target_language)?;
        let files = self.discover_files(root)?;

        if files.is_empty() {
            warn!("No matching files found in {:?}", root);
            return Ok(PipelineSummary::default());
        }

        if self.config.pipeline.output_mode == OutputMode::InPlace {
            warn!("In-place mode: {} source files will be overwritten without backup", files.len());
        }

        info!(
            "Translating {} files into '{}' with {} ({} at a time)",
            files.len(),
            target_language,
            self.client.backend_name(),
            self.config.pipeline.max_concurrent_files
        );

        let transformer = Arc::new(self.build_transformer()?);
        let semaphore = Arc::new(Semaphore::new(self.config.pipeline.max_concurrent_files));

        let progress_bar = ProgressBar::new(files.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar.set_message("Translating");

        let mut tasks = Vec::with_capacity(files.len());
        for input_file in files {
            let output_file = self.output_path_for(&input_file, target_language);
            let transformer = Arc::clone(&transformer);
            let semaphore = Arc::clone(&semaphore);
            let target_language = target_language.to_string();
            let progress_bar = progress_bar.clone();
            let source = input_file.clone();

            let task = tokio::spawn(async move {
                let result = match output_file {
                    Ok(output_file) => match semaphore.acquire_owned().await {
                        Ok(_permit) => {
                            Self::process_file(&transformer, &source, &output_file, &target_language).await
                        }
                        Err(e) => Err(anyhow!("Worker pool closed: {}", e)),
                    },
                    Err(e) => Err(e),
                };
                progress_bar.inc(1);
                result
            });
            tasks.push((input_file, task));
        }

        let mut summary = PipelineSummary::default();
        let mut first_error: Option<anyhow::Error> = None;

        for (input_file, task) in tasks {
            let outcome = match task.await {
                Ok(result) => result,
                Err(join_error) => Err(anyhow!("Worker for {:?} panicked: {}", input_file, join_error)),
            };

            match outcome {
                Ok(output_file) => summary.written.push(output_file),
                Err(e) => {
                    let e = e.context(format!("Failed to translate {:?}", input_file));
                    error!("{:#}", e);
                    summary.failures.push((input_file, format!("{:#}", e)));
                    first_error.get_or_insert(e);
                }
            }
        }

        progress_bar.finish_and_clear();
        summary.duration = start_time.elapsed();

        info!(
            "Processing completed: {} written, {} failed in {}",
            summary.written.len(),
            summary.failures.len(),
            Self::format_duration(summary.duration)
        );

        match first_error {
            Some(e) => Err(e),
            None => Ok(summary),
        }
    }

    /// Read, translate and write one file
    async fn process_file(
        transformer: &FieldTransformer,
        input_file: &Path,
        output_file: &Path,
        target_language: &str,
    ) -> Result<PathBuf> {
        let content = FileManager::read_to_string(input_file).await?;
        let translated = transformer.transform(&content, target_language).await?;
        FileManager::write_to_file(output_file, &translated).await?;

        info!("Success: {}", output_file.display());
        Ok(output_file.to_path_buf())
    }

    /// Release every loaded model
    pub async fn shutdown(&self) {
        self.client.shutdown().await;
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
