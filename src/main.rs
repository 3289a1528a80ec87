// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use questlate::app_config::{self, Config, OutputMode};
use questlate::{Controller, language_utils};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for questlate
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// questlate - translate quest files while keeping their formatting codes
#[derive(Parser, Debug)]
#[command(name = "questlate")]
#[command(version)]
#[command(about = "Formatting-preserving translation of quest files")]
#[command(long_about = "questlate translates the title, subtitle and description fields of every
quest file under a directory and writes the result to a mirrored tree.

EXAMPLES:
    questlate                                   # Ask for directory and language
    questlate ~/quests/chapters -t de           # Translate into German
    questlate ~/quests/chapters -t ru -j 8      # Eight files at a time
    questlate completions bash > questlate.bash # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't exist,
    a default one is created. Translations come from an Ollama server.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory holding the quest files (asked for when omitted)
    #[arg(value_name = "DIRECTORY")]
    directory: Option<PathBuf>,

    /// Target language code (e.g., 'ru', 'de', 'fr'; asked for when omitted)
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Maximum number of files translated at once
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Overwrite source files instead of writing a mirrored tree (deprecated)
    #[arg(long)]
    in_place: bool,
}

// @struct: Custom logger implementation; filtering follows `log::max_level()`
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Ask a question on the console and return the trimmed answer
fn prompt(question: &str) -> Result<String> {
    print!("{}", question);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    let read = std::io::stdin().lock().read_line(&mut answer)?;
    if read == 0 {
        return Err(anyhow!("No answer given (end of input)"));
    }
    Ok(answer.trim().to_string())
}

/// Load the config file, creating a default one when it doesn't exist
fn load_or_create_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        return Config::load(config_path);
    }

    warn!("Config file not found at '{}', creating default config.", config_path);
    let config = Config::default();
    config
        .save(config_path)
        .context(format!("Failed to write default config to file: {}", config_path))?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "questlate", &mut std::io::stdout());
        return Ok(());
    }

    run_translate(cli).await
}

async fn run_translate(options: CommandLineOptions) -> Result<()> {
    let mut config = load_or_create_config(&options.config_path)?;

    if let Some(log_level) = options.log_level {
        config.log_level = log_level.into();
    }
    log::set_max_level(level_filter(&config.log_level));

    if let Some(jobs) = options.jobs {
        config.pipeline.max_concurrent_files = jobs;
    }
    if options.in_place {
        config.pipeline.output_mode = OutputMode::InPlace;
    }

    let directory = match options.directory {
        Some(directory) => directory,
        None => PathBuf::from(prompt(
            "Path to the quest files (e.g. /home/username/quests/chapters): ",
        )?),
    };

    let target_language = match options.target_language {
        Some(language) => language,
        None => {
            let answer = prompt(&format!(
                "Target language (e.g. ru for Russian) [{}]: ",
                config.target_language
            ))?;
            if answer.is_empty() {
                config.target_language.clone()
            } else {
                answer
            }
        }
    };
    config.target_language = target_language.to_lowercase();

    let language_name = language_utils::get_language_name(&config.target_language)?;
    let controller = Controller::with_config(config)?;
    info!("Target language: {} ({})", language_name, controller.config().target_language);

    let target_language = controller.config().target_language.clone();
    let result = controller.run_folder(&directory, &target_language).await;
    controller.shutdown().await;

    result.map(|_| ())
}
