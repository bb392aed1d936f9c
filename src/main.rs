// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use coltrans::app_config::{self, Config};
use coltrans::app_controller::Controller;

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

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a record file (default command)
    Translate {
        /// Input record file (.json, .jsonl or .ndjson)
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        #[command(flatten)]
        options: TranslateOptions,
    },

    /// Generate shell completions for coltrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Settings that override the configuration file
#[derive(Args, Debug, Clone)]
struct TranslateOptions {
    /// Output record file (default: <input>.<lang>.<ext>)
    #[arg(short, long)]
    output_path: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Target language code (e.g., 'es', 'fr', 'pt-BR')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Translation endpoint URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Client certificate (PEM) for mutual TLS
    #[arg(long, env = "COLTRANS_CERT")]
    cert: Option<PathBuf>,

    /// Client private key (PKCS#8 PEM) for mutual TLS
    #[arg(long, env = "COLTRANS_KEY")]
    key: Option<PathBuf>,

    /// Character budget per batch
    #[arg(long)]
    max_chars: Option<usize>,

    /// Maximum concurrent batch requests
    #[arg(long)]
    max_concurrent: Option<usize>,

    /// Attempts per batch before passing it through untranslated
    #[arg(long)]
    max_retries: Option<u32>,

    /// Record field holding the text to translate
    #[arg(long)]
    input_field: Option<String>,

    /// Record field receiving the translation
    #[arg(long)]
    output_field: Option<String>,

    /// Record field receiving a per-record status ("translated" or "passed_through")
    #[arg(long)]
    status_field: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// coltrans - translate a column of records through a remote endpoint
///
/// Texts are grouped into character-bounded batches, sent with a bounded
/// number of concurrent requests, retried with exponential backoff, and written
/// back into the records in their original order.
#[derive(Parser, Debug)]
#[command(name = "coltrans")]
#[command(version)]
#[command(about = "Batch translation of record columns over mutual TLS")]
#[command(long_about = "coltrans reads a JSON or JSON Lines record file, translates one text field of every record, and writes the translations into another field.

EXAMPLES:
    coltrans records.json                                 # Translate using conf.json
    coltrans -t fr records.jsonl                          # Translate to French
    coltrans --cert client.pem --key client.key data.json # Authenticate with a client certificate
    coltrans --status-field status -f data.json           # Record which rows were translated
    coltrans completions bash > coltrans.bash             # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input record file (.json, .jsonl or .ndjson)
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    #[command(flatten)]
    options: TranslateOptions,
}

// @struct: Custom logger implementation
// Filtering follows log::max_level(), so the level can change after init
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger);
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
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
            let (color, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                color, now, tag, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "coltrans", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate { input_path, options }) => run_translate(input_path, options).await,
        None => {
            let input_path = cli.input_path.ok_or_else(|| {
                anyhow!("INPUT_PATH is required when no subcommand is specified")
            })?;
            run_translate(input_path, cli.options).await
        }
    }
}

/// Load the configuration file, or write a default one if it is missing
fn load_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        Config::from_file(config_path)
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        config.save(config_path)?;
        Ok(config)
    }
}

/// Apply command line overrides on top of the file configuration
fn apply_overrides(config: &mut Config, options: &TranslateOptions) {
    if let Some(target_language) = &options.target_language {
        config.target_language = target_language.clone();
    }
    if let Some(endpoint) = &options.endpoint {
        config.translation.endpoint = endpoint.clone();
    }
    if let Some(cert) = &options.cert {
        config.translation.cert_path = Some(cert.clone());
    }
    if let Some(key) = &options.key {
        config.translation.key_path = Some(key.clone());
    }
    if let Some(max_chars) = options.max_chars {
        config.translation.max_chars_per_batch = max_chars;
    }
    if let Some(max_concurrent) = options.max_concurrent {
        config.translation.max_concurrent_requests = max_concurrent;
    }
    if let Some(max_retries) = options.max_retries {
        config.translation.max_retries = max_retries;
    }
    if let Some(input_field) = &options.input_field {
        config.input_field = input_field.clone();
    }
    if let Some(output_field) = &options.output_field {
        config.output_field = output_field.clone();
    }
    if let Some(status_field) = &options.status_field {
        config.status_field = Some(status_field.clone());
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

async fn run_translate(input_path: PathBuf, options: TranslateOptions) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(config_log_level.to_level_filter());
    }

    let mut config = load_config(&options.config_path)?;
    apply_overrides(&mut config, &options);

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let controller = Controller::with_config(config)?;
    let output_path = options
        .output_path
        .clone()
        .unwrap_or_else(|| controller.default_output_path(&input_path));

    controller
        .run(input_path, output_path, options.force_overwrite)
        .await?;

    Ok(())
}
