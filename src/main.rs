// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{debug, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use crate::app_config::{Config, LogLevel};
use app_controller::Controller;

mod app_config;
mod app_controller;
mod backend;
mod cache;
mod errors;
mod model;
mod pipeline;
mod render;
mod session;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Browse the historical database interactively (default command)
    Browse(BrowseArgs),

    /// Generate shell completions for crge-explorer
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug, Clone)]
struct BrowseArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Backend project URL (overrides the config file)
    #[arg(short = 'u', long, env = "CRGE_BACKEND_URL")]
    backend_url: Option<String>,

    /// Backend anonymous API key (overrides the config file)
    #[arg(short = 'k', long, env = "CRGE_ANON_KEY")]
    anon_key: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// CRGE Historical Database Explorer
///
/// An authenticated terminal browser for the CRGE bilingual historical-record
/// database: sign in, filter by country, period, section, or free text, and
/// read matching entries in English and in the original language.
#[derive(Parser, Debug)]
#[command(name = "crge-explorer")]
#[command(version = "1.0.0")]
#[command(about = "Authenticated browser for the CRGE historical database")]
#[command(long_about = "crge-explorer signs in against the CRGE backend and browses the bilingual
historical-record tables interactively.

EXAMPLES:
    crge-explorer                                   # Browse using conf.json
    crge-explorer -c prod.json                      # Use a specific config file
    crge-explorer -u https://proj.example.co -k KEY # Override backend credentials
    crge-explorer --log-level debug                 # Verbose cache/query logging
    crge-explorer completions bash > crge.bash      # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default
    one will be created automatically; fill in backend.url and backend.anon_key
    before the first sign-in. CRGE_BACKEND_URL and CRGE_ANON_KEY environment
    variables override the file.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    browse: BrowseArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
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
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:5} {}\x1B[0m",
                color,
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

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let options = CommandLineOptions::parse();

    let args = match options.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            return Ok(());
        }
        Some(Commands::Browse(args)) => args,
        None => options.browse,
    };

    let config_path = resolve_config_path(&args.config_path);
    let mut config = Config::load_or_create(&config_path)?;
    debug!("Loaded configuration from {}", config_path.display());

    // Command line and environment overrides win over the file
    if let Some(url) = args.backend_url {
        config.backend.url = url;
    }
    if let Some(key) = args.anon_key {
        config.backend.anon_key = key;
    }
    if let Some(level) = args.log_level {
        config.log_level = level.into();
    }

    log::set_max_level(config.log_level.into());

    let mut controller = Controller::with_config(config)?;
    controller.run().await
}

/// Use the given path if it exists or was explicitly requested; otherwise
/// fall back to the per-user config location
fn resolve_config_path(requested: &str) -> PathBuf {
    let requested_path = PathBuf::from(requested);
    if requested_path.exists() || requested != "conf.json" {
        return requested_path;
    }
    Config::default_path().to_path_buf()
}
