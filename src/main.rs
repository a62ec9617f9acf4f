// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
// Add other lints specific to this module that you want to allow but not auto-fix

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use app_controller::Controller;

mod app_config;
mod app_controller;
mod bronze_loader;
mod database;
mod errors;
mod file_utils;
mod transform_runner;

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

/// Which pipeline phases a subcommand covers
#[derive(Debug, Clone, Copy)]
enum PipelineCommand {
    Run,
    Init,
    Bronze,
    Silver,
    Gold,
}

#[derive(Parser, Debug, Clone)]
struct PipelineArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Override the warehouse database file path
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the full pipeline: init -> bronze -> silver -> gold (default command)
    #[command(alias = "pipeline")]
    Run(PipelineArgs),

    /// Create the bronze, silver and gold schemas if missing
    Init(PipelineArgs),

    /// Load the bronze layer from the configured CSV sources
    Bronze(PipelineArgs),

    /// Apply the silver transform batch
    Silver(PipelineArgs),

    /// Apply the gold transform batch
    Gold(PipelineArgs),

    /// Generate shell completions for mallard
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Mallard - DuckDB medallion warehouse loader
///
/// A batch ELT tool that loads raw CSV extracts into a bronze layer,
/// then builds the silver and gold layers from externally authored SQL batches.
#[derive(Parser, Debug)]
#[command(name = "mallard")]
#[command(version = "1.0.0")]
#[command(about = "DuckDB medallion warehouse loader")]
#[command(long_about = "Mallard loads CSV extracts into a DuckDB warehouse following the
medallion (bronze/silver/gold) pattern.

EXAMPLES:
    mallard                                # Run the full pipeline with default config
    mallard init                           # Create the warehouse schemas only
    mallard bronze                         # Reload the bronze layer from CSV sources
    mallard silver                         # Re-apply the silver transform batch
    mallard run -d /tmp/wh.duckdb          # Use a different warehouse file
    mallard run --log-level debug          # Run with debug logging
    mallard completions bash > mallard.bash # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default
    one will be created automatically.

PIPELINE:
    init    - CREATE SCHEMA IF NOT EXISTS for bronze, silver, gold
    bronze  - full-replace each configured table from its CSV source
    silver  - execute scripts/silver/load_silver.sql verbatim
    gold    - execute scripts/gold/load_gold.sql verbatim")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    args: PipelineArgs,
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
    fn get_color_for_level(level: Level) -> &'static str {
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
            let color = Self::get_color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {}\x1B[0m", color, now, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    // Handle subcommands
    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "mallard", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Run(args)) => run_command(PipelineCommand::Run, args),
        Some(Commands::Init(args)) => run_command(PipelineCommand::Init, args),
        Some(Commands::Bronze(args)) => run_command(PipelineCommand::Bronze, args),
        Some(Commands::Silver(args)) => run_command(PipelineCommand::Silver, args),
        Some(Commands::Gold(args)) => run_command(PipelineCommand::Gold, args),
        // Default behavior - run the full pipeline with top-level args
        None => run_command(PipelineCommand::Run, cli.args),
    }
}

fn run_command(command: PipelineCommand, options: PipelineArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level_filter_for(&config_log_level));
    }

    // Load or create configuration
    let config_path = &options.config_path;
    let config = if Path::new(config_path).exists() {
        // Load existing configuration
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        let mut config: Config = serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?;

        // Override config with CLI options if provided
        if let Some(database) = &options.database {
            config.database_path = database.clone();
        }

        if let Some(log_level) = &options.log_level {
            config.log_level = log_level.clone().into();
        }

        config
    } else {
        // Create default configuration if not exists
        warn!(
            "Config file not found at '{}', creating default config.",
            config_path
        );

        let mut config = Config::default();

        if let Some(database) = &options.database {
            config.database_path = database.clone();
        }

        if let Some(log_level) = &options.log_level {
            config.log_level = log_level.clone().into();
        }

        // Save default config
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    // Validate the configuration after loading and overriding
    config
        .validate()
        .context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(level_filter_for(&config.log_level));
    }

    // Create controller and dispatch
    let controller = Controller::with_config(config)?;

    match command {
        PipelineCommand::Run => controller.run_pipeline().map(|_| ()),
        PipelineCommand::Init => controller.run_init(),
        PipelineCommand::Bronze => controller.run_bronze(),
        PipelineCommand::Silver => controller.run_silver(),
        PipelineCommand::Gold => controller.run_gold(),
    }
}

// @returns: log crate filter for a configured level
fn level_filter_for(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}
