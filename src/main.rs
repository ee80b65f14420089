// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use metaforge::app_config::{self, Config};
use metaforge::validation::Classification;
use metaforge::{CalendarDate, Controller, Identifier};

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
    /// Restamp the publication date of a document in place
    ChangeDate {
        /// LaTeX document to restamp
        #[arg(value_name = "LATEX_FILE")]
        latex_file: PathBuf,

        /// DD-MM-YYYY, YYYY-MM-DD, days from today, or empty for today
        #[arg(value_name = "PUBLISH_DATE", default_value = "")]
        publish_date: String,
    },

    /// Write the publication form of a manuscript for a DOI
    Publish {
        /// Manuscript template; outputs land in its folder
        #[arg(value_name = "LATEX_FILE")]
        latex_file: PathBuf,

        /// Target DOI, e.g. A.5.2.100
        #[arg(value_name = "TARGET_DOI")]
        target_doi: String,

        /// DD-MM-YYYY, YYYY-MM-DD, days from today, or empty for today
        #[arg(value_name = "PUBLISH_DATE", default_value = "")]
        publish_date: String,
    },

    /// Replace a plain abstract file with its JATS conversion
    JatsAbstract {
        /// Text file holding the abstract
        #[arg(value_name = "TXT_FILE")]
        txt_file: PathBuf,
    },

    /// Check that every bibliography DOI resolves
    CheckDois {
        /// LaTeX document, or a folder searched for .tex files
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        /// Exit with an error when a DOI does not resolve
        #[arg(long)]
        strict: bool,

        /// Maximum number of checks in flight
        #[arg(short = 'j', long)]
        jobs: Option<usize>,

        /// Per-request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Print the front matter read from a manuscript
    Inspect {
        /// LaTeX document to read
        #[arg(value_name = "LATEX_FILE")]
        latex_file: PathBuf,
    },

    /// Generate shell completions for metaforge
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// MetaForge - manuscript finalization and DOI checks
///
/// Turns LaTeX manuscript templates into their publication form and checks
/// that the DOIs they cite still resolve.
#[derive(Parser, Debug)]
#[command(name = "metaforge")]
#[command(version)]
#[command(about = "Manuscript finalization and DOI checks")]
#[command(long_about = "MetaForge rewrites LaTeX manuscript templates into their publication form.

EXAMPLES:
    metaforge publish paper/main.tex A.5.2.100 05-03-2024   # Finalize for a DOI
    metaforge publish paper/main.tex A.5.2.100 7            # Publish a week from today
    metaforge change-date paper/A_5_2_100.tex 2024-03-12    # Restamp in place
    metaforge jats-abstract paper/abstract.txt              # Convert an abstract
    metaforge check-dois --strict papers/                   # Check every bibliography
    metaforge inspect paper/main.tex                        # Show front matter
    metaforge completions bash > metaforge.bash             # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
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

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for log level
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
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let level = record.level();

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(level),
                now,
                Self::get_emoji_for_level(level),
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
    // Trace is the ceiling; the effective level is set once the config is read
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "metaforge", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(cmd_log_level) = &cli.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&cli.config_path)?;

    if let Commands::CheckDois { jobs, timeout, .. } = &cli.command {
        if let Some(jobs) = jobs {
            config.resolver.concurrent_requests = *jobs;
        }
        if let Some(timeout) = timeout {
            config.resolver.timeout_secs = *timeout;
        }
    }

    match &cli.log_level {
        Some(log_level) => config.log_level = log_level.clone().into(),
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    config.validate().context("Configuration validation failed")?;

    let controller = Controller::with_config(config)?;
    run(cli.command, &controller).await
}

async fn run(command: Commands, controller: &Controller) -> Result<()> {
    let today = chrono::Local::now().date_naive();

    match command {
        Commands::ChangeDate { latex_file, publish_date } => {
            let date = CalendarDate::from_cli_argument(&publish_date, today)?;
            controller.change_date(&latex_file, &date)?;
        }
        Commands::Publish { latex_file, target_doi, publish_date } => {
            let date = CalendarDate::from_cli_argument(&publish_date, today)?;
            let identifier = Identifier::new(target_doi);
            let report = controller.publish(&latex_file, &identifier, &date)?;
            info!("Success: {:?}", report.document_path);
        }
        Commands::JatsAbstract { txt_file } => {
            controller.write_jats_abstract(&txt_file)?;
            info!("Success: {:?}", txt_file);
        }
        Commands::CheckDois { input_path, strict, .. } => {
            let report = controller.check_dois(&input_path).await?;
            let broken = report.count(Classification::Broken);
            if strict && broken > 0 {
                error!("{} DOI(s) do not resolve", broken);
                return Err(anyhow!("{} of {} DOI(s) do not resolve", broken, report.checked()));
            }
        }
        Commands::Inspect { latex_file } => {
            let inspection = controller.inspect(&latex_file)?;
            print!("{}", inspection);
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}
