// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use scriptsync::app_config::{self, Config};
use scriptsync::app_controller::Controller;

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
    /// Align an XLIFF scene document with a subtitle file and print the timeline
    Timeline {
        /// XLIFF scene document (UTF-8/UTF-16, optionally JSON-wrapped)
        #[arg(value_name = "XLIFF")]
        document: PathBuf,

        /// Subtitle file (SRT or dotted timestamps)
        #[arg(value_name = "SUBTITLES")]
        subtitles: PathBuf,

        /// Write the timeline here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract narrated scenes from an XLIFF scene document
    Script {
        /// XLIFF scene document
        #[arg(value_name = "XLIFF")]
        document: PathBuf,

        /// Write the scenes here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build timelines for every XLIFF document in a directory that has a matching subtitle file
    Batch {
        /// Directory to scan recursively
        #[arg(value_name = "DIR")]
        input_dir: PathBuf,
    },

    /// Generate shell completions for scriptsync
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// scriptsync - time-coded scripts from XLIFF scene documents
///
/// Aligns the narration of an XLIFF scene document with a subtitle stream and
/// emits an ordered JSON timeline of scenes.
#[derive(Parser, Debug)]
#[command(name = "scriptsync")]
#[command(version)]
#[command(about = "Time-coded scene scripts from XLIFF documents and subtitles")]
#[command(long_about = "scriptsync aligns XLIFF scene narration with subtitle cues.

EXAMPLES:
    scriptsync timeline video.xliff video.srt          # Print the timeline as JSON
    scriptsync timeline video.xliff video.srt -o t.json # Write the timeline to a file
    scriptsync script video.xliff                       # Print narrated scenes only
    scriptsync batch ./exports                          # Process every xliff/srt pair
    scriptsync completions bash > scriptsync.bash       # Generate bash completions

CONFIGURATION:
    Configuration is read from scriptsync.json by default. You can specify a
    different file with --config-path. Missing files fall back to defaults.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Force overwrite of existing output files
    #[arg(short, long, global = true)]
    force_overwrite: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "scriptsync.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Emit compact JSON
    #[arg(long, global = true)]
    compact: bool,
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

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
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
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {:<5} {}\x1B[0m",
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

fn main() -> Result<()> {
    // Logger accepts everything; the effective level is narrowed via set_max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "scriptsync", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(level) = &cli.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.into());
    }

    let config = load_config(&cli.config_path, &cli)?;
    let controller = Controller::with_config(config)?;

    match &cli.command {
        Commands::Timeline { document, subtitles, output } => {
            let json = controller.run_timeline(document, subtitles)?;
            controller.write_output(&json, output.as_deref(), cli.force_overwrite)?;
        }
        Commands::Script { document, output } => {
            let json = controller.run_script(document)?;
            controller.write_output(&json, output.as_deref(), cli.force_overwrite)?;
        }
        Commands::Batch { input_dir } => {
            let summary = controller.run_folder(input_dir, cli.force_overwrite)?;
            if summary.failed > 0 {
                return Err(anyhow!("{} document(s) failed to process", summary.failed));
            }
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

// Load the config file if present and apply command line overrides
fn load_config(path: &Path, cli: &CommandLineOptions) -> Result<Config> {
    let mut config = if path.exists() {
        let config = Config::from_file(path)
            .map_err(|e| anyhow!("Failed to load config file {:?}: {}", path, e))?;
        info!("Loaded configuration from {:?}", path);
        config
    } else {
        if path != Path::new("scriptsync.json") {
            warn!("Config file not found at {:?}, using defaults", path);
        }
        Config::default()
    };

    if let Some(level) = &cli.log_level {
        config.log_level = level.clone().into();
    } else {
        log::set_max_level(config.log_level.into());
    }

    if cli.compact {
        config.output.pretty = false;
    }

    Ok(config)
}
