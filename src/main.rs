// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use log::{info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::PathBuf;
use std::io::Write;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use subshift::app_config::{self, Config};
use subshift::app_controller::Controller;
use subshift::{LineEnding, NegativeTimePolicy};

/// CLI Wrapper for NegativeTimePolicy to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliNegativePolicy {
    Clamp,
    Reject,
}

impl From<CliNegativePolicy> for NegativeTimePolicy {
    fn from(cli_policy: CliNegativePolicy) -> Self {
        match cli_policy {
            CliNegativePolicy::Clamp => NegativeTimePolicy::Clamp,
            CliNegativePolicy::Reject => NegativeTimePolicy::Reject,
        }
    }
}

/// CLI Wrapper for LineEnding to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLineEnding {
    Lf,
    Crlf,
}

impl From<CliLineEnding> for LineEnding {
    fn from(cli_ending: CliLineEnding) -> Self {
        match cli_ending {
            CliLineEnding::Lf => LineEnding::Lf,
            CliLineEnding::Crlf => LineEnding::CrLf,
        }
    }
}

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
    /// Shift every timestamp of a subtitle file (default command)
    Shift(ShiftArgs),

    /// Generate shell completions for subshift
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct ShiftArgs {
    /// Subtitle file to shift
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Timeshift in milliseconds (e.g. 500, -1200)
    #[arg(value_name = "DELTA", allow_negative_numbers = true)]
    delta: String,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Directory the shifted file is written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// What to do with timestamps shifted below zero
    #[arg(short, long, value_enum)]
    negative_policy: Option<CliNegativePolicy>,

    /// Line terminator of the output file
    #[arg(long, value_enum)]
    line_ending: Option<CliLineEnding>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// Subshift - Subtitle timestamp shifter
///
/// Moves every "HH:MM:SS,mmm --> HH:MM:SS,mmm" line of a subtitle file by a
/// fixed number of milliseconds and writes the result next to the other
/// shifted files, in the encoding the input was written in.
#[derive(Parser, Debug)]
#[command(name = "subshift")]
#[command(author = "Subshift Team")]
#[command(version = "1.0.0")]
#[command(about = "Shift subtitle timestamps by a fixed offset")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "Subshift moves every subtitle timestamp by a signed number of milliseconds.

EXAMPLES:
    subshift movie.srt 500                      # Delay subtitles by half a second
    subshift movie.srt -1200                    # Show subtitles 1.2 seconds earlier
    subshift -f movie.srt 500                   # Force overwrite of movie_+500.srt
    subshift -o out/ movie.srt 500              # Write into out/ instead of the shifted dir
    subshift -n reject movie.srt -90000         # Fail instead of clamping at 00:00:00,000
    subshift completions bash > subshift.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

OUTPUT NAMING:
    movie.srt shifted by 500 becomes movie_+500.srt, by -500 movie_-500.srt.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Subtitle file to shift
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Timeshift in milliseconds (e.g. 500, -1200)
    #[arg(value_name = "DELTA", allow_negative_numbers = true)]
    delta: Option<String>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Directory the shifted file is written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// What to do with timestamps shifted below zero
    #[arg(short, long, value_enum)]
    negative_policy: Option<CliNegativePolicy>,

    /// Line terminator of the output file
    #[arg(long, value_enum)]
    line_ending: Option<CliLineEnding>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
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
        // The logger itself passes everything; log::set_max_level does the filtering
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn get_color_for_level(level: Level) -> &'static str {
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
            let color = Self::get_color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                color, now, record.level(), record.args()
            );
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
            generate(shell, &mut cmd, "subshift", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Shift(args)) => run_shift(args),
        None => {
            // Default behavior - use top-level args
            let input_path = cli.input_path.ok_or_else(|| {
                anyhow!("INPUT_PATH is required when no subcommand is specified")
            })?;
            let delta = cli.delta.ok_or_else(|| {
                anyhow!("DELTA is required when no subcommand is specified")
            })?;

            let shift_args = ShiftArgs {
                input_path,
                delta,
                force_overwrite: cli.force_overwrite,
                output_dir: cli.output_dir,
                negative_policy: cli.negative_policy,
                line_ending: cli.line_ending,
                config_path: cli.config_path,
                log_level: cli.log_level,
            };
            run_shift(shift_args)
        }
    }
}

fn run_shift(options: ShiftArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(config_log_level.to_level_filter());
    }

    // Load or create configuration
    let mut config = Config::load_or_create(&options.config_path)?;

    // Override config with CLI options if provided
    if let Some(output_dir) = &options.output_dir {
        config.storage.shifted_dir = output_dir.clone();
    }

    if let Some(policy) = &options.negative_policy {
        config.shift.options.negative_time_policy = policy.clone().into();
    }

    if let Some(line_ending) = &options.line_ending {
        config.shift.options.line_ending = line_ending.clone().into();
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    } else {
        // Just update the max level without reinitializing the logger
        log::set_max_level(config.log_level.to_level_filter());
    }

    // Create controller (validates the configuration)
    let controller = Controller::with_config(config)?;

    if let Some(outcome) = controller.run(&options.input_path, &options.delta, options.force_overwrite)? {
        info!("Success: {:?}", outcome.output_path);
        println!("{}", outcome.output_path.display());
    }

    Ok(())
}
