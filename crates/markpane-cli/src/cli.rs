use clap::{Parser, Subcommand, ValueEnum};
use markpane_parser::Preset;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors (default)
    Warn,
    /// Informational messages
    Info,
    /// Debug messages (default for verbose)
    Debug,
    /// Trace-level messages, including declined syntax
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Parser preset selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PresetArg {
    /// Full syntax including raw HTML
    Rich,
    /// No raw HTML, for untrusted input
    Guest,
}

impl From<PresetArg> for Preset {
    fn from(preset: PresetArg) -> Self {
        match preset {
            PresetArg::Rich => Preset::Rich,
            PresetArg::Guest => Preset::Guest,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "mdp")]
#[command(about = "mdp - render markdown the way the markpane preview does")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (off, error, warn, info, debug, trace)
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Level for the log filter; `RUST_LOG` still overrides it.
    pub fn level_filter(&self) -> LevelFilter {
        match (self.log_level, self.verbose) {
            (Some(level), _) => level.into(),
            (None, true) => LevelFilter::DEBUG,
            (None, false) => LevelFilter::WARN,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a markdown file to HTML
    Render {
        /// Markdown file, or `-` for stdin
        input: PathBuf,

        /// Parser preset (overrides the config file)
        #[arg(short, long, value_enum)]
        preset: Option<PresetArg>,

        /// Editor config file supplying the renderer
        #[arg(short = 'C', long)]
        config: Option<PathBuf>,
    },

    /// Print the source line of every top-level block
    Lines {
        /// Markdown file, or `-` for stdin
        input: PathBuf,
    },
}
