// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::default_config_path;
use crate::types::WatcherBackend;

/// Command-line arguments for `progload`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "progload",
    version,
    about = "Load a directory of programs and hot-reload them as the files change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Progload.toml` in the current working directory. A missing
    /// file means built-in defaults.
    #[arg(long, value_name = "PATH", default_value_os_t = default_config_path())]
    pub config: PathBuf,

    /// Directory containing program files (overrides `[loader].program_dir`).
    #[arg(long, value_name = "DIR")]
    pub program_dir: Option<PathBuf>,

    /// Program-file suffix without the dot (overrides `[loader].extension`).
    #[arg(long, value_name = "EXT")]
    pub extension: Option<String>,

    /// Print the compiled form of every program after it loads.
    #[arg(long)]
    pub dump_programs: bool,

    /// Load every program once, report failures, and exit without watching.
    #[arg(long)]
    pub compile_only: bool,

    /// Watcher backend (native, poll). Overrides `[watcher].backend`.
    #[arg(long, value_name = "BACKEND")]
    pub watcher: Option<WatcherBackend>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PROGLOAD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
