//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! Notes:
//! - Flags override config values (which are loaded from XML if present).
//! - --debug is a shorthand for --log-level debug.

use clap::{Parser, ValueHint};
use std::path::PathBuf;

use filedeck::config::{Config, LogLevel};

/// Interactive file manager shell over the filedeck core.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Navigate and batch-edit a directory tree safely")]
pub struct Args {
    /// Directory to start the session in (created if missing).
    #[arg(value_name = "START_DIR", value_hint = ValueHint::DirPath)]
    pub start_dir: Option<PathBuf>,

    /// Run a single command line (commands separated by ';') and exit
    /// instead of entering the interactive prompt.
    #[arg(short = 'c', long = "command", value_name = "LINE")]
    pub command: Option<String>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Append logs to this file in addition to stdout.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Include hidden entries in listings without an explicit -h.
    #[arg(long)]
    pub show_hidden: bool,

    /// Worker-pool size for async batches (defaults to available cores).
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,

    /// Print the config file location used by filedeck and exit.
    #[arg(long)]
    pub print_config: bool,

    /// Emit logs in structured JSON.
    #[arg(long, help = "Emit logs in structured JSON")]
    pub json: bool,
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset
    /// flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(dir) = &self.start_dir {
            cfg.start_dir = Some(dir.clone());
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(file) = &self.log_file {
            cfg.log_file = Some(file.clone());
        }
        if self.show_hidden {
            cfg.show_hidden = true;
        }
        if let Some(n) = self.threads {
            cfg.worker_threads = Some(n);
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
