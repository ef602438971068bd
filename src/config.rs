//! XML configuration support.
//! - Loads settings from config.xml (quick_xml).
//! - Creates a template if missing (unless FILEDECK_CONFIG is set).
//!
//! CLI flags override anything loaded here; directory validation happens in
//! the session, not in this module.

use anyhow::{Context, Result};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Informational output (default)
    #[default]
    Normal,
    /// More info (like verbose)
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Runtime configuration for the file manager shell.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Directory the session starts in (current dir when unset)
    pub start_dir: Option<PathBuf>,
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
    /// Include hidden entries in listings/search without an explicit -h
    pub show_hidden: bool,
    /// Worker-pool size override (available parallelism when unset)
    pub worker_threads: Option<usize>,
}

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    start_dir: Option<String>,
    log_level: Option<String>,
    log_file: Option<String>,
    show_hidden: Option<bool>,
    worker_threads: Option<usize>,
}

/// Config file location: FILEDECK_CONFIG wins, else the OS config dir.
pub fn default_config_path() -> Result<PathBuf> {
    if let Some(explicit) = env::var_os("FILEDECK_CONFIG") {
        return Ok(PathBuf::from(explicit));
    }
    let base = dirs::config_dir().context("could not determine a user config directory")?;
    Ok(base.join("filedeck").join("config.xml"))
}

pub enum LoadResult {
    /// No config existed; a template was written for the user to edit.
    CreatedTemplate(PathBuf),
    /// Config parsed (or none applicable); settings merged over defaults.
    Loaded(Config),
}

const TEMPLATE: &str = "<config>\n  <log_level>normal</log_level>\n  <show_hidden>false</show_hidden>\n</config>\n";

/// Load the config file, creating a template on first run at the default
/// location. An explicit FILEDECK_CONFIG that does not exist is an error;
/// a missing default file is not.
pub fn load_or_init() -> Result<LoadResult> {
    let explicit = env::var_os("FILEDECK_CONFIG").is_some();
    let path = default_config_path()?;

    if !path.exists() {
        if explicit {
            anyhow::bail!("FILEDECK_CONFIG points at a missing file: {}", path.display());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating config directory for {}", path.display()))?;
        }
        fs::write(&path, TEMPLATE)
            .with_context(|| format!("writing template config to {}", path.display()))?;
        return Ok(LoadResult::CreatedTemplate(path));
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    let xml: XmlConfig = from_xml_str(&content)
        .with_context(|| format!("parsing config file {}", path.display()))?;
    debug!(path = %path.display(), "config loaded");

    let mut cfg = Config::default();
    cfg.start_dir = xml.start_dir.map(PathBuf::from);
    if let Some(level) = xml.log_level.as_deref().and_then(LogLevel::parse) {
        cfg.log_level = level;
    }
    cfg.log_file = xml.log_file.map(PathBuf::from);
    cfg.show_hidden = xml.show_hidden.unwrap_or(false);
    cfg.worker_threads = xml.worker_threads.filter(|n| *n > 0);
    Ok(LoadResult::Loaded(cfg))
}
