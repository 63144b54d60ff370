use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::result::status::StatusResolver;
use crate::runner::config::RunnerConfig;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "scenario-engine.yaml";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "scenario-engine",
    version,
    about = "Scenario-based acceptance test runner"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: scenario-engine.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the built-in invoice feature and print a report
    Demo {
        /// Output format: console, junit, json
        #[arg(long)]
        format: Option<String>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Number of threads running scenarios concurrently
        #[arg(long)]
        parallel: Option<usize>,

        /// Stop a scenario at the first ignored step
        #[arg(long)]
        stop_on_ignored: bool,

        /// Replace a keyword repeated on consecutive steps (e.g. "and")
        #[arg(long)]
        repeated_keyword: Option<String>,
    },

    /// Render a step name template with name=value parameters
    Format {
        /// Template such as "customer pays {amount} with {}"
        #[arg(long)]
        template: String,

        /// Keyword prefixed to the rendered name
        #[arg(long, default_value = "")]
        keyword: String,

        /// Parameters as name=value, in declaration order
        params: Vec<String>,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `scenario-engine.yaml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_console")]
    pub format: String,

    pub output: Option<String>,

    #[serde(default)]
    pub stop_on_ignored: bool,

    pub repeated_keyword: Option<String>,

    #[serde(default = "default_parallel")]
    pub parallel: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            format: default_console(),
            output: None,
            stop_on_ignored: false,
            repeated_keyword: None,
            parallel: default_parallel(),
        }
    }
}

impl RunConfig {
    /// Runner settings carried by this section. Ignored/bypassed signals
    /// raised by steps are honoured.
    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig::new()
            .with_status_resolver(StatusResolver::with_signals())
            .with_stop_on_ignored(self.stop_on_ignored)
            .with_repeated_keyword(self.repeated_keyword.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when RUST_LOG is unset
    #[serde(default = "default_filter")]
    pub filter: String,

    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

// Serde default helpers
fn default_console() -> String { "console".to_string() }
fn default_parallel() -> usize { 2 }
fn default_filter() -> String { "warn".to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Read and parse a config file. A missing file yields `Ok(None)`.
pub fn read_config(path: &str) -> Result<Option<AppConfig>, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.into(),
                source,
            });
        }
    };
    serde_yaml::from_str(&content)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.into(),
            source,
        })
}

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_FILE);
    match read_config(config_path) {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "using default configuration");
            AppConfig::default()
        }
    }
}

// ============================================================================
// Config Builders (merge CLI args with config file)
// ============================================================================

/// Apply `demo` flags on top of the file's `run` section. CLI wins.
pub fn merge_run_config(
    file: &RunConfig,
    format: Option<String>,
    output: Option<String>,
    parallel: Option<usize>,
    stop_on_ignored: bool,
    repeated_keyword: Option<String>,
) -> RunConfig {
    RunConfig {
        format: format.unwrap_or_else(|| file.format.clone()),
        output: output.or_else(|| file.output.clone()),
        stop_on_ignored: stop_on_ignored || file.stop_on_ignored,
        repeated_keyword: repeated_keyword.or_else(|| file.repeated_keyword.clone()),
        parallel: parallel.unwrap_or(file.parallel).max(1),
    }
}

/// Split `name=value` arguments. Values may contain `=`.
pub fn parse_param(raw: &str) -> Option<(&str, &str)> {
    let (name, value) = raw.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        None
    } else {
        Some((name, value))
    }
}
