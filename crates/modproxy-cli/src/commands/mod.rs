//! CLI command definitions and dispatch.

pub mod config;
pub mod inspect;
pub mod probe;
pub mod scan;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use modproxy_core::ProxyResult;
use modproxy_core::config::ProxyConfig;

use crate::output::OutputFormat;

/// modproxy: inspect sub-extensions the way the proxy sees them
#[derive(Debug, Parser)]
#[command(name = "modproxy-cli", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/modproxy.toml")]
    pub config: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Classify candidate files
    Probe(probe::ProbeArgs),
    /// Show a descriptor and whether its module binds
    Inspect(inspect::InspectArgs),
    /// Probe every descriptor in a directory
    Scan(scan::ScanArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(&self) -> ProxyResult<()> {
        let config = load_config(&self.config)?;
        match &self.command {
            Commands::Probe(args) => probe::execute(args, &config, self.format),
            Commands::Inspect(args) => inspect::execute(args, &config, self.format),
            Commands::Scan(args) => scan::execute(args, &config, self.format),
            Commands::Config(args) => config::execute(args, &config, self.format),
        }
    }
}

/// Helper: load configuration from file plus the environment. A missing
/// file yields the defaults.
pub fn load_config(path: &Path) -> ProxyResult<ProxyConfig> {
    ProxyConfig::load(Some(path))
}
