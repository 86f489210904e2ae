//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use modproxy_core::ProxyResult;
use modproxy_core::config::ProxyConfig;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
}

/// Execute config commands
pub fn execute(args: &ConfigArgs, config: &ProxyConfig, format: OutputFormat) -> ProxyResult<()> {
    match &args.command {
        ConfigCommand::Show => match format {
            OutputFormat::Json => output::print_item(config, format),
            OutputFormat::Table => {
                let loader = &config.loader;
                println!("[loader]");
                output::print_kv("descriptor_group", &loader.descriptor_group);
                output::print_kv("descriptor_extension", &loader.descriptor_extension);
                output::print_kv("module_extension", &loader.module_extension);
                output::print_kv("factory_symbol", &loader.factory_symbol);
                output::print_kv("locale", loader.locale.as_deref().unwrap_or("(system)"));
                println!("[logging]");
                output::print_kv("level", &config.logging.level);
                output::print_kv("format", &config.logging.format);
            }
        },
    }
    Ok(())
}
