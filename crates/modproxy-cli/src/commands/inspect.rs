//! Descriptor inspection.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use modproxy::{Descriptor, Prober, default_binder};
use modproxy_core::ProxyResult;
use modproxy_core::config::ProxyConfig;

use crate::output::{self, OutputFormat};

/// Arguments for the inspect command
#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Descriptor file
    pub descriptor: PathBuf,
}

/// A descriptor together with what the proxy would make of it.
#[derive(Debug, Serialize)]
pub struct Inspection {
    #[serde(flatten)]
    pub descriptor: Descriptor,
    pub module_path: PathBuf,
    pub module_present: bool,
    pub module_binds: bool,
}

/// Reads the descriptor and checks its module.
pub fn inspect(path: &std::path::Path, config: &ProxyConfig) -> ProxyResult<Inspection> {
    let descriptor = Descriptor::from_file(path, &config.loader)?;
    let module_path = descriptor.module_path(&config.loader);
    let binder = default_binder();
    let module_binds = Prober::new(&config.loader, &*binder).probe_module(&module_path, false);

    Ok(Inspection {
        module_present: module_path.is_file(),
        module_path,
        module_binds,
        descriptor,
    })
}

/// Execute the inspect command
pub fn execute(args: &InspectArgs, config: &ProxyConfig, format: OutputFormat) -> ProxyResult<()> {
    let inspection = inspect(&args.descriptor, config)?;
    match format {
        OutputFormat::Json => output::print_item(&inspection, format),
        OutputFormat::Table => {
            let d = &inspection.descriptor;
            println!("{}", d.name);
            output::print_kv("Stem", &d.stem);
            output::print_kv("Description", &d.description);
            output::print_kv("Version", &d.version);
            output::print_kv("Author", &d.author);
            output::print_kv("Help", &d.help_uri);
            output::print_kv("Configurable", output::yes_no(d.configurable));
            output::print_kv("Module", &inspection.module_path.display().to_string());
            if !inspection.module_present {
                output::print_warning("Module file is missing");
            } else if !inspection.module_binds {
                output::print_warning(&format!(
                    "Module does not export {}",
                    config.loader.factory_symbol
                ));
            } else {
                output::print_success("Module binds");
            }
        }
    }
    Ok(())
}
