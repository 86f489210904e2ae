//! Directory scanning.

use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use tabled::Tabled;
use tracing::debug;

use modproxy::{CandidateKind, Descriptor, ProbeOutcome, Prober, default_binder};
use modproxy_core::error::ErrorKind;
use modproxy_core::config::ProxyConfig;
use modproxy_core::{ProxyError, ProxyResult};

use crate::output::{self, OutputFormat};

/// Arguments for the scan command
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory holding descriptor and module files
    pub dir: PathBuf,
}

/// One descriptor found in the directory.
#[derive(Debug, Serialize, Tabled)]
pub struct ScanRow {
    #[tabled(rename = "Stem")]
    pub stem: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Version")]
    pub version: String,
    #[tabled(rename = "Outcome")]
    pub outcome: ProbeOutcome,
}

/// Probes every descriptor under `dir`, sorted by stem.
pub fn scan_dir(dir: &Path, config: &ProxyConfig) -> ProxyResult<Vec<ScanRow>> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        ProxyError::with_source(
            ErrorKind::Configuration,
            format!("Cannot read directory {}", dir.display()),
            e,
        )
    })?;

    let binder = default_binder();
    let prober = Prober::new(&config.loader, &*binder);

    let mut rows: Vec<ScanRow> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| prober.classify(path) == CandidateKind::Descriptor)
        .map(|path| {
            let outcome = prober.probe(&path);
            match Descriptor::from_file(&path, &config.loader) {
                Ok(d) => ScanRow {
                    stem: d.stem,
                    name: d.name,
                    version: d.version,
                    outcome,
                },
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "Unreadable descriptor");
                    ScanRow {
                        stem: stem_of(&path),
                        name: String::new(),
                        version: String::new(),
                        outcome,
                    }
                }
            }
        })
        .collect();

    rows.sort_by(|a, b| a.stem.cmp(&b.stem));
    Ok(rows)
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Execute the scan command
pub fn execute(args: &ScanArgs, config: &ProxyConfig, format: OutputFormat) -> ProxyResult<()> {
    let rows = scan_dir(&args.dir, config)?;
    output::print_list(&rows, format);
    if format == OutputFormat::Table {
        let matched = rows.iter().filter(|r| r.outcome == ProbeOutcome::Matched).count();
        output::print_success(&format!("{} of {} descriptors loadable", matched, rows.len()));
    }
    Ok(())
}
