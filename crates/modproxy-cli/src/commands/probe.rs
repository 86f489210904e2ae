//! Candidate probing.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use modproxy::{CandidateKind, ProbeOutcome, Prober, default_binder};
use modproxy_core::ProxyResult;
use modproxy_core::config::ProxyConfig;

use crate::output::{self, OutputFormat};

/// Arguments for the probe command
#[derive(Debug, Args)]
pub struct ProbeArgs {
    /// Files to classify
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

/// One probed candidate.
#[derive(Debug, Serialize, Tabled)]
pub struct ProbeRow {
    #[tabled(rename = "Path")]
    pub path: String,
    #[tabled(rename = "Kind")]
    pub kind: CandidateKind,
    #[tabled(rename = "Outcome")]
    pub outcome: ProbeOutcome,
}

/// Probes every path with the proxy's own rules.
pub fn probe_paths(paths: &[PathBuf], config: &ProxyConfig) -> Vec<ProbeRow> {
    let binder = default_binder();
    let prober = Prober::new(&config.loader, &*binder);
    paths
        .iter()
        .map(|path| ProbeRow {
            path: path.display().to_string(),
            kind: prober.classify(path),
            outcome: prober.probe(path),
        })
        .collect()
}

/// Execute the probe command
pub fn execute(args: &ProbeArgs, config: &ProxyConfig, format: OutputFormat) -> ProxyResult<()> {
    let rows = probe_paths(&args.paths, config);
    output::print_list(&rows, format);
    Ok(())
}
