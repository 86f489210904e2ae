//! Candidate probing.
//!
//! The host offers every file in its extension directories. A descriptor
//! matches when it parses and its same-stem module binds; the module file
//! of a matching pair is reported as related so the host does not offer it
//! to other loaders. Probing binds and immediately unbinds; it never runs a
//! factory and leaves no state behind.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use modproxy_core::config::LoaderConfig;

use crate::descriptor::Descriptor;
use crate::loader::ModuleBinder;

/// What the proxy tells the host about a candidate file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// A loadable descriptor.
    Matched,
    /// The module half of a loadable pair; not loadable on its own.
    Related,
    /// Not ours.
    Ignored,
}

/// Kind of candidate, judged by file extension alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind {
    Descriptor,
    Module,
    Other,
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Matched => "matched",
            Self::Related => "related",
            Self::Ignored => "ignored",
        })
    }
}

impl fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Descriptor => "descriptor",
            Self::Module => "module",
            Self::Other => "other",
        })
    }
}

/// Probes candidate files.
pub struct Prober<'a> {
    config: &'a LoaderConfig,
    binder: &'a dyn ModuleBinder,
}

impl<'a> Prober<'a> {
    pub fn new(config: &'a LoaderConfig, binder: &'a dyn ModuleBinder) -> Self {
        Self { config, binder }
    }

    /// Classifies `path` by its extension.
    pub fn classify(&self, path: &Path) -> CandidateKind {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext == self.config.descriptor_extension => CandidateKind::Descriptor,
            Some(ext) if ext == self.config.module_extension => CandidateKind::Module,
            _ => CandidateKind::Other,
        }
    }

    /// Probes `path` and its counterpart.
    pub fn probe(&self, path: &Path) -> ProbeOutcome {
        let outcome = match self.classify(path) {
            CandidateKind::Descriptor if self.probe_descriptor(path, true) => ProbeOutcome::Matched,
            CandidateKind::Module if self.probe_module(path, true) => ProbeOutcome::Related,
            _ => ProbeOutcome::Ignored,
        };
        debug!(path = %path.display(), outcome = ?outcome, "Probed candidate");
        outcome
    }

    /// Whether `path` is a valid descriptor. With `verify_counterpart`, its
    /// module must also bind.
    pub fn probe_descriptor(&self, path: &Path, verify_counterpart: bool) -> bool {
        if let Err(e) = Descriptor::from_file(path, self.config) {
            debug!(path = %path.display(), error = %e, "Descriptor rejected");
            return false;
        }
        if !verify_counterpart {
            return true;
        }
        self.counterpart(path)
            .is_some_and(|module| self.probe_module(&module, false))
    }

    /// Whether `path` binds and exports the factory symbol. With
    /// `verify_counterpart`, its descriptor must also be valid.
    pub fn probe_module(&self, path: &Path, verify_counterpart: bool) -> bool {
        match self.binder.bind(path, &self.config.factory_symbol) {
            Ok(binding) => drop(binding),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Module rejected");
                return false;
            }
        }
        if !verify_counterpart {
            return true;
        }
        self.counterpart(path)
            .is_some_and(|descriptor| self.probe_descriptor(&descriptor, false))
    }

    /// The other half of the pair `path` belongs to.
    pub fn counterpart(&self, path: &Path) -> Option<PathBuf> {
        let other = match self.classify(path) {
            CandidateKind::Descriptor => &self.config.module_extension,
            CandidateKind::Module => &self.config.descriptor_extension,
            CandidateKind::Other => return None,
        };
        Some(path.with_extension(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::FACTORY_SYMBOL;
    use crate::loader::StaticBinder;

    fn config() -> LoaderConfig {
        LoaderConfig {
            module_extension: "so".to_string(),
            ..Default::default()
        }
    }

    fn touch(path: &Path, text: &str) {
        std::fs::write(path, text).expect("write");
    }

    #[test]
    fn test_classify_and_counterpart() {
        let config = config();
        let binder = StaticBinder::new();
        let prober = Prober::new(&config, &binder);

        assert_eq!(prober.classify(Path::new("/x/a.plugin")), CandidateKind::Descriptor);
        assert_eq!(prober.classify(Path::new("/x/a.so")), CandidateKind::Module);
        assert_eq!(prober.classify(Path::new("/x/a.txt")), CandidateKind::Other);
        assert_eq!(
            prober.counterpart(Path::new("/x/a.plugin")),
            Some(PathBuf::from("/x/a.so"))
        );
        assert_eq!(prober.counterpart(Path::new("/x/README")), None);
    }

    #[test]
    fn test_pair_matches_and_module_is_related() {
        let temp = tempfile::tempdir().expect("tempdir");
        let descriptor = temp.path().join("a.plugin");
        let module = temp.path().join("a.so");
        touch(&descriptor, "[modproxy]\nname=A\n");
        touch(&module, "");

        let config = config();
        let binder = StaticBinder::new();
        binder.register("a", |_| None);
        let prober = Prober::new(&config, &binder);

        assert_eq!(prober.probe(&descriptor), ProbeOutcome::Matched);
        assert_eq!(prober.probe(&module), ProbeOutcome::Related);
        assert_eq!(binder.live_bindings(), 0);
    }

    #[test]
    fn test_descriptor_without_module_is_ignored() {
        let temp = tempfile::tempdir().expect("tempdir");
        let descriptor = temp.path().join("lonely.plugin");
        touch(&descriptor, "[modproxy]\nname=Lonely\n");

        let config = config();
        let binder = StaticBinder::new();
        let prober = Prober::new(&config, &binder);

        assert!(prober.probe_descriptor(&descriptor, false));
        assert_eq!(prober.probe(&descriptor), ProbeOutcome::Ignored);
    }

    #[test]
    fn test_module_without_symbol_is_ignored() {
        let temp = tempfile::tempdir().expect("tempdir");
        let descriptor = temp.path().join("b.plugin");
        let module = temp.path().join("b.so");
        touch(&descriptor, "[modproxy]\nname=B\n");
        touch(&module, "");

        let config = config();
        let binder = StaticBinder::new();
        let prober = Prober::new(&config, &binder);

        assert!(!prober.probe_module(&module, false));
        assert_eq!(prober.probe(&descriptor), ProbeOutcome::Ignored);
        assert_eq!(prober.probe(&module), ProbeOutcome::Ignored);
    }

    #[test]
    fn test_probe_never_runs_factory() {
        let temp = tempfile::tempdir().expect("tempdir");
        let descriptor = temp.path().join("c.plugin");
        touch(&descriptor, "[modproxy]\nname=C\n");
        touch(&temp.path().join("c.so"), "");

        let config = config();
        let binder = StaticBinder::new();
        binder.register("c", |_| panic!("factory must not run during probe"));
        let prober = Prober::new(&config, &binder);

        assert_eq!(prober.probe(&descriptor), ProbeOutcome::Matched);
        assert_eq!(config.factory_symbol, FACTORY_SYMBOL);
    }
}
