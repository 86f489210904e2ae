//! What the proxy needs from the host application.

use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use tracing::info;

use modproxy_core::KeyFile;
use modproxy_core::types::{DocumentHandle, WorkspaceHandle};

use crate::cache::IdentityCache;
use crate::wrappers::category::CategoryInfo;
use crate::wrappers::document::Document;

/// Services the host application provides to the proxy.
pub trait Host {
    /// The host's per-user configuration directory.
    fn config_dir(&self) -> PathBuf;

    /// The document the host currently shows, if any.
    fn current_document(&self) -> Option<DocumentHandle> {
        None
    }

    /// The workspace already open when the proxy is created, with its
    /// configuration.
    fn current_workspace(&self) -> Option<(WorkspaceHandle, KeyFile)> {
        None
    }

    /// The host's current category table.
    fn categories(&self) -> Vec<CategoryInfo> {
        Vec::new()
    }

    /// Opens a URI in the user's browser.
    fn open_uri(&self, uri: &str);
}

/// Resolves the host's active document to its wrapper.
///
/// Handed to sub-extensions through their
/// [`ExtensionContext`](crate::extension::ExtensionContext).
#[derive(Clone)]
pub struct ActiveDocument {
    host: Rc<dyn Host>,
    documents: Rc<IdentityCache<DocumentHandle, Document>>,
}

impl ActiveDocument {
    pub fn new(host: Rc<dyn Host>, documents: Rc<IdentityCache<DocumentHandle, Document>>) -> Self {
        Self { host, documents }
    }

    /// The wrapper of the document the host shows. `None` if there is no
    /// active document or it was never wrapped.
    pub fn get(&self) -> Option<Rc<Document>> {
        self.documents.current(self.host.current_document())
    }
}

impl fmt::Debug for ActiveDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveDocument")
            .field("documents", &self.documents.len())
            .finish()
    }
}

/// A host with no user interface, used by tooling that only probes and
/// inspects candidates.
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    config_dir: PathBuf,
}

impl HeadlessHost {
    /// Creates a headless host rooted at `config_dir`.
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }
}

impl Host for HeadlessHost {
    fn config_dir(&self) -> PathBuf {
        self.config_dir.clone()
    }

    fn open_uri(&self, uri: &str) {
        info!(uri = %uri, "Help requested without a user interface");
    }
}
