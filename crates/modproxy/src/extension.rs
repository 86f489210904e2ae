//! The capability interface every sub-extension implements.

use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use modproxy_core::KeyFile;
use modproxy_core::types::{DialogHandle, ExtensionHandle, PanelHandle};

use crate::boundary;
use crate::descriptor::Descriptor;
use crate::host::ActiveDocument;
use crate::later::Scheduler;
use crate::wrappers::document::Document;
use crate::wrappers::workspace::Workspace;

/// Symbol every code module exports.
pub const FACTORY_SYMBOL: &str = "modproxy_create_extension";

/// Capabilities a sub-extension may provide. Every method defaults to
/// doing nothing.
///
/// Observers connected to wrapper signals should be tagged with
/// [`ExtensionContext::handle`] (see `Signal::connect_owned`) so they are
/// released before the module is unbound.
pub trait Extension {
    /// A document was created or opened.
    fn on_document_opened(&mut self, _document: &Rc<Document>) {}

    /// A workspace was opened.
    fn on_workspace_opened(&mut self, _workspace: &Rc<Workspace>, _config: &KeyFile) {}

    /// The open workspace is closing.
    fn on_workspace_closed(&mut self) {}

    /// Builds the configuration panel for `dialog`. `None` if there is no
    /// panel to show.
    fn configure(&mut self, _dialog: DialogHandle) -> Option<PanelHandle> {
        None
    }

    /// Shows help. Returns `false` to let the proxy open the descriptor's
    /// help resource instead.
    fn show_help(&mut self) -> bool {
        false
    }
}

/// An owned sub-extension instance.
pub type ExtensionBox = Box<dyn Extension>;

/// Signature of the exported factory symbol. A null result means the
/// factory failed.
pub type CreateExtensionFn =
    unsafe extern "C" fn(context: *const ExtensionContext) -> *mut ExtensionBox;

/// A Rust factory wrapped by [`export_extension`].
pub type ExtensionFactory = fn(&ExtensionContext) -> Option<ExtensionBox>;

/// Everything a sub-extension instance learns about itself at construction.
pub struct ExtensionContext {
    handle: ExtensionHandle,
    descriptor: Descriptor,
    module_path: PathBuf,
    config_path: PathBuf,
    scheduler: Scheduler,
    active_document: Option<ActiveDocument>,
}

impl ExtensionContext {
    /// Creates a context. The config store lives at
    /// `config_dir/plugins/<stem>/config`.
    pub fn new(
        handle: ExtensionHandle,
        descriptor: Descriptor,
        module_path: PathBuf,
        config_dir: &Path,
        scheduler: Scheduler,
    ) -> Self {
        let config_path = config_store_path(config_dir, &descriptor.stem);
        Self {
            handle,
            descriptor,
            module_path,
            config_path,
            scheduler,
            active_document: None,
        }
    }

    /// Lets the instance look up the host's active document.
    pub fn with_active_document(mut self, active_document: ActiveDocument) -> Self {
        self.active_document = Some(active_document);
        self
    }

    /// The host-issued handle of this sub-extension.
    pub fn handle(&self) -> ExtensionHandle {
        self.handle
    }

    /// The parsed descriptor.
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// Path of the bound code module.
    pub fn module_path(&self) -> &Path {
        &self.module_path
    }

    /// Path of this sub-extension's configuration store.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Queue for work to run on a later event-loop turn.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// The wrapper of the document the host currently shows.
    pub fn current_document(&self) -> Option<Rc<Document>> {
        self.active_document.as_ref()?.get()
    }

    /// A resolver for the active document the instance may keep.
    pub fn active_document(&self) -> Option<&ActiveDocument> {
        self.active_document.as_ref()
    }
}

impl fmt::Debug for ExtensionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionContext")
            .field("handle", &self.handle)
            .field("name", &self.descriptor.name)
            .field("module_path", &self.module_path)
            .field("config_path", &self.config_path)
            .finish()
    }
}

/// Derives the configuration store path of the sub-extension named `stem`.
pub fn config_store_path(config_dir: &Path, stem: &str) -> PathBuf {
    config_dir.join("plugins").join(stem).join("config")
}

/// Body of an exported factory symbol.
///
/// Runs `factory` inside the boundary so a panic in sub-extension code
/// aborts instead of unwinding into the loader.
pub fn export_extension(
    context: *const ExtensionContext,
    factory: ExtensionFactory,
) -> *mut ExtensionBox {
    boundary::guard(FACTORY_SYMBOL, || {
        // SAFETY: the loader passes a pointer valid for the duration of
        // the call, or null.
        let Some(context) = (unsafe { context.as_ref() }) else {
            return Ok(std::ptr::null_mut());
        };
        Ok(factory(context)
            .map(|instance| Box::into_raw(Box::new(instance)))
            .unwrap_or(std::ptr::null_mut()))
    })
}
