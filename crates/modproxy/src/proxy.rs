//! The proxy: what the host talks to.

use std::fmt;
use std::path::Path;
use std::rc::Rc;

use tracing::{debug, info, warn};

use modproxy_core::ProxyResult;
use modproxy_core::config::ProxyConfig;
use modproxy_core::types::{DialogHandle, ExtensionHandle, PanelHandle};

use crate::context::ProxyContext;
use crate::descriptor::Descriptor;
use crate::events::definitions::HostEvent;
use crate::events::dispatcher::{DispatchOutcome, EventDispatcher};
use crate::host::Host;
use crate::lifecycle::{LifecycleRecord, LoadData, OfferedCallbacks, SubExtensionInfo};
use crate::loader::ModuleBinder;
use crate::probe::{ProbeOutcome, Prober};
use crate::wrappers::document::Document;
use crate::wrappers::workspace::Workspace;

/// Hosts every sub-extension behind one host extension.
///
/// All methods take `&self`: sub-extension code running under one call may
/// re-enter the proxy through the host.
pub struct Proxy {
    config: ProxyConfig,
    host: Rc<dyn Host>,
    binder: Box<dyn ModuleBinder>,
    context: ProxyContext,
}

impl Proxy {
    /// Creates a proxy with an explicit module binder.
    ///
    /// A workspace the host already has open is wrapped right away.
    pub fn new(config: ProxyConfig, host: Box<dyn Host>, binder: Box<dyn ModuleBinder>) -> Self {
        info!(
            descriptor_extension = %config.loader.descriptor_extension,
            module_extension = %config.loader.module_extension,
            "Proxy created"
        );
        let context = ProxyContext::new();
        if let Some((handle, workspace_config)) = host.current_workspace() {
            debug!(workspace = %handle, "Wrapping workspace already open");
            context.set_workspace(Some(Rc::new(Workspace::new(handle, workspace_config))));
        }
        Self {
            config,
            host: Rc::from(host),
            binder,
            context,
        }
    }

    /// Creates a proxy binding modules with the default binder.
    pub fn with_default_binder(config: ProxyConfig, host: Box<dyn Host>) -> Self {
        Self::new(config, host, crate::loader::default_binder())
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    pub fn context(&self) -> &ProxyContext {
        &self.context
    }

    pub fn host(&self) -> &dyn Host {
        &*self.host
    }

    /// A prober using this proxy's configuration and binder.
    pub fn prober(&self) -> Prober<'_> {
        Prober::new(&self.config.loader, &*self.binder)
    }

    /// Classifies a candidate file offered by the host.
    pub fn probe(&self, path: &Path) -> ProbeOutcome {
        self.prober().probe(path)
    }

    /// Reads the descriptor at `path` and prepares a record for `handle`.
    ///
    /// `None` if the descriptor is unusable. Nothing is bound yet.
    pub fn load(&self, handle: ExtensionHandle, path: &Path) -> Option<Box<LoadData>> {
        let descriptor = match Descriptor::from_file(path, &self.config.loader) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                warn!(path = %path.display(), handle = %handle, error = %e, "Failed to load descriptor");
                return None;
            }
        };

        let module_path = descriptor.module_path(&self.config.loader);
        let data = LoadData {
            info: SubExtensionInfo::from(&descriptor),
            callbacks: OfferedCallbacks::from(&descriptor),
            record: LifecycleRecord::new(handle, descriptor, module_path),
        };

        info!(
            handle = %handle,
            name = %data.info.name,
            path = %path.display(),
            "Sub-extension loaded"
        );
        Some(Box::new(data))
    }

    /// Binds the module and constructs the instance.
    pub fn init(&self, record: &mut LifecycleRecord) -> ProxyResult<bool> {
        record.init(
            &self.context,
            &*self.binder,
            &self.config.loader.factory_symbol,
            &self.host,
        )
    }

    /// Destroys the instance and releases the module.
    pub fn cleanup(&self, record: &mut LifecycleRecord) -> ProxyResult<()> {
        record.cleanup(&self.context)
    }

    /// Drops a loaded record, cleaning it up first if the host did not.
    pub fn unload(&self, mut data: Box<LoadData>) -> ProxyResult<()> {
        let handle = data.record.handle();
        if data.record.is_initialized() {
            debug!(handle = %handle, "Unloading an initialized sub-extension");
        }
        data.record.cleanup(&self.context)?;
        self.context.extensions().remove(handle);
        info!(handle = %handle, name = %data.info.name, "Sub-extension unloaded");
        Ok(())
    }

    /// Shows help for a sub-extension.
    ///
    /// The instance gets the first chance; if it does not handle the
    /// request, the descriptor's help resource is opened. Returns whether
    /// help is offered at all.
    pub fn help(&self, record: &LifecycleRecord) -> bool {
        let descriptor = record.descriptor();
        if !descriptor.provides_help() {
            return false;
        }

        let handled = record.with_extension(|ext| ext.show_help()).unwrap_or(false);
        if !handled {
            self.host.open_uri(&descriptor.help_uri);
        }
        true
    }

    /// Builds a sub-extension's configuration panel.
    pub fn configure(&self, record: &LifecycleRecord, dialog: DialogHandle) -> Option<PanelHandle> {
        if !record.descriptor().configurable {
            return None;
        }
        record.with_extension(|ext| ext.configure(dialog)).flatten()
    }

    /// The wrapper of the document the host currently shows.
    pub fn current_document(&self) -> Option<Rc<Document>> {
        self.context.documents().current(self.host.current_document())
    }

    /// Dispatches one host notification.
    pub fn dispatch(&self, event: &HostEvent) -> DispatchOutcome {
        EventDispatcher::new(&self.context, &*self.host).dispatch(event)
    }

    /// Runs deferred tasks. Called once per host event-loop turn.
    pub fn run_pending(&self) -> usize {
        self.context.tasks().drain()
    }

    /// Rebuilds the category cache from the host.
    pub fn reload_categories(&self) {
        self.context.categories().reload(self.host.categories());
    }
}

impl fmt::Debug for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("config", &self.config)
            .field("context", &self.context)
            .finish()
    }
}
