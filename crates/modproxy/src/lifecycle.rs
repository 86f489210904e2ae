//! Per-sub-extension lifecycle.
//!
//! A record moves through `Probed -> Loaded -> Initialized -> CleanedUp`.
//! Only an initialized record is registered in the loaded-extensions cache.
//! Teardown destroys the instance before releasing the module that holds
//! its code.

use std::cell::RefCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::Serialize;
use tracing::{info, warn};

use modproxy_core::types::ExtensionHandle;
use modproxy_core::{ProxyError, ProxyResult};

use crate::context::ProxyContext;
use crate::descriptor::Descriptor;
use crate::extension::{ExtensionBox, ExtensionContext};
use crate::host::Host;
use crate::later::Scheduler;
use crate::loader::{Module, ModuleBinder};
use crate::wrappers::loaded::{Delivery, LoadedExtension};

/// Where a record is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Descriptor parsed; nothing bound.
    Probed,
    /// Module bound; no instance yet.
    Loaded,
    /// Instance constructed and registered.
    Initialized,
    /// Instance destroyed and module released.
    CleanedUp,
}

/// What the host shows about a sub-extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubExtensionInfo {
    pub name: String,
    pub description: String,
    pub version: String,
    pub author: String,
}

impl From<&Descriptor> for SubExtensionInfo {
    fn from(descriptor: &Descriptor) -> Self {
        Self {
            name: descriptor.name.clone(),
            description: descriptor.description.clone(),
            version: descriptor.version.clone(),
            author: descriptor.author.clone(),
        }
    }
}

/// Optional callbacks the proxy offers the host for one sub-extension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OfferedCallbacks {
    /// Help is offered when the descriptor names a help resource.
    pub help: bool,
    /// Configure is offered when the descriptor sets `configurable`.
    pub configure: bool,
}

impl From<&Descriptor> for OfferedCallbacks {
    fn from(descriptor: &Descriptor) -> Self {
        Self {
            help: descriptor.provides_help(),
            configure: descriptor.configurable,
        }
    }
}

/// Everything the proxy hands back to the host on load.
#[derive(Debug)]
pub struct LoadData {
    pub info: SubExtensionInfo,
    pub callbacks: OfferedCallbacks,
    pub record: LifecycleRecord,
}

/// One sub-extension's descriptor, module, and instance.
pub struct LifecycleRecord {
    handle: ExtensionHandle,
    descriptor: Descriptor,
    module_path: PathBuf,
    // Declared before `module`: the instance must go first.
    extension: Option<Rc<RefCell<ExtensionBox>>>,
    module: Option<Module>,
    state: LifecycleState,
}

impl LifecycleRecord {
    /// Creates a record for a probed descriptor.
    pub fn new(handle: ExtensionHandle, descriptor: Descriptor, module_path: PathBuf) -> Self {
        Self {
            handle,
            descriptor,
            module_path,
            extension: None,
            module: None,
            state: LifecycleState::Probed,
        }
    }

    pub fn handle(&self) -> ExtensionHandle {
        self.handle
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn module_path(&self) -> &Path {
        &self.module_path
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Whether the module is bound and the instance exists.
    pub fn is_initialized(&self) -> bool {
        self.module.as_ref().is_some_and(Module::loaded) && self.extension.is_some()
    }

    /// Binds the module, constructs the instance, and registers it.
    ///
    /// Returns `Ok(false)` if the module did not bind or the factory
    /// produced nothing; the record is then left as it was and nothing is
    /// registered. Registering a handle that is already registered is an
    /// invariant violation.
    pub fn init(
        &mut self,
        context: &ProxyContext,
        binder: &dyn ModuleBinder,
        symbol: &str,
        host: &Rc<dyn Host>,
    ) -> ProxyResult<bool> {
        if self.is_initialized() {
            warn!(handle = %self.handle, name = %self.descriptor.name, "Sub-extension already initialized");
            return Ok(true);
        }
        if context.extensions().contains(self.handle) {
            return Err(ProxyError::invariant(format!(
                "Handle {} is already registered by another sub-extension",
                self.handle
            )));
        }

        let module = Module::load(&self.module_path, binder, symbol);
        if !module.loaded() {
            warn!(
                handle = %self.handle,
                path = %self.module_path.display(),
                "Module did not load"
            );
            return Ok(false);
        }
        self.state = LifecycleState::Loaded;

        let extension_context = ExtensionContext::new(
            self.handle,
            self.descriptor.clone(),
            self.module_path.clone(),
            &host.config_dir(),
            Scheduler::new(Rc::clone(context.tasks()), self.handle),
        )
        .with_active_document(context.active_document(Rc::clone(host)));

        let Some(instance) = module.create_instance(&extension_context) else {
            warn!(
                handle = %self.handle,
                name = %self.descriptor.name,
                "Factory produced no instance"
            );
            drop(module);
            self.state = LifecycleState::Probed;
            return Ok(false);
        };

        let instance = Rc::new(RefCell::new(instance));
        context.extensions().insert(
            self.handle,
            LoadedExtension::new(self.handle, self.descriptor.name.clone(), &instance),
        )?;

        self.extension = Some(instance);
        self.module = Some(module);
        self.state = LifecycleState::Initialized;

        info!(
            handle = %self.handle,
            name = %self.descriptor.name,
            path = %self.module_path.display(),
            "Sub-extension initialized"
        );
        Ok(true)
    }

    /// Destroys the instance, then releases the module. Idempotent.
    ///
    /// Fails if the instance is still held elsewhere, which means a
    /// dispatch into it is still on the stack.
    pub fn cleanup(&mut self, context: &ProxyContext) -> ProxyResult<()> {
        let Some(instance) = self.extension.take() else {
            self.module = None;
            return Ok(());
        };

        context.extensions().remove(self.handle);
        context.release_owner(self.handle);

        let instance = Rc::try_unwrap(instance).map_err(|_| {
            ProxyError::invariant(format!(
                "Sub-extension {} torn down while still in use",
                self.handle
            ))
        })?;
        drop(instance);
        self.module = None;
        self.state = LifecycleState::CleanedUp;

        info!(handle = %self.handle, name = %self.descriptor.name, "Sub-extension cleaned up");
        Ok(())
    }

    /// Runs `f` against the instance. `None` if there is no instance or it
    /// is busy further up the stack.
    pub fn with_extension<R>(&self, f: impl FnOnce(&mut ExtensionBox) -> R) -> Option<R> {
        let instance = self.extension.as_ref()?;
        let loaded = LoadedExtension::new(self.handle, self.descriptor.name.as_str(), instance);
        match loaded.deliver(f) {
            Delivery::Delivered(value) => Some(value),
            Delivery::Busy => {
                warn!(handle = %self.handle, "Sub-extension busy, request dropped");
                None
            }
            Delivery::Gone => None,
        }
    }
}

impl fmt::Debug for LifecycleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleRecord")
            .field("handle", &self.handle)
            .field("name", &self.descriptor.name)
            .field("module_path", &self.module_path)
            .field("state", &self.state)
            .finish()
    }
}
