//! Code module binding.
//!
//! A [`Module`] binds one code file and resolves its factory symbol through
//! a [`ModuleBinder`]. The binding is released when the module is dropped,
//! so a module must outlive every instance its factory produced.

#[cfg(feature = "dynamic")]
mod dynamic;
mod static_table;

use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, warn};

use modproxy_core::ProxyResult;

use crate::extension::{CreateExtensionFn, ExtensionBox, ExtensionContext};

#[cfg(feature = "dynamic")]
pub use dynamic::DynamicBinder;
pub use static_table::StaticBinder;

/// Binds code modules and resolves their factory symbol.
pub trait ModuleBinder {
    /// Binds the module at `path` and resolves `symbol`.
    ///
    /// The returned binding keeps the module resident until dropped.
    fn bind(&self, path: &Path, symbol: &str) -> ProxyResult<Binding>;
}

/// Returns the binder used when the host does not supply one.
pub fn default_binder() -> Box<dyn ModuleBinder> {
    #[cfg(feature = "dynamic")]
    {
        Box::new(DynamicBinder::new())
    }
    #[cfg(not(feature = "dynamic"))]
    {
        Box::new(StaticBinder::new())
    }
}

pub(crate) type NativeFactory = Rc<dyn Fn(&ExtensionContext) -> Option<ExtensionBox>>;

enum Factory {
    Exported(CreateExtensionFn),
    Native(NativeFactory),
}

// Held only to keep the module resident.
#[allow(dead_code)]
enum Anchor {
    #[cfg(feature = "dynamic")]
    Library(libloading::Library),
    Static(Rc<()>),
}

/// A bound module with its resolved factory.
pub struct Binding {
    // Dropped before the anchor.
    factory: Factory,
    _anchor: Anchor,
}

impl Binding {
    #[cfg(feature = "dynamic")]
    pub(crate) fn library(factory: CreateExtensionFn, library: libloading::Library) -> Self {
        Self {
            factory: Factory::Exported(factory),
            _anchor: Anchor::Library(library),
        }
    }

    pub(crate) fn exported(factory: CreateExtensionFn, token: Rc<()>) -> Self {
        Self {
            factory: Factory::Exported(factory),
            _anchor: Anchor::Static(token),
        }
    }

    pub(crate) fn native(factory: NativeFactory, token: Rc<()>) -> Self {
        Self {
            factory: Factory::Native(factory),
            _anchor: Anchor::Static(token),
        }
    }

    /// Runs the factory. `None` if it declined to produce an instance.
    pub fn create(&self, context: &ExtensionContext) -> Option<ExtensionBox> {
        match &self.factory {
            Factory::Exported(create) => {
                // SAFETY: the binding keeps the module resident and the
                // factory receives a pointer valid for the call.
                let raw = unsafe { create(context as *const ExtensionContext) };
                if raw.is_null() {
                    return None;
                }
                // SAFETY: a non-null result was produced by `Box::into_raw`
                // in `export_extension`.
                Some(*unsafe { Box::from_raw(raw) })
            }
            Factory::Native(create) => create(context),
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match (&self.factory, &self._anchor) {
            #[cfg(feature = "dynamic")]
            (_, Anchor::Library(_)) => "dynamic",
            (Factory::Exported(_), _) => "static-export",
            (Factory::Native(_), _) => "static-native",
        };
        f.debug_struct("Binding").field("kind", &kind).finish()
    }
}

/// A sub-extension's code module.
#[derive(Debug)]
pub struct Module {
    path: PathBuf,
    binding: Option<Binding>,
}

impl Module {
    /// Binds the module at `path` and resolves `symbol`.
    ///
    /// Never fails; check [`Module::loaded`].
    pub fn load(path: &Path, binder: &dyn ModuleBinder, symbol: &str) -> Self {
        let binding = match binder.bind(path, symbol) {
            Ok(binding) => {
                debug!(path = %path.display(), symbol = %symbol, "Module bound");
                Some(binding)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to bind module");
                None
            }
        };

        Self {
            path: path.to_path_buf(),
            binding,
        }
    }

    /// Whether the module is bound and its factory resolved.
    pub fn loaded(&self) -> bool {
        self.binding.is_some()
    }

    /// Path of the module file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs the factory. `None` if the module is not loaded or the factory
    /// produced nothing.
    pub fn create_instance(&self, context: &ExtensionContext) -> Option<ExtensionBox> {
        self.binding.as_ref()?.create(context)
    }
}
