//! Binding through the platform dynamic loader.

use std::path::Path;

use modproxy_core::error::ErrorKind;
use modproxy_core::{ProxyError, ProxyResult};

use super::{Binding, ModuleBinder};
use crate::extension::CreateExtensionFn;

/// Binds shared libraries (.so / .dll / .dylib) with `libloading`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DynamicBinder;

impl DynamicBinder {
    /// Creates a dynamic binder.
    pub fn new() -> Self {
        Self
    }
}

impl ModuleBinder for DynamicBinder {
    fn bind(&self, path: &Path, symbol: &str) -> ProxyResult<Binding> {
        // SAFETY: loading runs the library's initializers. Only modules the
        // host pointed us at are loaded.
        let library = unsafe { libloading::Library::new(path) }.map_err(|e| {
            ProxyError::with_source(
                ErrorKind::Module,
                format!("Failed to load module '{}'", path.display()),
                e,
            )
        })?;

        // SAFETY: the symbol is declared with the factory signature by
        // `declare_extension!`.
        let factory = unsafe { library.get::<CreateExtensionFn>(symbol.as_bytes()) }
            .map(|create| *create)
            .map_err(|e| {
                ProxyError::with_source(
                    ErrorKind::Module,
                    format!("Module '{}' missing '{}' symbol", path.display(), symbol),
                    e,
                )
            })?;

        Ok(Binding::library(factory, library))
    }
}
