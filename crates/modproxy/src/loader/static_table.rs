//! Binding against factories compiled into the host.
//!
//! Statically linked sub-extensions still ship the two-file layout: the
//! module file must exist next to its descriptor, but its factory comes from
//! this table, keyed by the module's file stem.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::rc::Rc;

use modproxy_core::{ProxyError, ProxyResult};

use super::{Binding, ModuleBinder, NativeFactory};
use crate::extension::{CreateExtensionFn, ExtensionBox, ExtensionContext, FACTORY_SYMBOL};

#[derive(Clone)]
enum Entry {
    Exported(CreateExtensionFn),
    Native(NativeFactory),
}

#[derive(Default)]
struct Table {
    entries: RefCell<HashMap<String, Entry>>,
    live: Rc<()>,
}

/// Factory table keyed by module stem.
///
/// Clones share one table, so a clone kept by the caller observes bindings
/// made through the clone handed to the proxy.
#[derive(Clone, Default)]
pub struct StaticBinder {
    table: Rc<Table>,
}

impl StaticBinder {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a closure factory for modules named `stem`.
    pub fn register(
        &self,
        stem: impl Into<String>,
        factory: impl Fn(&ExtensionContext) -> Option<ExtensionBox> + 'static,
    ) {
        self.table
            .entries
            .borrow_mut()
            .insert(stem.into(), Entry::Native(Rc::new(factory)));
    }

    /// Registers an exported factory, as produced by `declare_extension!`.
    pub fn register_export(&self, stem: impl Into<String>, factory: CreateExtensionFn) {
        self.table
            .entries
            .borrow_mut()
            .insert(stem.into(), Entry::Exported(factory));
    }

    /// Number of bindings currently alive.
    pub fn live_bindings(&self) -> usize {
        Rc::strong_count(&self.table.live) - 1
    }

    /// Whether a factory is registered for `stem`.
    pub fn contains(&self, stem: &str) -> bool {
        self.table.entries.borrow().contains_key(stem)
    }
}

impl ModuleBinder for StaticBinder {
    fn bind(&self, path: &Path, symbol: &str) -> ProxyResult<Binding> {
        if !path.is_file() {
            return Err(ProxyError::module(format!(
                "Module '{}' does not exist",
                path.display()
            )));
        }
        if symbol != FACTORY_SYMBOL {
            return Err(ProxyError::module(format!(
                "Module '{}' missing '{}' symbol",
                path.display(),
                symbol
            )));
        }

        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        let entry = self.table.entries.borrow().get(stem).cloned();
        let token = Rc::clone(&self.table.live);

        match entry {
            Some(Entry::Exported(factory)) => Ok(Binding::exported(factory, token)),
            Some(Entry::Native(factory)) => Ok(Binding::native(factory, token)),
            None => Err(ProxyError::module(format!(
                "Module '{}' missing '{}' symbol",
                path.display(),
                symbol
            ))),
        }
    }
}

impl fmt::Debug for StaticBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stems: Vec<String> = self.table.entries.borrow().keys().cloned().collect();
        stems.sort();
        f.debug_struct("StaticBinder")
            .field("stems", &stems)
            .field("live_bindings", &self.live_bindings())
            .finish()
    }
}
