//! The category cache.
//!
//! Unlike documents, categories are not created on demand: the cache mirrors
//! the host's category table and is rebuilt wholesale when the host reloads
//! it.

use std::rc::Rc;

use tracing::debug;

use modproxy_core::types::CategoryHandle;

use super::IdentityCache;
use crate::wrappers::category::{Category, CategoryInfo};

/// Cache of the host's categories.
#[derive(Debug, Default)]
pub struct CategoryCache {
    cache: IdentityCache<CategoryHandle, Category>,
}

impl CategoryCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards every wrapper and rebuilds from `snapshot`.
    ///
    /// Wrappers handed out before the reload are marked stale.
    pub fn reload(&self, snapshot: Vec<CategoryInfo>) {
        for stale in self.cache.clear() {
            stale.mark_stale();
        }
        for info in snapshot {
            self.cache.add_with(info.handle, move |_| Category::new(info));
        }
        debug!(categories = self.cache.len(), "Category cache rebuilt");
    }

    /// Returns the wrapper for `handle`, if the host knows it.
    pub fn lookup(&self, handle: CategoryHandle) -> Option<Rc<Category>> {
        self.cache.lookup(handle)
    }

    /// Returns the first category with the given name.
    pub fn find_by_name(&self, name: &str) -> Option<Rc<Category>> {
        self.cache.list().into_iter().find(|c| c.name() == name)
    }

    /// Snapshot of all categories in host order.
    pub fn list(&self) -> Vec<Rc<Category>> {
        self.cache.list()
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
