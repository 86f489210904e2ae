//! Identity caches mapping host handles to wrappers.
//!
//! A cache hands out at most one wrapper per handle for as long as the
//! handle stays registered, so observers connected through one reference
//! are seen through every other. Wrappers are created lazily on first
//! reference and evicted only when the host says the handle is gone.

pub mod category;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use modproxy_core::{ProxyError, ProxyResult};

pub use category::CategoryCache;

/// Wrappers that can be built from nothing but their handle.
pub trait FromHandle<H> {
    /// Builds the wrapper for `handle`.
    fn from_handle(handle: H) -> Self;
}

/// Handle to wrapper map that remembers insertion order.
pub struct IdentityCache<H, W> {
    entries: RefCell<HashMap<H, Rc<W>>>,
    order: RefCell<Vec<H>>,
}

impl<H, W> IdentityCache<H, W>
where
    H: Copy + Eq + Hash + fmt::Display,
{
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
            order: RefCell::new(Vec::new()),
        }
    }

    /// Returns the wrapper for `handle`, building it with `make` if absent.
    pub fn add_with(&self, handle: H, make: impl FnOnce(H) -> W) -> Rc<W> {
        if let Some(existing) = self.lookup(handle) {
            return existing;
        }

        // `make` may re-enter the cache; whoever registered first wins.
        let wrapper = Rc::new(make(handle));

        let mut entries = self.entries.borrow_mut();
        if let Some(existing) = entries.get(&handle) {
            return Rc::clone(existing);
        }
        entries.insert(handle, Rc::clone(&wrapper));
        self.order.borrow_mut().push(handle);
        wrapper
    }

    /// Registers a prebuilt wrapper. A handle that is already registered is
    /// an invariant violation.
    pub fn insert(&self, handle: H, wrapper: W) -> ProxyResult<Rc<W>> {
        let mut entries = self.entries.borrow_mut();
        if entries.contains_key(&handle) {
            return Err(ProxyError::invariant(format!(
                "Handle {handle} is already registered"
            )));
        }
        let wrapper = Rc::new(wrapper);
        entries.insert(handle, Rc::clone(&wrapper));
        self.order.borrow_mut().push(handle);
        Ok(wrapper)
    }

    /// Returns the wrapper for `handle`, if registered.
    pub fn lookup(&self, handle: H) -> Option<Rc<W>> {
        self.entries.borrow().get(&handle).cloned()
    }

    /// Unregisters `handle`. Returns whether it was registered.
    pub fn remove(&self, handle: H) -> bool {
        self.take(handle).is_some()
    }

    /// Unregisters `handle` and returns its wrapper.
    pub fn take(&self, handle: H) -> Option<Rc<W>> {
        let removed = self.entries.borrow_mut().remove(&handle);
        if removed.is_some() {
            self.order.borrow_mut().retain(|h| *h != handle);
        }
        removed
    }

    /// Snapshot of all wrappers in insertion order.
    pub fn list(&self) -> Vec<Rc<W>> {
        let entries = self.entries.borrow();
        self.order
            .borrow()
            .iter()
            .filter_map(|handle| entries.get(handle).cloned())
            .collect()
    }

    /// Snapshot of all handles in insertion order.
    pub fn handles(&self) -> Vec<H> {
        self.order.borrow().clone()
    }

    /// Whether `handle` is registered.
    pub fn contains(&self, handle: H) -> bool {
        self.entries.borrow().contains_key(&handle)
    }

    /// Number of registered wrappers.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Unregisters everything. Returns the evicted wrappers in insertion
    /// order.
    pub fn clear(&self) -> Vec<Rc<W>> {
        let evicted = self.list();
        self.entries.borrow_mut().clear();
        self.order.borrow_mut().clear();
        evicted
    }
}

impl<H, W> IdentityCache<H, W>
where
    H: Copy + Eq + Hash + fmt::Display,
    W: FromHandle<H>,
{
    /// Returns the wrapper for `handle`, creating it if absent.
    pub fn add(&self, handle: H) -> Rc<W> {
        self.add_with(handle, W::from_handle)
    }
}

impl<H, W> Default for IdentityCache<H, W>
where
    H: Copy + Eq + Hash + fmt::Display,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<H: fmt::Debug, W> fmt::Debug for IdentityCache<H, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityCache")
            .field("handles", &*self.order.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modproxy_core::types::DocumentHandle;

    #[derive(Debug)]
    struct Probe(DocumentHandle);

    impl FromHandle<DocumentHandle> for Probe {
        fn from_handle(handle: DocumentHandle) -> Self {
            Self(handle)
        }
    }

    #[test]
    fn test_add_is_idempotent() {
        let cache = IdentityCache::<DocumentHandle, Probe>::new();
        let first = cache.add(DocumentHandle(1));
        let second = cache.add(DocumentHandle(1));
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_lookup_never_creates() {
        let cache = IdentityCache::<DocumentHandle, Probe>::new();
        assert!(cache.lookup(DocumentHandle(1)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_remove_then_add_builds_fresh_wrapper() {
        let cache = IdentityCache::<DocumentHandle, Probe>::new();
        let old = cache.add(DocumentHandle(1));
        assert!(cache.remove(DocumentHandle(1)));
        assert!(!cache.remove(DocumentHandle(1)));
        assert!(cache.lookup(DocumentHandle(1)).is_none());

        let fresh = cache.add(DocumentHandle(1));
        assert!(!Rc::ptr_eq(&old, &fresh));
    }

    #[test]
    fn test_list_keeps_insertion_order() {
        let cache = IdentityCache::<DocumentHandle, Probe>::new();
        for raw in [3, 1, 2] {
            cache.add(DocumentHandle(raw));
        }
        cache.remove(DocumentHandle(1));
        cache.add(DocumentHandle(1));

        let handles: Vec<u64> = cache.list().iter().map(|p| p.0.0).collect();
        assert_eq!(handles, vec![3, 2, 1]);
    }

    #[test]
    fn test_list_is_a_snapshot() {
        let cache = IdentityCache::<DocumentHandle, Probe>::new();
        cache.add(DocumentHandle(1));
        let snapshot = cache.list();
        cache.add(DocumentHandle(2));
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn test_insert_rejects_duplicates() {
        let cache = IdentityCache::<DocumentHandle, Probe>::new();
        cache.insert(DocumentHandle(1), Probe(DocumentHandle(1))).expect("insert");
        let err = cache
            .insert(DocumentHandle(1), Probe(DocumentHandle(1)))
            .expect_err("duplicate");
        assert_eq!(err.kind, modproxy_core::error::ErrorKind::Invariant);
    }

    #[test]
    fn test_reentrant_construction_keeps_first_wrapper() {
        let cache = Rc::new(IdentityCache::<DocumentHandle, Probe>::new());
        let inner = Rc::clone(&cache);
        let outer = cache.add_with(DocumentHandle(1), move |h| {
            inner.add(h);
            Probe(h)
        });
        let registered = cache.lookup(DocumentHandle(1)).expect("registered");
        assert!(Rc::ptr_eq(&outer, &registered));
        assert_eq!(cache.len(), 1);
    }
}
