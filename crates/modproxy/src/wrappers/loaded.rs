//! Registry entry for an initialized sub-extension.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use modproxy_core::types::ExtensionHandle;

use crate::extension::ExtensionBox;

/// Result of trying to reach a sub-extension instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery<R> {
    /// The callback ran.
    Delivered(R),
    /// The instance no longer exists.
    Gone,
    /// The instance is already running further up the stack.
    Busy,
}

/// A loaded sub-extension as seen by the dispatcher.
///
/// Does not own the instance; its lifecycle record does.
pub struct LoadedExtension {
    handle: ExtensionHandle,
    name: String,
    instance: Weak<RefCell<ExtensionBox>>,
}

impl LoadedExtension {
    pub(crate) fn new(
        handle: ExtensionHandle,
        name: impl Into<String>,
        instance: &Rc<RefCell<ExtensionBox>>,
    ) -> Self {
        Self {
            handle,
            name: name.into(),
            instance: Rc::downgrade(instance),
        }
    }

    pub fn handle(&self) -> ExtensionHandle {
        self.handle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the instance is still alive.
    pub fn is_alive(&self) -> bool {
        self.instance.strong_count() > 0
    }

    /// Runs `f` against the instance.
    pub fn deliver<R>(&self, f: impl FnOnce(&mut ExtensionBox) -> R) -> Delivery<R> {
        let Some(instance) = self.instance.upgrade() else {
            return Delivery::Gone;
        };
        let Ok(mut guard) = instance.try_borrow_mut() else {
            return Delivery::Busy;
        };
        Delivery::Delivered(f(&mut guard))
    }
}

impl fmt::Debug for LoadedExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedExtension")
            .field("handle", &self.handle)
            .field("name", &self.name)
            .field("alive", &self.is_alive())
            .finish()
    }
}
