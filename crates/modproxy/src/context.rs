//! Shared proxy state.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use modproxy_core::types::{DocumentHandle, ExtensionHandle};

use crate::cache::{CategoryCache, IdentityCache};
use crate::host::{ActiveDocument, Host};
use crate::later::TaskQueue;
use crate::wrappers::document::Document;
use crate::wrappers::loaded::LoadedExtension;
use crate::wrappers::workspace::Workspace;

/// The caches, the open workspace, and the deferred task queue.
///
/// Owned by the [`Proxy`](crate::proxy::Proxy) and passed by reference into
/// lifecycle and dispatch calls.
#[derive(Debug, Default)]
pub struct ProxyContext {
    documents: Rc<IdentityCache<DocumentHandle, Document>>,
    categories: CategoryCache,
    extensions: IdentityCache<ExtensionHandle, LoadedExtension>,
    workspace: RefCell<Option<Rc<Workspace>>>,
    tasks: Rc<TaskQueue>,
}

impl ProxyContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Document wrappers.
    pub fn documents(&self) -> &IdentityCache<DocumentHandle, Document> {
        &self.documents
    }

    /// Resolver for `host`'s active document over this context's wrappers.
    pub fn active_document(&self, host: Rc<dyn Host>) -> ActiveDocument {
        ActiveDocument::new(host, Rc::clone(&self.documents))
    }

    /// Category wrappers.
    pub fn categories(&self) -> &CategoryCache {
        &self.categories
    }

    /// Initialized sub-extensions, in load order.
    pub fn extensions(&self) -> &IdentityCache<ExtensionHandle, LoadedExtension> {
        &self.extensions
    }

    /// The open workspace, if any.
    pub fn workspace(&self) -> Option<Rc<Workspace>> {
        self.workspace.borrow().clone()
    }

    /// Replaces the open workspace. Returns the previous one.
    pub fn set_workspace(&self, workspace: Option<Rc<Workspace>>) -> Option<Rc<Workspace>> {
        self.workspace.replace(workspace)
    }

    /// The deferred task queue.
    pub fn tasks(&self) -> &Rc<TaskQueue> {
        &self.tasks
    }

    /// Drops every observer and pending task owned by `owner`.
    pub fn release_owner(&self, owner: ExtensionHandle) {
        let mut released: usize = self
            .documents
            .list()
            .iter()
            .map(|doc| doc.disconnect_owner(owner))
            .sum();
        if let Some(workspace) = self.workspace() {
            released += workspace.disconnect_owner(owner);
        }
        let cancelled = self.tasks.cancel_owner(owner);

        debug!(
            handle = %owner,
            observers = released,
            tasks = cancelled,
            "Released sub-extension resources"
        );
    }
}
