//! Document wrapper.

use std::rc::Rc;

use modproxy_core::types::{DocumentHandle, ExtensionHandle};

use crate::cache::{FromHandle, IdentityCache};
use crate::signal::Signal;
use crate::wrappers::category::Category;
use crate::wrappers::editor::Editor;

/// Payload of the category-changed signal.
#[derive(Debug, Clone)]
pub struct CategoryChange {
    /// The document whose category changed.
    pub document: DocumentHandle,
    /// The category it had before, if the host knew one.
    pub previous: Option<Rc<Category>>,
}

/// Observer signals of one document.
#[derive(Debug, Default)]
pub struct DocumentSignals {
    pub activated: Signal<Document>,
    pub before_save: Signal<Document>,
    pub saved: Signal<Document>,
    pub reloaded: Signal<Document>,
    /// Raised while the document is still registered; it is evicted right
    /// after.
    pub closed: Signal<Document>,
    pub category_changed: Signal<CategoryChange>,
}

impl DocumentSignals {
    fn disconnect_owner(&self, owner: ExtensionHandle) -> usize {
        self.activated.disconnect_owner(owner)
            + self.before_save.disconnect_owner(owner)
            + self.saved.disconnect_owner(owner)
            + self.reloaded.disconnect_owner(owner)
            + self.closed.disconnect_owner(owner)
            + self.category_changed.disconnect_owner(owner)
    }
}

/// A host document.
#[derive(Debug)]
pub struct Document {
    handle: DocumentHandle,
    signals: DocumentSignals,
    editor: Editor,
}

impl Document {
    pub fn handle(&self) -> DocumentHandle {
        self.handle
    }

    pub fn signals(&self) -> &DocumentSignals {
        &self.signals
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    /// Drops every observer `owner` connected to this document or its
    /// editor.
    pub fn disconnect_owner(&self, owner: ExtensionHandle) -> usize {
        self.signals.disconnect_owner(owner) + self.editor.disconnect_owner(owner)
    }
}

impl FromHandle<DocumentHandle> for Document {
    fn from_handle(handle: DocumentHandle) -> Self {
        Self {
            handle,
            signals: DocumentSignals::default(),
            editor: Editor::new(handle),
        }
    }
}

impl IdentityCache<DocumentHandle, Document> {
    /// The wrapper of the host's active document, if it has one.
    pub fn current(&self, active: Option<DocumentHandle>) -> Option<Rc<Document>> {
        self.lookup(active?)
    }
}
