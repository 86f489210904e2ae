//! Editor wrapper: one observer signal per editor notification kind.

use std::fmt;

use modproxy_core::types::{DocumentHandle, ExtensionHandle};

use crate::events::definitions::{EditorNotification, EditorNotificationKind};
use crate::signal::HandledSignal;

/// The editor owned by a document.
pub struct Editor {
    document: DocumentHandle,
    signals: Vec<HandledSignal<EditorNotification>>,
}

impl Editor {
    pub(crate) fn new(document: DocumentHandle) -> Self {
        Self {
            document,
            signals: (0..EditorNotificationKind::COUNT)
                .map(|_| HandledSignal::new())
                .collect(),
        }
    }

    /// The document owning this editor.
    pub fn document(&self) -> DocumentHandle {
        self.document
    }

    /// The signal raised for notifications of `kind`.
    pub fn signal(&self, kind: EditorNotificationKind) -> &HandledSignal<EditorNotification> {
        &self.signals[kind.index()]
    }

    /// Routes a notification to its signal.
    ///
    /// `None` if the code is not recognized; otherwise whether any observer
    /// handled it.
    pub fn emit(&self, notification: &EditorNotification) -> Option<bool> {
        let kind = notification.kind()?;
        Some(self.signal(kind).emit(notification))
    }

    pub(crate) fn disconnect_owner(&self, owner: ExtensionHandle) -> usize {
        self.signals
            .iter()
            .map(|signal| signal.disconnect_owner(owner))
            .sum()
    }
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers: usize = self.signals.iter().map(|s| s.handler_count()).sum();
        f.debug_struct("Editor")
            .field("document", &self.document)
            .field("handlers", &handlers)
            .finish()
    }
}
