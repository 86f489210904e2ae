//! Workspace wrapper.

use modproxy_core::KeyFile;
use modproxy_core::types::{DialogHandle, ExtensionHandle, WorkspaceHandle};

use crate::signal::Signal;

/// Observer signals of the open workspace.
#[derive(Debug, Default)]
pub struct WorkspaceSignals {
    pub closed: Signal<WorkspaceHandle>,
    pub dialog_opened: Signal<DialogHandle>,
    pub dialog_confirmed: Signal<DialogHandle>,
    pub dialog_closed: Signal<DialogHandle>,
}

/// The host's open workspace.
#[derive(Debug)]
pub struct Workspace {
    handle: WorkspaceHandle,
    config: KeyFile,
    signals: WorkspaceSignals,
}

impl Workspace {
    pub(crate) fn new(handle: WorkspaceHandle, config: KeyFile) -> Self {
        Self {
            handle,
            config,
            signals: WorkspaceSignals::default(),
        }
    }

    pub fn handle(&self) -> WorkspaceHandle {
        self.handle
    }

    /// The workspace configuration as it was when the workspace opened.
    pub fn config(&self) -> &KeyFile {
        &self.config
    }

    pub fn signals(&self) -> &WorkspaceSignals {
        &self.signals
    }

    pub fn disconnect_owner(&self, owner: ExtensionHandle) -> usize {
        self.signals.closed.disconnect_owner(owner)
            + self.signals.dialog_opened.disconnect_owner(owner)
            + self.signals.dialog_confirmed.disconnect_owner(owner)
            + self.signals.dialog_closed.disconnect_owner(owner)
    }
}
