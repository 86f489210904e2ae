//! Prelude for convenient imports.

pub use modproxy_core::KeyFile;
pub use modproxy_core::types::{
    CategoryHandle, DialogHandle, DocumentHandle, ExtensionHandle, PanelHandle, WorkspaceHandle,
};

pub use crate::descriptor::Descriptor;
pub use crate::events::definitions::{EditorNotification, EditorNotificationKind};
pub use crate::extension::{Extension, ExtensionBox, ExtensionContext, export_extension};
pub use crate::host::ActiveDocument;
pub use crate::later::Scheduler;
pub use crate::signal::{HandledSignal, Signal, SlotId};
pub use crate::wrappers::{Category, CategoryChange, Document, Editor, Workspace};
